//! # magpie-db
//!
//! SQLite database layer for magpie.
//!
//! This crate provides:
//! - Connection pool management (WAL, foreign keys on)
//! - Repository implementations for all core entities
//! - The per-(user, post) dedup gate with insert-or-ignore semantics
//! - The sync log and its cooldown gate
//!
//! ## Example
//!
//! ```rust,ignore
//! use magpie_core::{BookmarkRepository, UserContext};
//! use magpie_db::Database;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("sqlite:magpie.db").await?;
//!     let ctx = UserContext::new("12345");
//!
//!     let outcome = db.bookmarks.ingest(&ctx, &post, Some("rust")).await?;
//!     println!("created: {}", outcome.created);
//!     Ok(())
//! }
//! ```

pub mod accounts;
pub mod bookmarks;
pub mod pool;
pub mod read_status;
pub mod shares;
pub mod sync_log;
pub mod tags;

// Test fixtures for integration tests
// Note: Always compiled so integration tests (in tests/) can use them.
pub mod test_fixtures;

// Re-export core types
pub use magpie_core::*;

// Re-export repository implementations
pub use accounts::SqliteAccountRepository;
pub use bookmarks::SqliteBookmarkRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use read_status::SqliteReadStatusRepository;
pub use shares::SqliteShareRepository;
pub use sync_log::SqliteSyncLogRepository;
pub use tags::SqliteTagRepository;

/// Combined database context with all repositories.
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Sqlite>,
    /// Bookmark repository: dedup gate and bookmark CRUD.
    pub bookmarks: SqliteBookmarkRepository,
    /// Tag repository, including clone-collection.
    pub tags: SqliteTagRepository,
    /// Read-status repository.
    pub read_status: SqliteReadStatusRepository,
    /// Sync-log repository and cooldown gate.
    pub sync_log: SqliteSyncLogRepository,
    /// Connected accounts and sessions.
    pub accounts: SqliteAccountRepository,
    /// Published tag collections.
    pub shares: SqliteShareRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Sqlite>) -> Self {
        Self {
            bookmarks: SqliteBookmarkRepository::new(pool.clone()),
            tags: SqliteTagRepository::new(pool.clone()),
            read_status: SqliteReadStatusRepository::new(pool.clone()),
            sync_log: SqliteSyncLogRepository::new(pool.clone()),
            accounts: SqliteAccountRepository::new(pool.clone()),
            shares: SqliteShareRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Internal(format!("migration failed: {}", e)))?;
        Ok(())
    }
}
