//! Read-status repository: an existence flag, not a boolean column.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Sqlite};

use magpie_core::{Error, ReadStatusRepository, Result, UserContext};

/// SQLite implementation of ReadStatusRepository.
pub struct SqliteReadStatusRepository {
    pool: Pool<Sqlite>,
}

impl SqliteReadStatusRepository {
    /// Create a new SqliteReadStatusRepository with the given connection pool.
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReadStatusRepository for SqliteReadStatusRepository {
    async fn mark_read(&self, ctx: &UserContext, bookmark_id: &str) -> Result<()> {
        let exists: i64 = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM bookmark WHERE user_id = ? AND post_id = ?)",
        )
        .bind(ctx.user_id())
        .bind(bookmark_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;
        if exists == 0 {
            return Err(Error::NotFound(format!("bookmark {}", bookmark_id)));
        }

        sqlx::query(
            "INSERT INTO read_status (user_id, bookmark_id, read_at)
             VALUES (?, ?, ?) ON CONFLICT DO NOTHING",
        )
        .bind(ctx.user_id())
        .bind(bookmark_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    async fn mark_unread(&self, ctx: &UserContext, bookmark_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM read_status WHERE user_id = ? AND bookmark_id = ?")
            .bind(ctx.user_id())
            .bind(bookmark_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }

    async fn is_read(&self, ctx: &UserContext, bookmark_id: &str) -> Result<bool> {
        let found: i64 = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM read_status WHERE user_id = ? AND bookmark_id = ?)",
        )
        .bind(ctx.user_id())
        .bind(bookmark_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(found != 0)
    }
}
