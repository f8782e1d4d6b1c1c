//! Shared fixtures for integration tests.
//!
//! An in-memory SQLite database with the schema applied. The pool is
//! pinned to a single connection: every pooled connection to
//! `sqlite::memory:` would otherwise be its own empty database.

use sqlx::sqlite::SqlitePoolOptions;

use crate::Database;

/// Schema applied to in-memory test databases, shared with the embedded
/// migrations.
pub const SCHEMA_SQL: &str = include_str!("../../../migrations/0001_init.sql");

/// Create an in-memory database with the full schema.
pub async fn memory_db() -> Database {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("failed to open in-memory database");

    sqlx::raw_sql(SCHEMA_SQL)
        .execute(&pool)
        .await
        .expect("failed to apply schema");

    sqlx::raw_sql("PRAGMA foreign_keys = ON;")
        .execute(&pool)
        .await
        .expect("failed to enable foreign keys");

    Database::new(pool)
}
