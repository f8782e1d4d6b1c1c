//! Share repository for published tag collections.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};
use tracing::info;
use uuid::Uuid;

use magpie_core::{normalize_tag, Error, Result, Share, ShareRepository, UserContext};

/// SQLite implementation of ShareRepository.
pub struct SqliteShareRepository {
    pool: Pool<Sqlite>,
}

impl SqliteShareRepository {
    /// Create a new SqliteShareRepository with the given connection pool.
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

fn map_share(row: &SqliteRow) -> Result<Share> {
    let id: String = row.get("id");
    let id =
        Uuid::parse_str(&id).map_err(|e| Error::Internal(format!("malformed share id: {}", e)))?;
    Ok(Share {
        id,
        owner_user_id: row.get("user_id"),
        tag: row.get("tag"),
        created_at: row.get("created_at"),
    })
}

#[async_trait]
impl ShareRepository for SqliteShareRepository {
    async fn publish(&self, ctx: &UserContext, tag: &str) -> Result<Share> {
        let tag = normalize_tag(tag)?;
        let id = Uuid::new_v4();

        // Re-publishing keeps the existing share id.
        sqlx::query(
            "INSERT INTO share (id, user_id, tag, created_at) VALUES (?, ?, ?, ?)
             ON CONFLICT (user_id, tag) DO NOTHING",
        )
        .bind(id.to_string())
        .bind(ctx.user_id())
        .bind(&tag)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        let row = sqlx::query("SELECT * FROM share WHERE user_id = ? AND tag = ?")
            .bind(ctx.user_id())
            .bind(&tag)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        let share = map_share(&row)?;
        info!(
            subsystem = "db",
            op = "publish",
            user_id = ctx.user_id(),
            tag = %tag,
            "Tag collection shared"
        );
        Ok(share)
    }

    async fn unpublish(&self, ctx: &UserContext, tag: &str) -> Result<()> {
        let tag = normalize_tag(tag)?;
        let result = sqlx::query("DELETE FROM share WHERE user_id = ? AND tag = ?")
            .bind(ctx.user_id())
            .bind(&tag)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("share for tag {}", tag)));
        }
        Ok(())
    }

    async fn fetch(&self, share_id: Uuid) -> Result<Share> {
        let row = sqlx::query("SELECT * FROM share WHERE id = ?")
            .bind(share_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or_else(|| Error::NotFound(format!("share {}", share_id)))?;
        map_share(&row)
    }
}
