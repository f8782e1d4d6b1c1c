//! Tag repository implementation, including clone-collection.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Row, Sqlite};
use tracing::{info, warn};

use magpie_core::defaults::CLONE_MAX_ITEMS;
use magpie_core::{
    normalize_tag, CloneSummary, Error, Result, TagRepository, TagSummary, UserContext,
};

/// SQLite implementation of TagRepository.
pub struct SqliteTagRepository {
    pool: Pool<Sqlite>,
}

impl SqliteTagRepository {
    /// Create a new SqliteTagRepository with the given connection pool.
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    async fn bookmark_exists(&self, ctx: &UserContext, bookmark_id: &str) -> Result<bool> {
        let found: i64 = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM bookmark WHERE user_id = ? AND post_id = ?)",
        )
        .bind(ctx.user_id())
        .bind(bookmark_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(found != 0)
    }
}

#[async_trait]
impl TagRepository for SqliteTagRepository {
    async fn add(&self, ctx: &UserContext, bookmark_id: &str, tag: &str) -> Result<String> {
        let tag = normalize_tag(tag)?;

        if !self.bookmark_exists(ctx, bookmark_id).await? {
            return Err(Error::NotFound(format!("bookmark {}", bookmark_id)));
        }

        sqlx::query(
            "INSERT INTO bookmark_tag (user_id, bookmark_id, tag, created_at)
             VALUES (?, ?, ?, ?) ON CONFLICT DO NOTHING",
        )
        .bind(ctx.user_id())
        .bind(bookmark_id)
        .bind(&tag)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(tag)
    }

    async fn remove(&self, ctx: &UserContext, bookmark_id: &str, tag: &str) -> Result<()> {
        // Normalize the same way `add` does, so any spelling of the tag
        // the user sees maps back to the stored form.
        let tag = normalize_tag(tag)?;
        sqlx::query(
            "DELETE FROM bookmark_tag
             WHERE user_id = ? AND bookmark_id = ? AND tag = ?",
        )
        .bind(ctx.user_id())
        .bind(bookmark_id)
        .bind(tag)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    async fn list(&self, ctx: &UserContext) -> Result<Vec<TagSummary>> {
        let rows = sqlx::query(
            "SELECT tag, COUNT(*) AS bookmark_count
             FROM bookmark_tag
             WHERE user_id = ?
             GROUP BY tag
             ORDER BY tag",
        )
        .bind(ctx.user_id())
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|row| TagSummary {
                tag: row.get("tag"),
                bookmark_count: row.get("bookmark_count"),
            })
            .collect())
    }

    async fn clone_collection(
        &self,
        source: &UserContext,
        tag: &str,
        target: &UserContext,
    ) -> Result<CloneSummary> {
        let tag = normalize_tag(tag)?;

        let post_ids: Vec<String> = sqlx::query_scalar(
            "SELECT bookmark_id FROM bookmark_tag
             WHERE user_id = ? AND tag = ?
             ORDER BY bookmark_id",
        )
        .bind(source.user_id())
        .bind(&tag)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        // Cap check up front: over the cap nothing is written.
        if post_ids.len() > CLONE_MAX_ITEMS {
            warn!(
                subsystem = "db",
                op = "clone",
                tag = %tag,
                result_count = post_ids.len(),
                "Clone rejected, collection over cap"
            );
            return Err(Error::LimitExceeded(format!(
                "collection has {} bookmarks, clone cap is {}",
                post_ids.len(),
                CLONE_MAX_ITEMS
            )));
        }

        let total = post_ids.len() as i64;
        let mut cloned = 0i64;
        let mut skipped = 0i64;
        let now = Utc::now();

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        for post_id in &post_ids {
            // Already-owned posts are skipped, never overwritten.
            let result = sqlx::query(
                r#"
                INSERT INTO bookmark (
                    user_id, post_id, author_handle, author_name, author_avatar_url,
                    text, canonical_url, posted_at, processed_at, category,
                    is_reply, is_quote, is_repost, quote_context, quoted_post_id,
                    source, raw
                )
                SELECT ?, post_id, author_handle, author_name, author_avatar_url,
                       text, canonical_url, posted_at, ?, category,
                       is_reply, is_quote, is_repost, quote_context, quoted_post_id,
                       'cloned', raw
                FROM bookmark WHERE user_id = ? AND post_id = ?
                ON CONFLICT (user_id, post_id) DO NOTHING
                "#,
            )
            .bind(target.user_id())
            .bind(now)
            .bind(source.user_id())
            .bind(post_id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

            if result.rows_affected() == 0 {
                skipped += 1;
                continue;
            }
            cloned += 1;

            sqlx::query(
                r#"
                INSERT INTO media (
                    user_id, id, bookmark_id, media_type, url, preview_url,
                    local_path, width, height, duration_ms
                )
                SELECT ?, id, bookmark_id, media_type, url, preview_url,
                       NULL, width, height, duration_ms
                FROM media WHERE user_id = ? AND bookmark_id = ?
                ON CONFLICT (user_id, id) DO NOTHING
                "#,
            )
            .bind(target.user_id())
            .bind(source.user_id())
            .bind(post_id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

            sqlx::query(
                r#"
                INSERT INTO link (user_id, bookmark_id, short_url, expanded_url, display_url)
                SELECT ?, bookmark_id, short_url, expanded_url, display_url
                FROM link WHERE user_id = ? AND bookmark_id = ?
                ON CONFLICT (user_id, bookmark_id, short_url) DO NOTHING
                "#,
            )
            .bind(target.user_id())
            .bind(source.user_id())
            .bind(post_id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

            sqlx::query(
                "INSERT INTO bookmark_tag (user_id, bookmark_id, tag, created_at)
                 VALUES (?, ?, ?, ?) ON CONFLICT DO NOTHING",
            )
            .bind(target.user_id())
            .bind(post_id)
            .bind(&tag)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;
        }

        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "db",
            op = "clone",
            user_id = target.user_id(),
            tag = %tag,
            cloned,
            skipped,
            "Cloned tag collection"
        );

        Ok(CloneSummary {
            cloned,
            skipped,
            total,
        })
    }
}
