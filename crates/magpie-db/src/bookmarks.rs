//! Bookmark repository implementation: the dedup gate and all bookmark
//! persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite, Transaction};
use tracing::{debug, info};

use magpie_core::{
    normalize_tag, Bookmark, BookmarkRepository, ContentCategory, Error, IngestOutcome,
    IngestSource, ListBookmarksRequest, ListBookmarksResponse, MediaAttachment, MediaType,
    NormalizedPost, Result, UserContext,
};

/// SQLite implementation of BookmarkRepository.
pub struct SqliteBookmarkRepository {
    pool: Pool<Sqlite>,
}

impl SqliteBookmarkRepository {
    /// Create a new SqliteBookmarkRepository with the given connection pool.
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Insert one record with its media and link rows inside `tx`.
    ///
    /// Returns false when the row already existed (a concurrent insert
    /// won the race); in that case nothing is written for this record.
    async fn insert_record(
        tx: &mut Transaction<'_, Sqlite>,
        ctx: &UserContext,
        post: &NormalizedPost,
    ) -> Result<bool> {
        let now = Utc::now();
        let quote_context = post
            .quote_context
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let raw = serde_json::to_string(&post.raw)?;

        let result = sqlx::query(
            r#"
            INSERT INTO bookmark (
                user_id, post_id, author_handle, author_name, author_avatar_url,
                text, canonical_url, posted_at, processed_at, category,
                is_reply, is_quote, is_repost, quote_context, quoted_post_id,
                source, raw
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (user_id, post_id) DO NOTHING
            "#,
        )
        .bind(ctx.user_id())
        .bind(&post.post_id)
        .bind(&post.author.handle)
        .bind(&post.author.name)
        .bind(&post.author.avatar_url)
        .bind(&post.text)
        .bind(&post.canonical_url)
        .bind(post.posted_at)
        .bind(now)
        .bind(post.category.as_str())
        .bind(post.is_reply)
        .bind(post.is_quote)
        .bind(post.is_repost)
        .bind(quote_context)
        .bind(&post.quoted_post_id)
        .bind(post.source.as_str())
        .bind(raw)
        .execute(&mut **tx)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        for (index, media) in post.media.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO media (
                    user_id, id, bookmark_id, media_type, url, preview_url,
                    local_path, width, height, duration_ms
                ) VALUES (?, ?, ?, ?, ?, ?, NULL, ?, ?, ?)
                ON CONFLICT (user_id, id) DO NOTHING
                "#,
            )
            .bind(ctx.user_id())
            .bind(format!("{}-{}", post.post_id, index))
            .bind(&post.post_id)
            .bind(media.media_type.as_str())
            .bind(&media.url)
            .bind(&media.preview_url)
            .bind(media.width)
            .bind(media.height)
            .bind(media.duration_ms)
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;
        }

        for link in &post.links {
            sqlx::query(
                r#"
                INSERT INTO link (user_id, bookmark_id, short_url, expanded_url, display_url)
                VALUES (?, ?, ?, ?, ?)
                ON CONFLICT (user_id, bookmark_id, short_url) DO NOTHING
                "#,
            )
            .bind(ctx.user_id())
            .bind(&post.post_id)
            .bind(&link.short_url)
            .bind(&link.expanded_url)
            .bind(&link.display_url)
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;
        }

        Ok(true)
    }

    async fn media_for(&self, ctx: &UserContext, bookmark_id: &str) -> Result<Vec<MediaAttachment>> {
        let rows = sqlx::query(
            r#"
            SELECT id, bookmark_id, media_type, url, preview_url, local_path,
                   width, height, duration_ms
            FROM media
            WHERE user_id = ? AND bookmark_id = ?
            ORDER BY id
            "#,
        )
        .bind(ctx.user_id())
        .bind(bookmark_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|row| MediaAttachment {
                id: row.get("id"),
                bookmark_id: row.get("bookmark_id"),
                media_type: MediaType::parse(row.get::<String, _>("media_type").as_str()),
                url: row.get("url"),
                preview_url: row.get("preview_url"),
                local_path: row.get("local_path"),
                width: row.get("width"),
                height: row.get("height"),
                duration_ms: row.get("duration_ms"),
            })
            .collect())
    }
}

/// Map a bookmark row (with `tags` and `is_read` aliases) to the model.
fn map_bookmark_row(row: &SqliteRow) -> Bookmark {
    let tags_str: String = row.get("tags");
    let tags = if tags_str.is_empty() {
        Vec::new()
    } else {
        tags_str.split(',').map(String::from).collect()
    };

    let quote_context = row
        .get::<Option<String>, _>("quote_context")
        .and_then(|s| serde_json::from_str::<JsonValue>(&s).ok());

    Bookmark {
        post_id: row.get("post_id"),
        author_handle: row.get("author_handle"),
        author_name: row.get("author_name"),
        author_avatar_url: row.get("author_avatar_url"),
        text: row.get("text"),
        canonical_url: row.get("canonical_url"),
        posted_at: row.get::<Option<DateTime<Utc>>, _>("posted_at"),
        processed_at: row.get("processed_at"),
        category: ContentCategory::parse(row.get::<String, _>("category").as_str()),
        is_reply: row.get("is_reply"),
        is_quote: row.get("is_quote"),
        is_repost: row.get("is_repost"),
        quote_context,
        quoted_post_id: row.get("quoted_post_id"),
        source: IngestSource::parse(row.get::<String, _>("source").as_str()),
        tags,
        read: row.get("is_read"),
        media: Vec::new(),
    }
}

/// Select clause shared by fetch and list, with tag and read-state
/// aliases joined in.
const BOOKMARK_SELECT: &str = r#"
    SELECT b.*,
           COALESCE((SELECT GROUP_CONCAT(t.tag)
                     FROM bookmark_tag t
                     WHERE t.user_id = b.user_id AND t.bookmark_id = b.post_id), '') AS tags,
           EXISTS(SELECT 1 FROM read_status r
                  WHERE r.user_id = b.user_id AND r.bookmark_id = b.post_id) AS is_read
    FROM bookmark b
"#;

#[async_trait]
impl BookmarkRepository for SqliteBookmarkRepository {
    async fn ingest(
        &self,
        ctx: &UserContext,
        post: &NormalizedPost,
        initial_tag: Option<&str>,
    ) -> Result<IngestOutcome> {
        // Validation before any I/O.
        let initial_tag = initial_tag.map(normalize_tag).transpose()?;

        // Dedup gate: an existing row means no writes at all; the
        // user's edited text, tags, and read state stay untouched.
        if self.exists(ctx, &post.post_id).await? {
            debug!(
                subsystem = "db",
                op = "ingest",
                user_id = ctx.user_id(),
                post_id = %post.post_id,
                "Duplicate bookmark, skipping"
            );
            return Ok(IngestOutcome {
                created: false,
                bookmark_id: post.post_id.clone(),
                duplicate_of: Some(post.post_id.clone()),
            });
        }

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        // Ordering contract: primary before quoted before tag.
        let created = Self::insert_record(&mut tx, ctx, post).await?;
        if created {
            if let Some(quoted) = post.quoted.as_deref() {
                // Same gate, first write wins: an already-present quoted
                // bookmark keeps its stored text.
                Self::insert_record(&mut tx, ctx, quoted).await?;
            }
            if let Some(tag) = &initial_tag {
                sqlx::query(
                    "INSERT INTO bookmark_tag (user_id, bookmark_id, tag, created_at)
                     VALUES (?, ?, ?, ?) ON CONFLICT DO NOTHING",
                )
                .bind(ctx.user_id())
                .bind(&post.post_id)
                .bind(tag)
                .bind(Utc::now())
                .execute(&mut *tx)
                .await
                .map_err(Error::Database)?;
            }
        }

        tx.commit().await.map_err(Error::Database)?;

        if created {
            info!(
                subsystem = "db",
                op = "ingest",
                user_id = ctx.user_id(),
                post_id = %post.post_id,
                category = post.category.as_str(),
                source = post.source.as_str(),
                "Bookmark ingested"
            );
            Ok(IngestOutcome {
                created: true,
                bookmark_id: post.post_id.clone(),
                duplicate_of: None,
            })
        } else {
            // Lost an insert race; the first writer's row stands.
            Ok(IngestOutcome {
                created: false,
                bookmark_id: post.post_id.clone(),
                duplicate_of: Some(post.post_id.clone()),
            })
        }
    }

    async fn fetch(&self, ctx: &UserContext, post_id: &str) -> Result<Bookmark> {
        let sql = format!("{} WHERE b.user_id = ? AND b.post_id = ?", BOOKMARK_SELECT);
        let row = sqlx::query(&sql)
            .bind(ctx.user_id())
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or_else(|| Error::NotFound(format!("bookmark {}", post_id)))?;

        let mut bookmark = map_bookmark_row(&row);
        bookmark.media = self.media_for(ctx, post_id).await?;
        Ok(bookmark)
    }

    async fn list(
        &self,
        ctx: &UserContext,
        req: ListBookmarksRequest,
    ) -> Result<ListBookmarksResponse> {
        let mut filters = String::new();
        if req.tag.is_some() {
            filters.push_str(
                " AND EXISTS (SELECT 1 FROM bookmark_tag t
                   WHERE t.user_id = b.user_id AND t.bookmark_id = b.post_id AND t.tag = ?)",
            );
        }
        if req.category.is_some() {
            filters.push_str(" AND b.category = ?");
        }
        match req.unread {
            Some(true) => filters.push_str(
                " AND NOT EXISTS (SELECT 1 FROM read_status r
                   WHERE r.user_id = b.user_id AND r.bookmark_id = b.post_id)",
            ),
            Some(false) => filters.push_str(
                " AND EXISTS (SELECT 1 FROM read_status r
                   WHERE r.user_id = b.user_id AND r.bookmark_id = b.post_id)",
            ),
            None => {}
        }

        let tag_filter = req.tag.as_deref().map(str::to_lowercase);
        let limit = req.limit.unwrap_or(magpie_core::defaults::PAGE_LIMIT);
        let offset = req.offset.unwrap_or(magpie_core::defaults::PAGE_OFFSET);

        let count_sql = format!(
            "SELECT COUNT(*) FROM bookmark b WHERE b.user_id = ?{}",
            filters
        );
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(ctx.user_id());
        if let Some(tag) = &tag_filter {
            count_query = count_query.bind(tag);
        }
        if let Some(category) = req.category {
            count_query = count_query.bind(category.as_str());
        }
        let total = count_query
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        let page_sql = format!(
            "{} WHERE b.user_id = ?{} ORDER BY b.processed_at DESC LIMIT ? OFFSET ?",
            BOOKMARK_SELECT, filters
        );
        let mut page_query = sqlx::query(&page_sql).bind(ctx.user_id());
        if let Some(tag) = &tag_filter {
            page_query = page_query.bind(tag);
        }
        if let Some(category) = req.category {
            page_query = page_query.bind(category.as_str());
        }
        let rows = page_query
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(ListBookmarksResponse {
            bookmarks: rows.iter().map(map_bookmark_row).collect(),
            total,
        })
    }

    async fn exists(&self, ctx: &UserContext, post_id: &str) -> Result<bool> {
        let found: i64 = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM bookmark WHERE user_id = ? AND post_id = ?)",
        )
        .bind(ctx.user_id())
        .bind(post_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(found != 0)
    }

    async fn update_text(&self, ctx: &UserContext, post_id: &str, text: &str) -> Result<()> {
        let result = sqlx::query("UPDATE bookmark SET text = ? WHERE user_id = ? AND post_id = ?")
            .bind(text)
            .bind(ctx.user_id())
            .bind(post_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("bookmark {}", post_id)));
        }
        Ok(())
    }

    async fn delete(&self, ctx: &UserContext, post_id: &str) -> Result<()> {
        // Media, links, tags, and read state cascade.
        let result = sqlx::query("DELETE FROM bookmark WHERE user_id = ? AND post_id = ?")
            .bind(ctx.user_id())
            .bind(post_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("bookmark {}", post_id)));
        }
        info!(
            subsystem = "db",
            op = "delete",
            user_id = ctx.user_id(),
            post_id,
            "Bookmark deleted"
        );
        Ok(())
    }

    async fn fetch_raw(&self, ctx: &UserContext, post_id: &str) -> Result<JsonValue> {
        let raw: Option<String> =
            sqlx::query_scalar("SELECT raw FROM bookmark WHERE user_id = ? AND post_id = ?")
                .bind(ctx.user_id())
                .bind(post_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(Error::Database)?;
        let raw = raw.ok_or_else(|| Error::NotFound(format!("bookmark {}", post_id)))?;
        Ok(serde_json::from_str(&raw)?)
    }
}
