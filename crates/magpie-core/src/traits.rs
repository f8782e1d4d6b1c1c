//! Core traits for magpie abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability. Every
//! repository method takes a [`UserContext`] first: ownership scoping is
//! part of the interface contract, not a per-query convention.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// BOOKMARK REPOSITORY
// =============================================================================

/// Request for listing bookmarks.
#[derive(Debug, Clone, Default)]
pub struct ListBookmarksRequest {
    /// Require every listed bookmark to carry this tag.
    pub tag: Option<String>,
    /// Restrict to one content category.
    pub category: Option<ContentCategory>,
    /// `Some(true)` → unread only, `Some(false)` → read only.
    pub unread: Option<bool>,
    /// Maximum results.
    pub limit: Option<i64>,
    /// Pagination offset.
    pub offset: Option<i64>,
}

/// Response for listing bookmarks.
#[derive(Debug, Clone)]
pub struct ListBookmarksResponse {
    pub bookmarks: Vec<Bookmark>,
    pub total: i64,
}

/// Repository for bookmark persistence and the dedup gate.
#[async_trait]
pub trait BookmarkRepository: Send + Sync {
    /// Run one normalized record through the dedup gate.
    ///
    /// New records are written atomically (bookmark + media + links +
    /// optional initial tag); duplicates make no writes at all. A nested
    /// quoted record is persisted through the same gate after the
    /// primary, first write wins.
    async fn ingest(
        &self,
        ctx: &UserContext,
        post: &NormalizedPost,
        initial_tag: Option<&str>,
    ) -> Result<IngestOutcome>;

    /// Fetch one bookmark with media, tags, and read state.
    async fn fetch(&self, ctx: &UserContext, post_id: &str) -> Result<Bookmark>;

    /// List bookmarks with filtering and pagination.
    async fn list(&self, ctx: &UserContext, req: ListBookmarksRequest)
        -> Result<ListBookmarksResponse>;

    /// Check whether a post is already bookmarked by this user.
    async fn exists(&self, ctx: &UserContext, post_id: &str) -> Result<bool>;

    /// Replace the stored body text (user edit).
    async fn update_text(&self, ctx: &UserContext, post_id: &str, text: &str) -> Result<()>;

    /// Delete a bookmark and its media, links, tags, and read state.
    async fn delete(&self, ctx: &UserContext, post_id: &str) -> Result<()>;

    /// The raw fetched payload stored at ingest time.
    async fn fetch_raw(&self, ctx: &UserContext, post_id: &str) -> Result<JsonValue>;
}

// =============================================================================
// TAG REPOSITORY
// =============================================================================

/// Repository for per-bookmark tags.
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Attach a tag to a bookmark. The tag is normalized (lower-cased,
    /// length-capped) before writing; re-adding is a no-op.
    async fn add(&self, ctx: &UserContext, bookmark_id: &str, tag: &str) -> Result<String>;

    /// Detach a tag from a bookmark.
    async fn remove(&self, ctx: &UserContext, bookmark_id: &str, tag: &str) -> Result<()>;

    /// All of the user's tags with bookmark counts.
    async fn list(&self, ctx: &UserContext) -> Result<Vec<TagSummary>>;

    /// Copy every bookmark carrying `tag` from `source` into `target`'s
    /// account. Capped at [`crate::defaults::CLONE_MAX_ITEMS`] source
    /// items; already-owned posts are skipped and counted.
    async fn clone_collection(
        &self,
        source: &UserContext,
        tag: &str,
        target: &UserContext,
    ) -> Result<CloneSummary>;
}

// =============================================================================
// READ STATUS REPOSITORY
// =============================================================================

/// Repository for the read/unread existence flag.
#[async_trait]
pub trait ReadStatusRepository: Send + Sync {
    async fn mark_read(&self, ctx: &UserContext, bookmark_id: &str) -> Result<()>;

    async fn mark_unread(&self, ctx: &UserContext, bookmark_id: &str) -> Result<()>;

    async fn is_read(&self, ctx: &UserContext, bookmark_id: &str) -> Result<bool>;
}

// =============================================================================
// SYNC LOG REPOSITORY
// =============================================================================

/// Repository for sync-run records and the cooldown gate.
#[async_trait]
pub trait SyncLogRepository: Send + Sync {
    /// Open a `running` sync-log row and return its id.
    async fn begin_run(&self, ctx: &UserContext) -> Result<Uuid>;

    /// Finalize a run as `completed` with its counts.
    async fn complete_run(
        &self,
        ctx: &UserContext,
        run_id: Uuid,
        fetched: i64,
        new: i64,
        duplicates: i64,
    ) -> Result<()>;

    /// Finalize a run as `failed`, keeping whatever counts were reached.
    async fn fail_run(
        &self,
        ctx: &UserContext,
        run_id: Uuid,
        fetched: i64,
        new: i64,
        duplicates: i64,
        error: &str,
    ) -> Result<()>;

    /// The most recent `completed` run, if any.
    async fn last_completed(&self, ctx: &UserContext) -> Result<Option<SyncRun>>;

    /// Whether the user may sync now, and how long until they may.
    async fn check_cooldown(&self, ctx: &UserContext) -> Result<CooldownStatus>;

    /// Fetch one run by id.
    async fn fetch_run(&self, ctx: &UserContext, run_id: Uuid) -> Result<SyncRun>;
}

// =============================================================================
// ACCOUNT & SESSION REPOSITORY
// =============================================================================

/// Repository for connected platform accounts and session tokens.
///
/// The OAuth exchange itself happens elsewhere; this stores its result
/// (the account + bearer token) and resolves opaque session tokens to a
/// [`UserContext`]. Tokens are stored as SHA-256 digests.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Insert or refresh the connected account for a user.
    async fn upsert(&self, account: &Account) -> Result<()>;

    /// The connected account for this user.
    async fn fetch(&self, ctx: &UserContext) -> Result<Account>;

    /// Mint a session token for a user and return it (plaintext, shown
    /// once; only its digest is stored).
    async fn create_session(&self, ctx: &UserContext) -> Result<String>;

    /// Resolve a presented session token to its owning user.
    async fn resolve_session(&self, token: &str) -> Result<Option<UserContext>>;
}

// =============================================================================
// SHARE REPOSITORY
// =============================================================================

/// Repository for published tag collections.
#[async_trait]
pub trait ShareRepository: Send + Sync {
    /// Publish one of the user's tags. Re-publishing an already-shared
    /// tag returns the existing share.
    async fn publish(&self, ctx: &UserContext, tag: &str) -> Result<Share>;

    /// Unpublish a tag. The share id is retired, not reused.
    async fn unpublish(&self, ctx: &UserContext, tag: &str) -> Result<()>;

    /// Look up a share by its public id (no session required).
    async fn fetch(&self, share_id: Uuid) -> Result<Share>;
}

// =============================================================================
// EXTERNAL POST SOURCES
// =============================================================================

/// Read-only source of one user's saved-posts list (the authenticated
/// platform API in production, a mock in orchestrator tests).
#[async_trait]
pub trait SavedPostsSource: Send + Sync {
    /// Fetch one page of saved posts, already normalized.
    async fn saved_posts_page(
        &self,
        user_id: &str,
        access_token: &str,
        cursor: Option<&str>,
    ) -> Result<SavedPostsPage>;
}

/// Read-only source of single posts by author + id (the mirror API in
/// production, a mock in tests).
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Fetch and normalize one post.
    async fn fetch_post(
        &self,
        handle: &str,
        post_id: &str,
        source: IngestSource,
    ) -> Result<NormalizedPost>;
}
