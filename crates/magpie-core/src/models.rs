//! Core data models for magpie.
//!
//! These types are shared across all magpie crates and represent the
//! canonical domain entities. The loosely-typed wire payloads fetched
//! from the external platform never appear here; the normalizer in
//! `magpie-fetch` is the only place that touches them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

// =============================================================================
// OWNERSHIP
// =============================================================================

/// Authenticated user scope for every data-layer operation.
///
/// Repositories take a `UserContext` as their first argument and inject
/// the `user_id` predicate themselves, so an unscoped (cross-user) query
/// cannot be expressed through the repository API. The inner id is
/// private: contexts are minted by the session layer or test fixtures,
/// never assembled ad hoc from request input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    user_id: String,
}

impl UserContext {
    /// Create a context for the given platform user id.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }

    /// The owning user's id.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

// =============================================================================
// CONTENT CLASSIFICATION
// =============================================================================

/// Content category of a bookmarked post.
///
/// Assignment is a strict priority order (video > photo > article >
/// tweet, first match wins) applied by the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentCategory {
    Tweet,
    Photo,
    Video,
    Article,
}

impl ContentCategory {
    /// Stable string form used in the database and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentCategory::Tweet => "tweet",
            ContentCategory::Photo => "photo",
            ContentCategory::Video => "video",
            ContentCategory::Article => "article",
        }
    }

    /// Parse the stored string form. Unknown values fall back to `Tweet`.
    pub fn parse(s: &str) -> Self {
        match s {
            "photo" => ContentCategory::Photo,
            "video" => ContentCategory::Video,
            "article" => ContentCategory::Article,
            _ => ContentCategory::Tweet,
        }
    }
}

/// Type of a media attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Photo,
    Video,
    AnimatedGif,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Photo => "photo",
            MediaType::Video => "video",
            MediaType::AnimatedGif => "animated_gif",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "video" => MediaType::Video,
            "animated_gif" => MediaType::AnimatedGif,
            _ => MediaType::Photo,
        }
    }
}

/// How a bookmark entered the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestSource {
    /// Bulk import from the user's saved-posts list.
    Sync,
    /// Manually added by author + post id.
    Manual,
    /// Manually added by pasting a post URL.
    UrlPrefix,
    /// Persisted as the quoted half of a quote-post.
    Quoted,
    /// Copied from another user's shared collection.
    Cloned,
}

impl IngestSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngestSource::Sync => "sync",
            IngestSource::Manual => "manual",
            IngestSource::UrlPrefix => "url_prefix",
            IngestSource::Quoted => "quoted",
            IngestSource::Cloned => "cloned",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "manual" => IngestSource::Manual,
            "url_prefix" => IngestSource::UrlPrefix,
            "quoted" => IngestSource::Quoted,
            "cloned" => IngestSource::Cloned,
            _ => IngestSource::Sync,
        }
    }
}

// =============================================================================
// NORMALIZED POST (normalizer output, persistence input)
// =============================================================================

/// Author of a post on the external platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostAuthor {
    pub handle: String,
    pub name: String,
    pub avatar_url: Option<String>,
}

/// One media attachment as described by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaDescriptor {
    pub media_type: MediaType,
    /// Original (full-quality) URL.
    pub url: String,
    /// Preview/thumbnail URL when the platform provides one.
    pub preview_url: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    /// Video duration in milliseconds.
    pub duration_ms: Option<i64>,
}

/// One expanded URL entity from the post body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkDescriptor {
    pub short_url: String,
    pub expanded_url: String,
    pub display_url: Option<String>,
}

/// Canonical record produced by the content normalizer.
///
/// Carries everything the persistence gate needs in one unit: the
/// primary record, its media and link descriptors, and (for quote-posts)
/// a nested record for the quoted post, which is persisted through the
/// same dedup gate as an independent bookmark.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedPost {
    pub post_id: String,
    pub author: PostAuthor,
    pub text: String,
    pub canonical_url: String,
    /// Creation time on the external platform.
    pub posted_at: Option<DateTime<Utc>>,
    pub category: ContentCategory,
    pub is_reply: bool,
    pub is_quote: bool,
    pub is_repost: bool,
    /// Quoted author + text snippet, serialized for render-time display
    /// without a second fetch.
    pub quote_context: Option<JsonValue>,
    pub quoted_post_id: Option<String>,
    pub source: IngestSource,
    /// Raw fetched payload, stored for debugging.
    pub raw: JsonValue,
    pub media: Vec<MediaDescriptor>,
    pub links: Vec<LinkDescriptor>,
    /// Independent record for the quoted post, when present.
    pub quoted: Option<Box<NormalizedPost>>,
}

// =============================================================================
// STORED ENTITIES
// =============================================================================

/// A stored media attachment, owned by exactly one bookmark.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaAttachment {
    /// Derived id: `"{post_id}-{index}"`.
    pub id: String,
    pub bookmark_id: String,
    pub media_type: MediaType,
    pub url: String,
    pub preview_url: Option<String>,
    /// Path of a locally cached copy, when one exists.
    pub local_path: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub duration_ms: Option<i64>,
}

/// A user's saved copy of a post, with tags and read state attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bookmark {
    /// External post id; unique per user.
    pub post_id: String,
    pub author_handle: String,
    pub author_name: String,
    pub author_avatar_url: Option<String>,
    pub text: String,
    pub canonical_url: String,
    pub posted_at: Option<DateTime<Utc>>,
    /// When this row was ingested locally.
    pub processed_at: DateTime<Utc>,
    pub category: ContentCategory,
    pub is_reply: bool,
    pub is_quote: bool,
    pub is_repost: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_context: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quoted_post_id: Option<String>,
    pub source: IngestSource,
    pub tags: Vec<String>,
    pub read: bool,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub media: Vec<MediaAttachment>,
}

/// A tag with its bookmark count, for tag listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagSummary {
    pub tag: String,
    pub bookmark_count: i64,
}

// =============================================================================
// OPERATION RESULTS
// =============================================================================

/// Outcome of one pass through the dedup gate.
///
/// A duplicate is a successful outcome, not an error: `created` is false
/// and `duplicate_of` names the existing row, which was left untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestOutcome {
    pub created: bool,
    pub bookmark_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_of: Option<String>,
}

/// Result of cloning a shared tag collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloneSummary {
    pub cloned: i64,
    pub skipped: i64,
    pub total: i64,
}

// =============================================================================
// SYNC
// =============================================================================

/// Terminal and in-flight states of a sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Running,
    Completed,
    Failed,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Running => "running",
            SyncStatus::Completed => "completed",
            SyncStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "completed" => SyncStatus::Completed,
            "failed" => SyncStatus::Failed,
            _ => SyncStatus::Running,
        }
    }
}

/// One sync run, as recorded in the sync log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncRun {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub status: SyncStatus,
    pub fetched_count: i64,
    pub new_count: i64,
    pub duplicate_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Answer to "may this user sync right now".
///
/// Only a `completed` run starts the cooldown clock; the boundary is
/// strictly-greater-than, so a run exactly one window old allows syncing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CooldownStatus {
    pub can_sync: bool,
    /// Seconds until the next sync is allowed; zero when `can_sync`.
    pub cooldown_remaining_secs: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sync_at: Option<DateTime<Utc>>,
}

/// One page of the user's saved-posts list, already normalized.
#[derive(Debug, Clone)]
pub struct SavedPostsPage {
    pub posts: Vec<NormalizedPost>,
    pub next_cursor: Option<String>,
}

// =============================================================================
// ACCOUNTS & SHARES
// =============================================================================

/// A connected platform account, including the OAuth bearer token the
/// sync orchestrator presents to the platform API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub user_id: String,
    pub handle: String,
    #[serde(skip_serializing)]
    pub access_token: String,
    pub connected_at: DateTime<Utc>,
}

/// A published tag collection, addressed by an opaque share id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Share {
    pub id: Uuid,
    pub owner_user_id: String,
    pub tag: String,
    pub created_at: DateTime<Utc>,
}
