//! Centralized default constants for magpie.
//!
//! **This module is the single source of truth** for all shared default
//! values. Crates reference these constants instead of defining their
//! own magic numbers.

// =============================================================================
// SYNC
// =============================================================================

/// Minimum seconds between successful bulk syncs (15 minutes). Only a
/// `completed` run starts the clock, and the boundary is strictly
/// greater-than.
pub const SYNC_COOLDOWN_SECS: i64 = 900;

/// Maximum saved-posts pages fetched per run. Guards against unbounded
/// loops if the upstream API keeps returning cursors.
pub const SYNC_PAGE_CAP: u32 = 20;

/// Saved-posts page size requested from the platform API.
pub const SYNC_PAGE_SIZE: u32 = 100;

/// Delay between page fetches in milliseconds.
pub const SYNC_PAGE_DELAY_MS: u64 = 1_000;

/// Buffer capacity of the sync progress channel.
pub const SYNC_EVENT_CAPACITY: usize = 64;

// =============================================================================
// FETCHING
// =============================================================================

/// Timeout for external API requests in seconds. A timeout is handled
/// identically to a transport failure.
pub const FETCH_TIMEOUT_SECS: u64 = 5;

/// Default authenticated platform API base URL.
pub const PLATFORM_API_URL: &str = "https://api.x.com/2";

/// Default unauthenticated mirror API base URL.
pub const MIRROR_API_URL: &str = "https://api.fxtwitter.com";

/// Capacity of the resolved-media-URL LRU cache.
pub const MEDIA_URL_CACHE_CAPACITY: usize = 512;

/// Characters of quoted-post text kept in the quote-context blob.
pub const QUOTE_SNIPPET_LEN: usize = 200;

// =============================================================================
// TAGS & CLONING
// =============================================================================

/// Maximum stored tag length in characters; longer tags are truncated.
pub const TAG_MAX_LEN: usize = 10;

/// Maximum source items per clone-collection call. Exceeding the cap is
/// rejected up front with zero rows written.
pub const CLONE_MAX_ITEMS: usize = 100;

// =============================================================================
// PAGINATION
// =============================================================================

/// Default page size for list endpoints.
pub const PAGE_LIMIT: i64 = 50;

/// Default page offset.
pub const PAGE_OFFSET: i64 = 0;

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 3000;

/// Session token length in random bytes (hex-encoded on the wire).
pub const SESSION_TOKEN_BYTES: usize = 32;
