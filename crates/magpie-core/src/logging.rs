//! Structured logging field name constants for magpie.
//!
//! All crates use these constants for consistent structured logging
//! fields, so log aggregation tools can query by standardized names
//! across every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (startup, shutdown), operation completions |
//! | DEBUG | Decision points, intermediate values, config choices |
//! | TRACE | Per-item iteration, high-volume data (per-post processing) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "api", "fetch", "db", "sync"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "mirror", "platform", "pool", "orchestrator"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "ingest", "fetch_post", "saved_posts_page", "clone"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Owning user id. Present on every scoped data operation.
pub const USER_ID: &str = "user_id";

/// External post id being operated on.
pub const POST_ID: &str = "post_id";

/// Sync run UUID.
pub const RUN_ID: &str = "run_id";

/// Tag name.
pub const TAG: &str = "tag";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned by a query or page.
pub const RESULT_COUNT: &str = "result_count";

/// Saved-posts page number within a run.
pub const PAGE: &str = "page";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Upstream HTTP status when an external call fails.
pub const UPSTREAM_STATUS: &str = "upstream_status";
