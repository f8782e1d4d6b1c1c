//! # magpie-sync
//!
//! Bulk sync orchestrator for magpie: drives the saved-posts import
//! across paginated result sets, applies the cooldown gate, streams
//! per-item progress, and finalizes the sync log.

pub mod orchestrator;

pub use orchestrator::{SyncConfig, SyncOrchestrator, SyncReport};
