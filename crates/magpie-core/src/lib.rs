//! # magpie-core
//!
//! Core types, traits, and abstractions for the magpie bookmarking
//! service.
//!
//! This crate provides the foundational data structures and trait
//! definitions that the other magpie crates depend on: the canonical
//! post/bookmark models, the ownership-scoped repository traits, the
//! error taxonomy, sync progress events, and shared validation.

pub mod defaults;
pub mod error;
pub mod events;
pub mod logging;
pub mod models;
pub mod traits;
pub mod validate;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use events::SyncEvent;
pub use models::*;
pub use traits::*;
pub use validate::{normalize_tag, parse_post_url, validate_handle, validate_post_id};
