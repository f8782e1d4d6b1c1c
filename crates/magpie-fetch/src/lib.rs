//! # magpie-fetch
//!
//! External platform clients and the content normalizer for magpie.
//!
//! This crate provides:
//! - An authenticated platform v2 client for listing saved posts
//! - An unauthenticated mirror client for single public posts
//! - The normalizer that maps wire payloads into canonical records
//! - A capacity-bounded cache of resolved media URLs
//! - Mock sources for deterministic tests
//!
//! Wire shapes stay inside this crate: everything downstream of
//! [`normalize::normalize_post`] works with `magpie_core` types only.

pub mod media_cache;
pub mod mirror;
pub mod mock;
pub mod normalize;
pub mod platform;
pub mod v2;
pub mod wire;

pub use media_cache::MediaUrlCache;
pub use mirror::MirrorClient;
pub use normalize::normalize_post;
pub use platform::PlatformClient;
