//! Input validation for platform identifiers and tags.
//!
//! Validation runs synchronously, before any network or database I/O.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::defaults::TAG_MAX_LEN;
use crate::error::{Error, Result};

/// Platform handle rules: word characters, 1–15 long.
static HANDLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\w{1,15}$").unwrap());

/// Post ids are decimal digit strings.
static POST_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());

/// Canonical post URL path: `/<handle>/status/<id>`.
static POST_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^/]+/(\w{1,15})/status/(\d+)").unwrap());

/// Validate an author handle against platform rules.
pub fn validate_handle(handle: &str) -> Result<()> {
    if HANDLE_RE.is_match(handle) {
        return Ok(());
    }
    Err(Error::InvalidInput(format!(
        "invalid handle '{}': expected 1-15 word characters",
        handle
    )))
}

/// Validate a numeric post id.
pub fn validate_post_id(post_id: &str) -> Result<()> {
    if POST_ID_RE.is_match(post_id) {
        return Ok(());
    }
    Err(Error::InvalidInput(format!(
        "invalid post id '{}': expected decimal digits",
        post_id
    )))
}

/// Extract `(handle, post_id)` from a canonical post URL.
///
/// Tolerates query strings and any host, so mirror-domain links paste
/// cleanly.
pub fn parse_post_url(url: &str) -> Result<(String, String)> {
    let caps = POST_URL_RE
        .captures(url)
        .ok_or_else(|| Error::InvalidInput(format!("unrecognized post URL: {}", url)))?;
    Ok((caps[1].to_string(), caps[2].to_string()))
}

/// Normalize a tag for storage: lower-cased and capped at
/// [`TAG_MAX_LEN`] characters. Empty (or whitespace-only) tags are
/// rejected.
pub fn normalize_tag(tag: &str) -> Result<String> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput("tag cannot be empty".to_string()));
    }
    Ok(trimmed.to_lowercase().chars().take(TAG_MAX_LEN).collect())
}
