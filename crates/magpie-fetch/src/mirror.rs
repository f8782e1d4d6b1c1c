//! Unauthenticated mirror API client.
//!
//! Fetches single public posts by author handle + id, without OAuth.
//! Used for manual add, preview pages, and quoted-post expansion.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use magpie_core::defaults::{FETCH_TIMEOUT_SECS, MIRROR_API_URL};
use magpie_core::{
    validate_handle, validate_post_id, Error, IngestSource, NormalizedPost, PostSource, Result,
};

use crate::media_cache::MediaUrlCache;
use crate::normalize::normalize_post;
use crate::wire::WirePost;

/// Response envelope the mirror API wraps posts in.
#[derive(Debug, Deserialize)]
struct MirrorEnvelope {
    #[serde(default)]
    post: Option<WirePost>,
}

/// Client for the unauthenticated mirror API.
pub struct MirrorClient {
    client: Client,
    base_url: String,
    media_cache: Arc<MediaUrlCache>,
}

impl MirrorClient {
    /// Create a client against the default mirror endpoint.
    pub fn new() -> Self {
        Self::with_base_url(MIRROR_API_URL.to_string())
    }

    /// Create a client against a custom endpoint (tests, self-hosted
    /// mirrors).
    pub fn with_base_url(base_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            base_url,
            media_cache: Arc::new(MediaUrlCache::with_default_capacity()),
        }
    }

    /// Create from environment variables (`MAGPIE_MIRROR_URL`).
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("MAGPIE_MIRROR_URL").unwrap_or_else(|_| MIRROR_API_URL.to_string());
        Self::with_base_url(base_url)
    }

    /// Share a media-URL cache across clients.
    pub fn with_media_cache(mut self, cache: Arc<MediaUrlCache>) -> Self {
        self.media_cache = cache;
        self
    }

    /// The resolved-media-URL cache backing this client.
    pub fn media_cache(&self) -> &Arc<MediaUrlCache> {
        &self.media_cache
    }

    /// Fetch one post's wire payload.
    ///
    /// Input is validated before any network call. 404 maps to
    /// [`Error::NotFound`], 5xx to [`Error::Upstream`] with the status,
    /// and a timeout to [`Error::Timeout`].
    pub async fn fetch_wire(&self, handle: &str, post_id: &str) -> Result<WirePost> {
        validate_handle(handle)?;
        validate_post_id(post_id)?;

        let url = format!("{}/{}/status/{}", self.base_url, handle, post_id);
        debug!(
            subsystem = "fetch",
            component = "mirror",
            post_id,
            "Fetching post"
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(format!("post {} not found", post_id)));
        }
        if !status.is_success() {
            warn!(
                subsystem = "fetch",
                component = "mirror",
                post_id,
                upstream_status = status.as_u16(),
                "Mirror API returned error status"
            );
            return Err(Error::upstream_status(
                status.as_u16(),
                format!("mirror API error for post {}", post_id),
            ));
        }

        let envelope: MirrorEnvelope = response.json().await?;
        envelope
            .post
            .ok_or_else(|| Error::NotFound(format!("post {} not found", post_id)))
    }
}

impl Default for MirrorClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostSource for MirrorClient {
    async fn fetch_post(
        &self,
        handle: &str,
        post_id: &str,
        source: IngestSource,
    ) -> Result<NormalizedPost> {
        let wire = self.fetch_wire(handle, post_id).await?;
        let post = normalize_post(&wire, source)?;

        for media in &post.media {
            self.media_cache.insert(&post.post_id, "orig", &media.url);
            if let Some(preview) = &media.preview_url {
                self.media_cache.insert(&post.post_id, "preview", preview);
            }
        }
        Ok(post)
    }
}
