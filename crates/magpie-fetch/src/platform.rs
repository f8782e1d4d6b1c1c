//! Authenticated platform API client.
//!
//! Lists the connected user's saved posts with cursor pagination, using
//! their OAuth bearer token. Read-only.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use magpie_core::defaults::{FETCH_TIMEOUT_SECS, PLATFORM_API_URL, SYNC_PAGE_SIZE};
use magpie_core::{Error, IngestSource, Result, SavedPostsPage, SavedPostsSource};

use crate::normalize::normalize_post;
use crate::v2::{map_tweet, V2Response};

/// Client for the authenticated platform v2 API.
pub struct PlatformClient {
    client: Client,
    base_url: String,
    page_size: u32,
}

impl PlatformClient {
    /// Create a client against the default platform endpoint.
    pub fn new() -> Self {
        Self::with_base_url(PLATFORM_API_URL.to_string())
    }

    /// Create a client against a custom endpoint (tests, proxies).
    pub fn with_base_url(base_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            base_url,
            page_size: SYNC_PAGE_SIZE,
        }
    }

    /// Create from environment variables (`MAGPIE_PLATFORM_URL`).
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("MAGPIE_PLATFORM_URL").unwrap_or_else(|_| PLATFORM_API_URL.to_string());
        Self::with_base_url(base_url)
    }

    /// Override the page size requested from the platform.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }
}

impl Default for PlatformClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SavedPostsSource for PlatformClient {
    async fn saved_posts_page(
        &self,
        user_id: &str,
        access_token: &str,
        cursor: Option<&str>,
    ) -> Result<SavedPostsPage> {
        let url = format!("{}/users/{}/bookmarks", self.base_url, user_id);

        let mut query: Vec<(&str, String)> = vec![
            ("max_results", self.page_size.to_string()),
            (
                "tweet.fields",
                "created_at,entities,referenced_tweets,attachments,note_tweet".to_string(),
            ),
            (
                "expansions",
                "author_id,attachments.media_keys,referenced_tweets.id,referenced_tweets.id.author_id"
                    .to_string(),
            ),
            (
                "media.fields",
                "url,preview_image_url,type,width,height,duration_ms,variants".to_string(),
            ),
            ("user.fields", "name,username,profile_image_url".to_string()),
        ];
        if let Some(cursor) = cursor {
            query.push(("pagination_token", cursor.to_string()));
        }

        debug!(
            subsystem = "fetch",
            component = "platform",
            user_id,
            cursor = cursor.unwrap_or("-"),
            "Fetching saved-posts page"
        );

        let response = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .query(&query)
            .send()
            .await?;
        let status = response.status();

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(Error::Unauthorized(
                    "platform rejected the access token".to_string(),
                ));
            }
            StatusCode::NOT_FOUND => {
                return Err(Error::NotFound(format!("platform user {}", user_id)));
            }
            s if !s.is_success() => {
                warn!(
                    subsystem = "fetch",
                    component = "platform",
                    user_id,
                    upstream_status = s.as_u16(),
                    "Platform API returned error status"
                );
                return Err(Error::upstream_status(
                    s.as_u16(),
                    "platform API error listing saved posts",
                ));
            }
            _ => {}
        }

        let body: V2Response = response.json().await?;
        let mut posts = Vec::with_capacity(body.data.len());
        for tweet in &body.data {
            let wire = map_tweet(tweet, &body.includes);
            match normalize_post(&wire, IngestSource::Sync) {
                Ok(post) => posts.push(post),
                // One malformed item must not sink the page.
                Err(e) => warn!(
                    subsystem = "fetch",
                    component = "platform",
                    post_id = %tweet.id,
                    error = %e,
                    "Skipping post that failed to normalize"
                ),
            }
        }

        debug!(
            subsystem = "fetch",
            component = "platform",
            user_id,
            result_count = posts.len(),
            has_next = body.meta.next_token.is_some(),
            "Saved-posts page fetched"
        );

        Ok(SavedPostsPage {
            posts,
            next_cursor: body.meta.next_token,
        })
    }
}
