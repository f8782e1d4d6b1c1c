//! Mock post sources for deterministic testing.
//!
//! Provide in-memory implementations of [`SavedPostsSource`] and
//! [`PostSource`] plus fixture builders for normalized posts, so
//! orchestrator and persistence tests run without network access.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use magpie_core::{
    ContentCategory, Error, IngestSource, MediaDescriptor, MediaType, NormalizedPost, PostAuthor,
    PostSource, Result, SavedPostsPage, SavedPostsSource,
};

// =============================================================================
// FIXTURES
// =============================================================================

/// A plain text post fixture.
pub fn sample_post(post_id: &str) -> NormalizedPost {
    NormalizedPost {
        post_id: post_id.to_string(),
        author: PostAuthor {
            handle: "alice".to_string(),
            name: "Alice".to_string(),
            avatar_url: None,
        },
        text: format!("post body {}", post_id),
        canonical_url: format!("https://x.com/alice/status/{}", post_id),
        posted_at: None,
        category: ContentCategory::Tweet,
        is_reply: false,
        is_quote: false,
        is_repost: false,
        quote_context: None,
        quoted_post_id: None,
        source: IngestSource::Sync,
        raw: json!({"id": post_id}),
        media: vec![],
        links: vec![],
        quoted: None,
    }
}

/// A photo post fixture with one attachment.
pub fn sample_photo_post(post_id: &str) -> NormalizedPost {
    let mut post = sample_post(post_id);
    post.category = ContentCategory::Photo;
    post.media = vec![MediaDescriptor {
        media_type: MediaType::Photo,
        url: format!("https://img/{}.jpg", post_id),
        preview_url: None,
        width: Some(800),
        height: Some(600),
        duration_ms: None,
    }];
    post
}

/// A quote-post fixture whose quoted half has id `quoted_id`.
pub fn sample_quote_post(post_id: &str, quoted_id: &str) -> NormalizedPost {
    let mut quoted = sample_post(quoted_id);
    quoted.author.handle = "bob".to_string();
    quoted.author.name = "Bob".to_string();
    quoted.source = IngestSource::Quoted;

    let mut post = sample_post(post_id);
    post.is_quote = true;
    post.quoted_post_id = Some(quoted_id.to_string());
    post.quote_context = Some(json!({
        "author": "bob",
        "name": "Bob",
        "text": quoted.text,
    }));
    post.quoted = Some(Box::new(quoted));
    post
}

// =============================================================================
// MOCK SAVED-POSTS SOURCE
// =============================================================================

/// Scripted saved-posts list for orchestrator tests.
///
/// Pages are served in order, with synthetic cursors between them. A
/// failure can be injected at any page index to exercise the fail-fast
/// path.
#[derive(Clone, Default)]
pub struct MockSavedPostsSource {
    pages: Vec<Vec<NormalizedPost>>,
    fail_at_page: Option<usize>,
    calls: Arc<Mutex<usize>>,
}

impl MockSavedPostsSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one page of posts.
    pub fn with_page(mut self, posts: Vec<NormalizedPost>) -> Self {
        self.pages.push(posts);
        self
    }

    /// Fail with an upstream error when page `index` is requested.
    pub fn with_failure_at_page(mut self, index: usize) -> Self {
        self.fail_at_page = Some(index);
        self
    }

    /// Number of page fetches served (or attempted).
    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }

    fn page_index(cursor: Option<&str>) -> usize {
        cursor
            .and_then(|c| c.strip_prefix("page-"))
            .and_then(|n| n.parse().ok())
            .unwrap_or(0)
    }
}

#[async_trait]
impl SavedPostsSource for MockSavedPostsSource {
    async fn saved_posts_page(
        &self,
        _user_id: &str,
        _access_token: &str,
        cursor: Option<&str>,
    ) -> Result<SavedPostsPage> {
        *self.calls.lock().unwrap() += 1;
        let index = Self::page_index(cursor);

        if self.fail_at_page == Some(index) {
            return Err(Error::upstream_status(500, "injected failure"));
        }

        let posts = self.pages.get(index).cloned().unwrap_or_default();
        let next_cursor = if index + 1 < self.pages.len() {
            Some(format!("page-{}", index + 1))
        } else {
            None
        };
        Ok(SavedPostsPage { posts, next_cursor })
    }
}

// =============================================================================
// MOCK POST SOURCE
// =============================================================================

/// In-memory single-post source keyed by `(handle, post_id)`.
#[derive(Clone, Default)]
pub struct MockPostSource {
    posts: HashMap<(String, String), NormalizedPost>,
}

impl MockPostSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a post under its author's handle.
    pub fn with_post(mut self, post: NormalizedPost) -> Self {
        self.posts
            .insert((post.author.handle.clone(), post.post_id.clone()), post);
        self
    }
}

#[async_trait]
impl PostSource for MockPostSource {
    async fn fetch_post(
        &self,
        handle: &str,
        post_id: &str,
        source: IngestSource,
    ) -> Result<NormalizedPost> {
        magpie_core::validate_handle(handle)?;
        magpie_core::validate_post_id(post_id)?;
        self.posts
            .get(&(handle.to_string(), post_id.to_string()))
            .cloned()
            .map(|mut post| {
                post.source = source;
                post
            })
            .ok_or_else(|| Error::NotFound(format!("post {} not found", post_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_pages_served_in_order() {
        let source = MockSavedPostsSource::new()
            .with_page(vec![sample_post("1"), sample_post("2")])
            .with_page(vec![sample_post("3")]);

        let page0 = source.saved_posts_page("u", "t", None).await.unwrap();
        assert_eq!(page0.posts.len(), 2);
        let cursor = page0.next_cursor.unwrap();

        let page1 = source
            .saved_posts_page("u", "t", Some(&cursor))
            .await
            .unwrap();
        assert_eq!(page1.posts.len(), 1);
        assert!(page1.next_cursor.is_none());
        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_injected_failure() {
        let source = MockSavedPostsSource::new()
            .with_page(vec![sample_post("1")])
            .with_page(vec![sample_post("2")])
            .with_failure_at_page(1);

        assert!(source.saved_posts_page("u", "t", None).await.is_ok());
        let err = source
            .saved_posts_page("u", "t", Some("page-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Upstream { .. }));
    }

    #[tokio::test]
    async fn test_mock_post_source_lookup() {
        let source = MockPostSource::new().with_post(sample_post("42"));

        let post = source
            .fetch_post("alice", "42", IngestSource::Manual)
            .await
            .unwrap();
        assert_eq!(post.post_id, "42");
        assert_eq!(post.source, IngestSource::Manual);

        let err = source
            .fetch_post("alice", "43", IngestSource::Manual)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_mock_post_source_validates_input() {
        let source = MockPostSource::new();
        let err = source
            .fetch_post("bad handle", "1", IngestSource::Manual)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
