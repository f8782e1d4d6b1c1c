//! Loosely-typed wire payloads from the external APIs.
//!
//! The fetched post object has a dozen optional nested shapes depending
//! on content type (text, photo, video, quote, article, link card).
//! These types absorb that looseness with `Option` and `#[serde(default)]`
//! so parsing never fails on an absent section; the normalizer is the
//! only consumer and nothing downstream of it sees these shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Author block as the mirror API serves it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireAuthor {
    pub screen_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// One media attachment on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireMedia {
    /// "photo" | "video" | "gif" / "animated_gif"
    #[serde(rename = "type")]
    pub media_type: String,
    pub url: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub width: Option<i64>,
    #[serde(default)]
    pub height: Option<i64>,
    /// Seconds, video only.
    #[serde(default)]
    pub duration: Option<f64>,
}

/// Media container: the mirror API nests attachments under `media.all`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WireMediaSet {
    #[serde(default)]
    pub all: Vec<WireMedia>,
}

/// One block of long-form article content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireArticleBlock {
    /// "header" | "paragraph" | "image"
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default)]
    pub text: Option<String>,
    /// For image blocks: key into the article's media entity map.
    #[serde(default)]
    pub media_id: Option<String>,
}

/// Entry in the article media-entity lookup table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireMediaEntity {
    pub url: String,
}

/// Long-form article content attached to a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireArticle {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub blocks: Vec<WireArticleBlock>,
    /// Media entities keyed by media id, resolved by image blocks.
    #[serde(default)]
    pub media_entities: HashMap<String, WireMediaEntity>,
}

/// Shortened-URL entity from the post body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireUrlEntity {
    pub short_url: String,
    pub expanded_url: String,
    #[serde(default)]
    pub display_url: Option<String>,
}

/// One post as fetched from the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WirePost {
    pub id: String,
    pub author: WireAuthor,
    /// Display text; may be truncated by the platform.
    #[serde(default)]
    pub text: String,
    /// Untruncated text, present only when `text` was cut off.
    #[serde(default)]
    pub full_text: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub media: Option<WireMediaSet>,
    #[serde(default)]
    pub article: Option<WireArticle>,
    /// Embedded quoted post, itself a full post shape.
    #[serde(default)]
    pub quote: Option<Box<WirePost>>,
    #[serde(default)]
    pub urls: Vec<WireUrlEntity>,
    /// Handle this post replies to, when it is a reply.
    #[serde(default)]
    pub replying_to: Option<String>,
    #[serde(default)]
    pub is_repost: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_post_parses() {
        let json = r#"{
            "id": "123",
            "author": {"screen_name": "alice"},
            "text": "hello"
        }"#;
        let post: WirePost = serde_json::from_str(json).unwrap();
        assert_eq!(post.id, "123");
        assert_eq!(post.author.screen_name, "alice");
        assert!(post.media.is_none());
        assert!(post.quote.is_none());
        assert!(post.urls.is_empty());
    }

    #[test]
    fn test_media_set_parses() {
        let json = r#"{
            "id": "1",
            "author": {"screen_name": "a"},
            "text": "",
            "media": {"all": [
                {"type": "photo", "url": "https://img/1.jpg", "width": 800, "height": 600},
                {"type": "video", "url": "https://vid/1.mp4", "duration": 12.5}
            ]}
        }"#;
        let post: WirePost = serde_json::from_str(json).unwrap();
        let media = post.media.unwrap();
        assert_eq!(media.all.len(), 2);
        assert_eq!(media.all[0].media_type, "photo");
        assert_eq!(media.all[1].duration, Some(12.5));
    }

    #[test]
    fn test_nested_quote_parses() {
        let json = r#"{
            "id": "2",
            "author": {"screen_name": "outer"},
            "text": "look at this",
            "quote": {
                "id": "1",
                "author": {"screen_name": "inner"},
                "text": "original"
            }
        }"#;
        let post: WirePost = serde_json::from_str(json).unwrap();
        let quote = post.quote.unwrap();
        assert_eq!(quote.id, "1");
        assert_eq!(quote.author.screen_name, "inner");
    }

    #[test]
    fn test_article_blocks_parse() {
        let json = r#"{
            "id": "3",
            "author": {"screen_name": "writer"},
            "text": "",
            "article": {
                "title": "A Title",
                "blocks": [
                    {"type": "header", "text": "Intro"},
                    {"type": "paragraph", "text": "Body text."},
                    {"type": "image", "media_id": "m1"}
                ],
                "media_entities": {"m1": {"url": "https://img/a.png"}}
            }
        }"#;
        let post: WirePost = serde_json::from_str(json).unwrap();
        let article = post.article.unwrap();
        assert_eq!(article.blocks.len(), 3);
        assert_eq!(article.media_entities["m1"].url, "https://img/a.png");
    }
}
