//! Authenticated platform v2 API shapes and their mapping onto the
//! common wire shape.
//!
//! The v2 list endpoints return flat tweet objects with media, author,
//! and referenced-tweet data hoisted into a sidecar `includes` block,
//! joined by key. `map_tweet` re-joins those references and produces the
//! same [`WirePost`] shape the mirror API serves, so the normalizer has
//! a single input shape.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::wire::{WireAuthor, WireMedia, WireMediaSet, WirePost, WireUrlEntity};

#[derive(Debug, Clone, Deserialize)]
pub struct V2Response {
    #[serde(default)]
    pub data: Vec<V2Tweet>,
    #[serde(default)]
    pub includes: V2Includes,
    #[serde(default)]
    pub meta: V2Meta,
}

#[derive(Debug, Clone, Deserialize)]
pub struct V2Tweet {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub attachments: Option<V2Attachments>,
    #[serde(default)]
    pub referenced_tweets: Vec<V2Reference>,
    #[serde(default)]
    pub entities: Option<V2Entities>,
    /// Long-post body; present when `text` is truncated.
    #[serde(default)]
    pub note_tweet: Option<V2NoteTweet>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct V2Attachments {
    #[serde(default)]
    pub media_keys: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct V2Reference {
    #[serde(rename = "type")]
    pub ref_type: String,
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct V2Entities {
    #[serde(default)]
    pub urls: Vec<V2UrlEntity>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct V2UrlEntity {
    pub url: String,
    pub expanded_url: String,
    #[serde(default)]
    pub display_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct V2NoteTweet {
    pub text: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct V2Includes {
    #[serde(default)]
    pub media: Vec<V2Media>,
    #[serde(default)]
    pub users: Vec<V2User>,
    #[serde(default)]
    pub tweets: Vec<V2Tweet>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct V2Media {
    pub media_key: String,
    #[serde(rename = "type")]
    pub media_type: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub preview_image_url: Option<String>,
    #[serde(default)]
    pub width: Option<i64>,
    #[serde(default)]
    pub height: Option<i64>,
    #[serde(default)]
    pub duration_ms: Option<i64>,
    #[serde(default)]
    pub variants: Vec<V2Variant>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct V2Variant {
    #[serde(default)]
    pub bit_rate: Option<i64>,
    pub content_type: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct V2User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub profile_image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct V2Meta {
    #[serde(default)]
    pub next_token: Option<String>,
    #[serde(default)]
    pub result_count: Option<i64>,
}

/// Join one v2 tweet against its `includes` sidecar into a [`WirePost`].
pub fn map_tweet(tweet: &V2Tweet, includes: &V2Includes) -> WirePost {
    let author = match tweet
        .author_id
        .as_ref()
        .and_then(|id| includes.users.iter().find(|u| &u.id == id))
    {
        Some(user) => WireAuthor {
            screen_name: user.username.clone(),
            name: user.name.clone(),
            avatar_url: user.profile_image_url.clone(),
        },
        None => WireAuthor {
            screen_name: tweet.author_id.clone().unwrap_or_default(),
            name: None,
            avatar_url: None,
        },
    };

    let media: Vec<WireMedia> = tweet
        .attachments
        .as_ref()
        .map(|a| {
            a.media_keys
                .iter()
                .filter_map(|key| includes.media.iter().find(|m| &m.media_key == key))
                .map(map_media)
                .collect()
        })
        .unwrap_or_default();

    let quote = tweet
        .referenced_tweets
        .iter()
        .find(|r| r.ref_type == "quoted")
        .and_then(|r| includes.tweets.iter().find(|t| t.id == r.id))
        .map(|quoted| Box::new(map_tweet(quoted, includes)));

    let replying_to = tweet
        .referenced_tweets
        .iter()
        .find(|r| r.ref_type == "replied_to")
        .map(|r| r.id.clone());

    let is_repost = tweet
        .referenced_tweets
        .iter()
        .any(|r| r.ref_type == "retweeted");

    let urls = tweet
        .entities
        .as_ref()
        .map(|e| {
            e.urls
                .iter()
                .map(|u| WireUrlEntity {
                    short_url: u.url.clone(),
                    expanded_url: u.expanded_url.clone(),
                    display_url: u.display_url.clone(),
                })
                .collect()
        })
        .unwrap_or_default();

    let url = if author.screen_name.is_empty() {
        None
    } else {
        Some(format!(
            "https://x.com/{}/status/{}",
            author.screen_name, tweet.id
        ))
    };

    WirePost {
        id: tweet.id.clone(),
        author,
        text: tweet.text.clone(),
        full_text: tweet.note_tweet.as_ref().map(|n| n.text.clone()),
        url,
        created_at: tweet.created_at,
        media: if media.is_empty() {
            None
        } else {
            Some(WireMediaSet { all: media })
        },
        // The v2 list payload carries no long-form article blocks.
        article: None,
        quote,
        urls,
        replying_to,
        is_repost,
    }
}

/// Best playable URL for a media object: highest-bitrate mp4 variant for
/// video, else the direct url, else the preview.
fn map_media(m: &V2Media) -> WireMedia {
    let url = best_variant(m)
        .or_else(|| m.url.clone())
        .or_else(|| m.preview_image_url.clone())
        .unwrap_or_default();

    WireMedia {
        media_type: m.media_type.clone(),
        url,
        thumbnail_url: m.preview_image_url.clone(),
        width: m.width,
        height: m.height,
        duration: m.duration_ms.map(|ms| ms as f64 / 1000.0),
    }
}

fn best_variant(m: &V2Media) -> Option<String> {
    m.variants
        .iter()
        .filter(|v| v.content_type == "video/mp4")
        .max_by_key(|v| v.bit_rate.unwrap_or(0))
        .map(|v| v.url.clone())
}
