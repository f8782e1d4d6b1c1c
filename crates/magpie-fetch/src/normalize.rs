//! Content normalizer: wire payload → canonical record.
//!
//! Maps the heterogeneous fetched shapes (text, photo, video, quote,
//! article, link card) into one [`NormalizedPost`] plus media
//! descriptors plus, for quote-posts, a nested record for the quoted
//! post. The raw wire shape does not cross this boundary.

use serde_json::json;
use tracing::debug;

use magpie_core::defaults::QUOTE_SNIPPET_LEN;
use magpie_core::{
    ContentCategory, IngestSource, LinkDescriptor, MediaDescriptor, MediaType, NormalizedPost,
    PostAuthor, Result,
};

use crate::wire::{WireArticle, WireMedia, WirePost};

/// Normalize one fetched post.
///
/// `source` tags how the primary record entered the store; an embedded
/// quoted post is always tagged [`IngestSource::Quoted`] regardless.
pub fn normalize_post(wire: &WirePost, source: IngestSource) -> Result<NormalizedPost> {
    let raw = serde_json::to_value(wire)?;
    Ok(normalize_inner(wire, source, raw))
}

fn normalize_inner(
    wire: &WirePost,
    source: IngestSource,
    raw: serde_json::Value,
) -> NormalizedPost {
    let author = PostAuthor {
        handle: wire.author.screen_name.clone(),
        name: wire
            .author
            .name
            .clone()
            .unwrap_or_else(|| wire.author.screen_name.clone()),
        avatar_url: wire.author.avatar_url.clone(),
    };

    // Never store silently truncated text: the full-text field wins.
    let body = wire.full_text.as_deref().unwrap_or(&wire.text);
    let mut text = expand_short_urls(body, wire);

    let media: Vec<MediaDescriptor> = wire
        .media
        .as_ref()
        .map(|set| set.all.iter().map(media_descriptor).collect())
        .unwrap_or_default();

    let category = assign_category(&media, wire.article.as_ref());

    if let (ContentCategory::Article, Some(article)) = (category, wire.article.as_ref()) {
        text = flatten_article(article);
    }

    let links: Vec<LinkDescriptor> = wire
        .urls
        .iter()
        .map(|u| LinkDescriptor {
            short_url: u.short_url.clone(),
            expanded_url: u.expanded_url.clone(),
            display_url: u.display_url.clone(),
        })
        .collect();

    let canonical_url = wire.url.clone().unwrap_or_else(|| {
        format!(
            "https://x.com/{}/status/{}",
            wire.author.screen_name, wire.id
        )
    });

    // A quoted post becomes its own independent record, persisted through
    // the same dedup gate. The context blob carries enough for display
    // without a second fetch at render time.
    let (quoted, quoted_post_id, quote_context) = match wire.quote.as_deref() {
        Some(quote_wire) => {
            let quoted_raw = serde_json::to_value(quote_wire).unwrap_or_default();
            let quoted = normalize_inner(quote_wire, IngestSource::Quoted, quoted_raw);
            let snippet: String = quoted.text.chars().take(QUOTE_SNIPPET_LEN).collect();
            let context = json!({
                "author": quoted.author.handle,
                "name": quoted.author.name,
                "text": snippet,
            });
            (
                Some(Box::new(quoted)),
                Some(quote_wire.id.clone()),
                Some(context),
            )
        }
        None => (None, None, None),
    };

    debug!(
        post_id = %wire.id,
        category = category.as_str(),
        media_count = media.len(),
        quoted = quoted.is_some(),
        "Normalized post"
    );

    NormalizedPost {
        post_id: wire.id.clone(),
        author,
        text,
        canonical_url,
        posted_at: wire.created_at,
        category,
        is_reply: wire.replying_to.is_some(),
        is_quote: quoted.is_some(),
        is_repost: wire.is_repost,
        quote_context,
        quoted_post_id,
        source,
        raw,
        media,
        links,
        quoted,
    }
}

/// Category assignment, first match wins: video > photo > article > tweet.
///
/// Animated GIFs are served as looping videos and count as video here.
fn assign_category(media: &[MediaDescriptor], article: Option<&WireArticle>) -> ContentCategory {
    if media
        .iter()
        .any(|m| matches!(m.media_type, MediaType::Video | MediaType::AnimatedGif))
    {
        return ContentCategory::Video;
    }
    if media.iter().any(|m| m.media_type == MediaType::Photo) {
        return ContentCategory::Photo;
    }
    if article.is_some() {
        return ContentCategory::Article;
    }
    ContentCategory::Tweet
}

fn media_descriptor(m: &WireMedia) -> MediaDescriptor {
    let media_type = match m.media_type.as_str() {
        "video" => MediaType::Video,
        "gif" | "animated_gif" => MediaType::AnimatedGif,
        _ => MediaType::Photo,
    };
    MediaDescriptor {
        media_type,
        url: m.url.clone(),
        preview_url: m.thumbnail_url.clone(),
        width: m.width,
        height: m.height,
        duration_ms: m.duration.map(|secs| (secs * 1000.0) as i64),
    }
}

/// Replace shortened URLs in the body with their resolved destinations.
///
/// Only URLs present in the post's entity list are rewritten; an
/// unmatched short URL is left as-is rather than guessed at.
fn expand_short_urls(text: &str, wire: &WirePost) -> String {
    let mut out = text.to_string();
    for entity in &wire.urls {
        if entity.short_url.is_empty() {
            continue;
        }
        out = out.replace(&entity.short_url, &entity.expanded_url);
    }
    out
}

/// Flatten block-structured article content into one markdown string.
///
/// Image blocks resolve through the article's media-entity table; an
/// image whose media id has no entry is dropped.
fn flatten_article(article: &WireArticle) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(title) = &article.title {
        parts.push(format!("# {}", title));
    }
    for block in &article.blocks {
        match block.block_type.as_str() {
            "header" => {
                if let Some(text) = &block.text {
                    parts.push(format!("## {}", text));
                }
            }
            "image" => {
                if let Some(entity) = block
                    .media_id
                    .as_ref()
                    .and_then(|id| article.media_entities.get(id))
                {
                    parts.push(format!("![]({})", entity.url));
                }
            }
            _ => {
                if let Some(text) = &block.text {
                    parts.push(text.clone());
                }
            }
        }
    }
    parts.join("\n\n")
}
