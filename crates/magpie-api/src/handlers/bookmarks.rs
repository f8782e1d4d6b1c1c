//! Bookmark handlers: manual add, list, fetch, edit, delete.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use magpie_core::{
    parse_post_url, Bookmark, BookmarkRepository, ContentCategory, Error, IngestSource,
    ListBookmarksRequest,
};

use crate::auth::AuthedUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Manual-add request: either `url`, or `author` + `post_id`.
#[derive(Debug, Deserialize)]
pub struct AddBookmarkRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub post_id: Option<String>,
    /// Optional initial tag, applied only when the bookmark is new.
    #[serde(default)]
    pub tag: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AddBookmarkResponse {
    pub duplicate: bool,
    pub bookmark: Bookmark,
}

/// Add a single bookmark by post URL or author + id.
///
/// A duplicate is a 200 with `duplicate: true`, never an error.
pub async fn add_bookmark(
    State(state): State<AppState>,
    AuthedUser(ctx): AuthedUser,
    Json(req): Json<AddBookmarkRequest>,
) -> Result<(StatusCode, Json<AddBookmarkResponse>), ApiError> {
    let (author, post_id, source) = match (&req.url, &req.author, &req.post_id) {
        (Some(url), _, _) => {
            let (author, post_id) = parse_post_url(url)?;
            (author, post_id, IngestSource::UrlPrefix)
        }
        (None, Some(author), Some(post_id)) => {
            (author.clone(), post_id.clone(), IngestSource::Manual)
        }
        _ => {
            return Err(ApiError::BadRequest(
                "provide either url or author + post_id".to_string(),
            ))
        }
    };

    let post = state
        .post_source
        .fetch_post(&author, &post_id, source)
        .await?;
    let outcome = state
        .db
        .bookmarks
        .ingest(&ctx, &post, req.tag.as_deref())
        .await?;

    let bookmark = state.db.bookmarks.fetch(&ctx, &outcome.bookmark_id).await?;
    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(AddBookmarkResponse {
            duplicate: !outcome.created,
            bookmark,
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub unread: Option<bool>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ListBookmarksJson {
    pub bookmarks: Vec<Bookmark>,
    pub total: i64,
}

fn parse_category(s: &str) -> Result<ContentCategory, Error> {
    match s {
        "tweet" => Ok(ContentCategory::Tweet),
        "photo" => Ok(ContentCategory::Photo),
        "video" => Ok(ContentCategory::Video),
        "article" => Ok(ContentCategory::Article),
        other => Err(Error::InvalidInput(format!(
            "unknown category '{}'",
            other
        ))),
    }
}

pub async fn list_bookmarks(
    State(state): State<AppState>,
    AuthedUser(ctx): AuthedUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListBookmarksJson>, ApiError> {
    let category = query
        .category
        .as_deref()
        .map(parse_category)
        .transpose()?;

    let response = state
        .db
        .bookmarks
        .list(
            &ctx,
            ListBookmarksRequest {
                tag: query.tag,
                category,
                unread: query.unread,
                limit: query.limit,
                offset: query.offset,
            },
        )
        .await?;

    Ok(Json(ListBookmarksJson {
        bookmarks: response.bookmarks,
        total: response.total,
    }))
}

pub async fn get_bookmark(
    State(state): State<AppState>,
    AuthedUser(ctx): AuthedUser,
    Path(id): Path<String>,
) -> Result<Json<Bookmark>, ApiError> {
    Ok(Json(state.db.bookmarks.fetch(&ctx, &id).await?))
}

#[derive(Debug, Deserialize)]
pub struct UpdateBookmarkRequest {
    pub text: String,
}

pub async fn update_bookmark(
    State(state): State<AppState>,
    AuthedUser(ctx): AuthedUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateBookmarkRequest>,
) -> Result<Json<Bookmark>, ApiError> {
    state.db.bookmarks.update_text(&ctx, &id, &req.text).await?;
    Ok(Json(state.db.bookmarks.fetch(&ctx, &id).await?))
}

pub async fn delete_bookmark(
    State(state): State<AppState>,
    AuthedUser(ctx): AuthedUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.db.bookmarks.delete(&ctx, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
