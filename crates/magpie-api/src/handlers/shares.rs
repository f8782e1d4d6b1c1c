//! Share handlers: publish/unpublish tag collections, public listing,
//! and clone-into-account.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Serialize;
use uuid::Uuid;

use magpie_core::{
    Bookmark, BookmarkRepository, CloneSummary, Error, ListBookmarksRequest, Share,
    ShareRepository, TagRepository, UserContext,
};

use crate::auth::AuthedUser;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn publish_share(
    State(state): State<AppState>,
    AuthedUser(ctx): AuthedUser,
    Path(tag): Path<String>,
) -> Result<(StatusCode, Json<Share>), ApiError> {
    let share = state.db.shares.publish(&ctx, &tag).await?;
    Ok((StatusCode::CREATED, Json(share)))
}

pub async fn unpublish_share(
    State(state): State<AppState>,
    AuthedUser(ctx): AuthedUser,
    Path(tag): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.db.shares.unpublish(&ctx, &tag).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct SharedCollectionResponse {
    pub tag: String,
    pub bookmarks: Vec<Bookmark>,
    pub total: i64,
}

fn parse_share_id(share_id: &str) -> Result<Uuid, Error> {
    Uuid::parse_str(share_id).map_err(|_| Error::NotFound(format!("share {}", share_id)))
}

/// Public listing of a shared collection. No session required; the
/// share id itself is the capability.
pub async fn get_share(
    State(state): State<AppState>,
    Path(share_id): Path<String>,
) -> Result<Json<SharedCollectionResponse>, ApiError> {
    let share = state.db.shares.fetch(parse_share_id(&share_id)?).await?;

    // Listing happens under the owner's scope, restricted to the shared
    // tag; nothing else of theirs is reachable through this route.
    let owner = UserContext::new(share.owner_user_id.clone());
    let listed = state
        .db
        .bookmarks
        .list(
            &owner,
            ListBookmarksRequest {
                tag: Some(share.tag.clone()),
                ..Default::default()
            },
        )
        .await?;

    Ok(Json(SharedCollectionResponse {
        tag: share.tag,
        bookmarks: listed.bookmarks,
        total: listed.total,
    }))
}

/// Clone a shared collection into the calling user's account.
pub async fn clone_share(
    State(state): State<AppState>,
    AuthedUser(ctx): AuthedUser,
    Path(share_id): Path<String>,
) -> Result<Json<CloneSummary>, ApiError> {
    let share = state.db.shares.fetch(parse_share_id(&share_id)?).await?;
    let owner = UserContext::new(share.owner_user_id.clone());

    let summary = state
        .db
        .tags
        .clone_collection(&owner, &share.tag, &ctx)
        .await?;
    Ok(Json(summary))
}
