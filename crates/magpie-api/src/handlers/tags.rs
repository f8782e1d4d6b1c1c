//! Tag handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use magpie_core::{TagRepository, TagSummary};

use crate::auth::AuthedUser;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddTagRequest {
    pub tag: String,
}

#[derive(Debug, Serialize)]
pub struct AddTagResponse {
    /// The tag as stored (lower-cased, length-capped).
    pub tag: String,
}

pub async fn add_tag(
    State(state): State<AppState>,
    AuthedUser(ctx): AuthedUser,
    Path(id): Path<String>,
    Json(req): Json<AddTagRequest>,
) -> Result<(StatusCode, Json<AddTagResponse>), ApiError> {
    let stored = state.db.tags.add(&ctx, &id, &req.tag).await?;
    Ok((StatusCode::CREATED, Json(AddTagResponse { tag: stored })))
}

pub async fn remove_tag(
    State(state): State<AppState>,
    AuthedUser(ctx): AuthedUser,
    Path((id, tag)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state.db.tags.remove(&ctx, &id, &tag).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct ListTagsResponse {
    pub tags: Vec<TagSummary>,
}

pub async fn list_tags(
    State(state): State<AppState>,
    AuthedUser(ctx): AuthedUser,
) -> Result<Json<ListTagsResponse>, ApiError> {
    let tags = state.db.tags.list(&ctx).await?;
    Ok(Json(ListTagsResponse { tags }))
}
