//! Read-status handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;

use magpie_core::ReadStatusRepository;

use crate::auth::AuthedUser;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn mark_read(
    State(state): State<AppState>,
    AuthedUser(ctx): AuthedUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.db.read_status.mark_read(&ctx, &id).await?;
    Ok(Json(serde_json::json!({ "read": true })))
}

pub async fn mark_unread(
    State(state): State<AppState>,
    AuthedUser(ctx): AuthedUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.db.read_status.mark_unread(&ctx, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
