//! Session authentication extractor.
//!
//! Handlers that take [`AuthedUser`] receive a resolved [`UserContext`];
//! the bearer token is looked up against the session store (digests
//! only). There is no other way for request input to become a user
//! scope.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use magpie_core::{AccountRepository, UserContext};

use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated user for this request.
pub struct AuthedUser(pub UserContext);

#[async_trait]
impl FromRequestParts<AppState> for AuthedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_string()))?;

        let ctx = state
            .db
            .accounts
            .resolve_session(token)
            .await
            .map_err(ApiError::from)?
            .ok_or_else(|| ApiError::Unauthorized("invalid session".to_string()))?;

        Ok(AuthedUser(ctx))
    }
}
