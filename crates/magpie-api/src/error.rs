//! HTTP error mapping for the API layer.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

use magpie_core::Error;

/// API-level error with an HTTP status attached.
///
/// Duplicates never pass through here: the dedup gate reports them as a
/// successful outcome with a `duplicate` flag.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    /// Upstream returned 5xx or timed out.
    BadGateway(String),
    Internal(Error),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::LimitExceeded(msg) => ApiError::BadRequest(msg),
            Error::Unauthorized(msg) => ApiError::Unauthorized(msg),
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::Timeout(msg) => ApiError::BadGateway(msg),
            Error::Upstream {
                status: Some(status),
                message,
            } if status >= 500 => ApiError::BadGateway(format!("upstream {}: {}", status, message)),
            other => ApiError::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::Internal(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
