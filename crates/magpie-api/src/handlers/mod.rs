//! HTTP route handlers.

pub mod bookmarks;
pub mod read;
pub mod shares;
pub mod sync;
pub mod tags;

use axum::response::Json;

/// Liveness probe.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
