//! # magpie-api
//!
//! HTTP API server for magpie: session-authenticated bookmark CRUD,
//! tagging, read tracking, public shares, and the server-sent-events
//! sync stream.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::state::MakeRequestUuidV7;

/// Build the full application router over the given state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/bookmarks",
            post(handlers::bookmarks::add_bookmark).get(handlers::bookmarks::list_bookmarks),
        )
        .route(
            "/bookmarks/:id",
            get(handlers::bookmarks::get_bookmark)
                .patch(handlers::bookmarks::update_bookmark)
                .delete(handlers::bookmarks::delete_bookmark),
        )
        .route("/bookmarks/:id/tags", post(handlers::tags::add_tag))
        .route(
            "/bookmarks/:id/tags/:tag",
            delete(handlers::tags::remove_tag),
        )
        .route("/tags", get(handlers::tags::list_tags))
        .route(
            "/bookmarks/:id/read",
            put(handlers::read::mark_read).delete(handlers::read::mark_unread),
        )
        .route("/sync/status", get(handlers::sync::sync_status))
        .route("/sync/stream", get(handlers::sync::sync_stream))
        .route(
            "/tags/:tag/share",
            post(handlers::shares::publish_share).delete(handlers::shares::unpublish_share),
        )
        .route("/shares/:share_id", get(handlers::shares::get_share))
        .route(
            "/shares/:share_id/clone",
            post(handlers::shares::clone_share),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7::default()))
        .with_state(state)
}
