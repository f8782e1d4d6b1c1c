//! Shared application state.

use std::sync::Arc;

use axum::http::Request;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use magpie_core::{PostSource, SavedPostsSource};
use magpie_db::Database;
use magpie_sync::SyncConfig;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    /// Single-post source (mirror API) for manual add and previews.
    pub post_source: Arc<dyn PostSource>,
    /// Saved-posts source (platform API) for bulk sync.
    pub saved_source: Arc<dyn SavedPostsSource>,
    pub sync_config: SyncConfig,
}

impl AppState {
    pub fn new(
        db: Arc<Database>,
        post_source: Arc<dyn PostSource>,
        saved_source: Arc<dyn SavedPostsSource>,
        sync_config: SyncConfig,
    ) -> Self {
        Self {
            db,
            post_source,
            saved_source,
            sync_config,
        }
    }
}

/// Generates time-ordered UUIDv7 request correlation IDs.
///
/// UUIDv7 embeds a Unix timestamp, so IDs sort chronologically. Useful
/// for log correlation when chasing a failed sync across subsystems.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}
