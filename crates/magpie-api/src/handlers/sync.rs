//! Sync handlers: cooldown status and the SSE progress stream.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::Json;
use futures::stream::Stream;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::debug;

use magpie_core::defaults::SYNC_EVENT_CAPACITY;
use magpie_core::{CooldownStatus, SyncLogRepository};
use magpie_sync::SyncOrchestrator;

use crate::auth::AuthedUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Whether the user may sync now.
pub async fn sync_status(
    State(state): State<AppState>,
    AuthedUser(ctx): AuthedUser,
) -> Result<Json<CooldownStatus>, ApiError> {
    Ok(Json(state.db.sync_log.check_cooldown(&ctx).await?))
}

/// Start a sync and stream its progress as server-sent events.
///
/// The stream is one-directional: the client stopping to listen drops
/// the channel receiver, which the orchestrator observes at the next
/// page boundary and halts. Failures terminate the stream with an
/// `error` event rather than breaking the connection.
pub async fn sync_stream(
    State(state): State<AppState>,
    AuthedUser(ctx): AuthedUser,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::channel(SYNC_EVENT_CAPACITY);

    let orchestrator = SyncOrchestrator::new(
        &state.db,
        state.saved_source.clone(),
        state.sync_config.clone(),
    );
    tokio::spawn(async move {
        // Refusals and failures already surface as error events on the
        // stream; the return value is only logged here.
        if let Err(e) = orchestrator.run(&ctx, tx).await {
            debug!(subsystem = "api", op = "sync_stream", error = %e, "Sync run ended with error");
        }
    });

    let stream = ReceiverStream::new(rx).map(|event| {
        let sse_event = Event::default().event(event.event_type());
        Ok::<Event, Infallible>(
            sse_event
                .json_data(&event)
                .unwrap_or_else(|_| Event::default().event("error").data("serialization failure")),
        )
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
