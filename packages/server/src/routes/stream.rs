//! SSE streaming of per-job progress events.
//!
//! Subscribes to the job's StreamHub topic and forwards events as named SSE
//! events. A stream that goes idle is closed with a `timeout` event while
//! the job keeps running; clients must re-query the registry by job id,
//! never guess by recency.

use std::convert::Infallible;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{self, Stream, StreamExt};
use tokio::sync::broadcast;
use tokio::time::timeout;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /api/jobs/{id}/events`
pub async fn events(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let Some(job) = state.registry.get(job_id) else {
        return Err(ApiError::NotFound(format!("no job {job_id}")));
    };

    let rx = state.hub.subscribe(job_id).await;
    let idle = state.config.stream_idle_timeout;

    // Registry snapshot first, so late subscribers know where the job
    // stands; the hub itself never replays.
    let snapshot_data =
        serde_json::to_string(&job).map_err(|e| ApiError::Internal(e.into()))?;
    let snapshot = stream::once(async move {
        Ok::<_, Infallible>(Event::default().event("snapshot").data(snapshot_data))
    });

    let live = stream::unfold((rx, false), move |(mut rx, done)| async move {
        if done {
            return None;
        }
        match timeout(idle, rx.recv()).await {
            Ok(Ok(event)) => {
                let terminal = event.is_terminal();
                let name = event.event_name();
                let data = match serde_json::to_string(&event) {
                    Ok(data) => data,
                    Err(_) => return None,
                };
                Some((
                    Ok(Event::default().event(name).data(data)),
                    (rx, terminal),
                ))
            }
            Ok(Err(broadcast::error::RecvError::Lagged(skipped))) => Some((
                Ok(Event::default()
                    .event("lagged")
                    .data(format!("{{\"skipped\":{skipped}}}"))),
                (rx, false),
            )),
            Ok(Err(broadcast::error::RecvError::Closed)) => None,
            Err(_) => Some((
                // Idle: close the stream, the job itself keeps running.
                Ok(Event::default().event("timeout").data("{}")),
                (rx, true),
            )),
        }
    });

    Ok(Sse::new(snapshot.chain(live)).keep_alive(KeepAlive::default()))
}
