//! Job status and cancellation handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;
use uuid::Uuid;

use crate::error::ApiError;
use crate::jobs::{CancelOutcome, Job};
use crate::state::AppState;

/// `GET /api/jobs/{id}` — the authoritative job snapshot.
pub async fn status(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<Job>, ApiError> {
    state
        .registry
        .get(job_id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("no job {job_id}")))
}

/// `POST /api/jobs/{id}/cancel` — cooperative cancel. The pipeline stops at
/// its next stage boundary; poll the job for the recorded failure.
pub async fn cancel(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    match state.registry.request_cancel(job_id) {
        CancelOutcome::Requested => {
            tracing::info!(%job_id, "cancellation requested");
            Ok((
                StatusCode::ACCEPTED,
                Json(json!({ "job_id": job_id, "status": "cancelling" })),
            ))
        }
        CancelOutcome::AlreadyFinished => Err(ApiError::Conflict(format!(
            "job {job_id} already finished"
        ))),
        CancelOutcome::NotFound => Err(ApiError::NotFound(format!("no job {job_id}"))),
    }
}
