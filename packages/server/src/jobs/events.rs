//! Progress events published to a job's stream topic.

use std::time::Duration;

use chrono::{DateTime, Utc};
use distiller::{ProgressStatus, ProgressUpdate, Stage};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One progress notification for one job.
///
/// Stage-level events carry `in_progress`; exactly one terminal event
/// (`completed`, `error` or `timeout`) ends the stream for a job, published
/// only after the registry has recorded the terminal state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub job_id: Uuid,

    /// Stage identifier, absent for job-level notifications
    pub stage: Option<String>,

    pub message: String,
    pub status: ProgressStatus,

    /// Monotonically non-decreasing completion estimate, 0.0..=1.0
    pub progress: f32,

    pub timestamp: DateTime<Utc>,
}

impl ProgressEvent {
    /// Wrap a pipeline progress update with its job id.
    pub fn from_update(job_id: Uuid, update: ProgressUpdate) -> Self {
        Self {
            job_id,
            stage: update.stage.map(|s| s.name().to_string()),
            message: update.message,
            status: update.status,
            progress: update.progress,
            timestamp: update.timestamp,
        }
    }

    /// Terminal event for a successful run.
    pub fn completed(job_id: Uuid, message: impl Into<String>) -> Self {
        Self::from_update(job_id, ProgressUpdate::run_completed(message))
    }

    /// Terminal event for a run that failed at a stage.
    pub fn failed(job_id: Uuid, stage: Stage, cause: impl Into<String>) -> Self {
        Self::from_update(job_id, ProgressUpdate::run_failed(stage, cause))
    }

    /// Terminal event for a run that exceeded its wall-clock budget.
    ///
    /// `progress` is the highest fraction published for the job so far, so
    /// the terminal event never regresses below earlier stage events.
    pub fn timed_out(job_id: Uuid, budget: Duration, progress: f32) -> Self {
        Self {
            job_id,
            stage: None,
            message: format!("job exceeded its {}s budget", budget.as_secs()),
            status: ProgressStatus::Timeout,
            progress,
            timestamp: Utc::now(),
        }
    }

    /// SSE event name for this notification.
    pub fn event_name(&self) -> &'static str {
        match self.status {
            ProgressStatus::InProgress => "progress",
            ProgressStatus::Completed => "completed",
            ProgressStatus::Error => "error",
            ProgressStatus::Timeout => "timeout",
        }
    }

    /// Whether this event ends the job's stream.
    pub fn is_terminal(&self) -> bool {
        self.status != ProgressStatus::InProgress
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}
