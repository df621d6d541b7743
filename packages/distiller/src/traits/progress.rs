//! Progress publication seam.
//!
//! The orchestrator reports phase-by-phase progress through this trait
//! rather than ad hoc callbacks. Delivery is best-effort: a sink must never
//! block the pipeline, and a failed publish never fails the run.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::traits::extractor::Stage;

/// Coarse status of a progress update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    InProgress,
    Completed,
    Error,
    Timeout,
}

/// One phase notification published during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Stage identifier, absent for run-level notifications
    pub stage: Option<Stage>,

    /// Human-readable message
    pub message: String,

    pub status: ProgressStatus,

    /// Monotonically non-decreasing completion estimate, 0.0..=1.0
    pub progress: f32,

    pub timestamp: DateTime<Utc>,
}

impl ProgressUpdate {
    pub fn stage_started(stage: Stage) -> Self {
        Self {
            stage: Some(stage),
            message: format!("{}...", stage.label()),
            status: ProgressStatus::InProgress,
            progress: stage.index() as f32 / Stage::ALL.len() as f32,
            timestamp: Utc::now(),
        }
    }

    pub fn stage_completed(stage: Stage, detail: impl Into<String>) -> Self {
        Self {
            stage: Some(stage),
            message: detail.into(),
            status: ProgressStatus::InProgress,
            progress: stage.progress_fraction(),
            timestamp: Utc::now(),
        }
    }

    pub fn run_completed(message: impl Into<String>) -> Self {
        Self {
            stage: None,
            message: message.into(),
            status: ProgressStatus::Completed,
            progress: 1.0,
            timestamp: Utc::now(),
        }
    }

    pub fn run_failed(stage: Stage, cause: impl Into<String>) -> Self {
        Self {
            stage: Some(stage),
            message: cause.into(),
            status: ProgressStatus::Error,
            progress: stage.index() as f32 / Stage::ALL.len() as f32,
            timestamp: Utc::now(),
        }
    }
}

/// Where the orchestrator publishes progress updates.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    /// Publish one update. Best-effort; implementations must not block on
    /// slow consumers.
    async fn publish(&self, update: ProgressUpdate);
}

/// A sink that discards everything. Useful for tests and batch runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

#[async_trait]
impl ProgressSink for NullSink {
    async fn publish(&self, _update: ProgressUpdate) {}
}
