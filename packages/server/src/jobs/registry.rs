//! In-memory job registry: the authoritative record of job state.
//!
//! A cloneable handle over a shared job table, injected wherever job state is
//! read or written (no global state). Single-writer rule: only the runner
//! task for a job moves it through its lifecycle; any transition out of a
//! terminal state is ignored and logged. Observers get read-only snapshots.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use uuid::Uuid;

use super::job::{Job, JobCounts, JobStatus};

struct Entry {
    job: Job,
    cancel: CancellationToken,
}

/// Outcome of a cancellation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The token was triggered; the runner will record the failure.
    Requested,
    /// The job already reached a terminal state.
    AlreadyFinished,
    NotFound,
}

#[derive(Clone, Default)]
pub struct JobRegistry {
    entries: Arc<RwLock<HashMap<Uuid, Entry>>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly queued job; returns its cancellation token.
    pub fn insert(&self, job: Job) -> CancellationToken {
        let cancel = CancellationToken::new();
        self.entries.write().unwrap().insert(
            job.id,
            Entry {
                job,
                cancel: cancel.clone(),
            },
        );
        cancel
    }

    /// Snapshot of one job.
    pub fn get(&self, id: Uuid) -> Option<Job> {
        self.entries.read().unwrap().get(&id).map(|e| e.job.clone())
    }

    pub fn mark_running(&self, id: Uuid) {
        self.transition(id, |job| job.status = JobStatus::Running);
    }

    pub fn complete(&self, id: Uuid, counts: JobCounts) {
        self.transition(id, |job| {
            job.status = JobStatus::Succeeded;
            job.counts = Some(counts);
            job.finished_at = Some(Utc::now());
        });
    }

    pub fn fail(&self, id: Uuid, failed_stage: Option<String>, error: String) {
        self.transition(id, |job| {
            job.status = JobStatus::Failed;
            job.failed_stage = failed_stage;
            job.error = Some(error);
            job.finished_at = Some(Utc::now());
        });
    }

    pub fn time_out(&self, id: Uuid) {
        self.transition(id, |job| {
            job.status = JobStatus::TimedOut;
            job.error = Some("job exceeded its wall-clock budget".to_string());
            job.finished_at = Some(Utc::now());
        });
    }

    /// Trigger cooperative cancellation.
    ///
    /// The job keeps its current status until the runner observes the token
    /// at the next stage boundary and records the failure.
    pub fn request_cancel(&self, id: Uuid) -> CancelOutcome {
        let entries = self.entries.read().unwrap();
        match entries.get(&id) {
            None => CancelOutcome::NotFound,
            Some(entry) if entry.job.status.is_terminal() => CancelOutcome::AlreadyFinished,
            Some(entry) => {
                entry.cancel.cancel();
                CancelOutcome::Requested
            }
        }
    }

    fn transition(&self, id: Uuid, apply: impl FnOnce(&mut Job)) {
        let mut entries = self.entries.write().unwrap();
        let Some(entry) = entries.get_mut(&id) else {
            warn!(job_id = %id, "transition for unknown job ignored");
            return;
        };
        if entry.job.status.is_terminal() {
            warn!(
                job_id = %id,
                status = ?entry.job.status,
                "transition out of terminal state ignored"
            );
            return;
        }
        apply(&mut entry.job);
    }
}
