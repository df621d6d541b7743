//! Job model: the registry record for one submitted document.

use chrono::{DateTime, Utc};
use distiller::Document;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a distillation job.
///
/// Terminal states are absorbing: once a job is succeeded, failed or timed
/// out it never changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Succeeded,
    Failed,
    TimedOut,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Succeeded | JobStatus::Failed | JobStatus::TimedOut
        )
    }
}

/// Result counts recorded on a succeeded job.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct JobCounts {
    pub units: usize,
    pub propositions: usize,
    pub takeaways: usize,
}

/// One job as observers see it: a read-only snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub document_id: String,
    pub title: String,
    pub status: JobStatus,

    /// Stage the pipeline halted at, for failed jobs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_stage: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub counts: Option<JobCounts>,

    pub created_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl Job {
    /// A freshly queued job for a document.
    pub fn new(document: &Document) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id: document.document_id.clone(),
            title: document.title.clone(),
            status: JobStatus::Queued,
            failed_stage: None,
            error: None,
            counts: None,
            created_at: Utc::now(),
            finished_at: None,
        }
    }
}
