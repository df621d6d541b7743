//! Typed errors for the distillation library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use thiserror::Error;

use crate::traits::extractor::Stage;
use crate::validate::Violation;

/// Errors returned by an [`Extractor`](crate::traits::extractor::Extractor)
/// implementation for a single stage call.
///
/// The transient kinds (`Timeout`, `RateLimited`, `Transport`) are eligible
/// for retry; everything else is permanent and fails the run immediately.
#[derive(Debug, Error)]
pub enum ExtractorError {
    /// The extraction service did not respond in time
    #[error("extractor timed out")]
    Timeout,

    /// The extraction service rejected the call due to rate limiting
    #[error("extractor rate limited")]
    RateLimited,

    /// Connection-level failure reaching the extraction service
    #[error("extractor transport error: {0}")]
    Transport(String),

    /// The service responded but the payload does not match the stage schema
    #[error("malformed extractor output: {0}")]
    Malformed(String),

    /// The service is misconfigured or permanently unavailable
    #[error("extractor unavailable: {0}")]
    Unavailable(String),
}

impl ExtractorError {
    /// Whether the retry policy may re-attempt this failure.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ExtractorError::Timeout | ExtractorError::RateLimited | ExtractorError::Transport(_)
        )
    }
}

/// Errors that can terminate a pipeline run.
#[derive(Debug, Error)]
pub enum DistillError {
    /// A stage's extractor call failed permanently or exhausted its retries
    #[error("stage {stage} failed: {source}")]
    Extractor {
        stage: Stage,
        #[source]
        source: ExtractorError,
    },

    /// A stage output (or the assembled document) failed validation
    #[error("validation failed at {stage}: {} violation(s)", violations.len())]
    Validation {
        stage: Stage,
        violations: Vec<Violation>,
    },

    /// Persisting the final result failed
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The run was cancelled at a stage boundary
    #[error("run cancelled")]
    Cancelled,

    /// The submitted document is unusable (empty, undecodable, too short)
    #[error("invalid document: {reason}")]
    InvalidDocument { reason: String },
}

impl DistillError {
    /// Human-readable cause suitable for a terminal progress event.
    pub fn cause(&self) -> String {
        match self {
            DistillError::Validation { stage, violations } => {
                let details: Vec<String> = violations.iter().map(|v| v.to_string()).collect();
                format!("validation failed at {}: {}", stage, details.join("; "))
            }
            other => other.to_string(),
        }
    }
}

/// Result type alias for distillation operations.
pub type Result<T> = std::result::Result<T, DistillError>;

/// Result type alias for extractor calls.
pub type ExtractorResult<T> = std::result::Result<T, ExtractorError>;
