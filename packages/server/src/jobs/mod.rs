//! Async job tracking for distillation runs.
//!
//! One registry entry and one spawned task per submitted document. The
//! registry is the source of truth for job state; the stream hub carries
//! best-effort progress events alongside it.

pub mod events;
pub mod job;
pub mod registry;
pub mod runner;

pub use events::ProgressEvent;
pub use job::{Job, JobCounts, JobStatus};
pub use registry::{CancelOutcome, JobRegistry};
pub use runner::JobRunner;
