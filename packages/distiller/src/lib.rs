//! Staged document distillation library.
//!
//! Turns a long-form document into a validated, hierarchically linked set of
//! factual and synthesized statements tagged by cognitive level. The
//! extraction intelligence itself is an external collaborator behind the
//! [`Extractor`] trait; this crate owns the part that is easy to get wrong:
//!
//! - the fixed four-stage execution contract (outline → propositions →
//!   takeaways → classification), where each stage consumes only validated
//!   prior outputs
//! - the validation engine enforcing closed, level-constrained taxonomies
//!   and referential integrity across stage outputs
//! - retry with exponential backoff for transient extractor failures, and
//!   immediate halt on permanent ones
//! - best-effort progress publication through the [`ProgressSink`] seam
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use distiller::{Document, MemoryStore, Pipeline};
//! use tokio_util::sync::CancellationToken;
//!
//! let pipeline = Pipeline::new(extractor, Arc::new(MemoryStore::new()));
//! let run = pipeline.run(&Document::new("Title", text), CancellationToken::new()).await;
//! assert!(run.outcome.is_success());
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Core seams (Extractor, AnalysisStore, ProgressSink)
//! - [`types`] - Data model (Document, ContentUnit, Proposition, Takeaway)
//! - [`pipeline`] - The orchestrator and its retry policy
//! - [`validate`] - Per-stage and whole-document validation
//! - [`stores`] - Storage implementations (MemoryStore)
//! - [`testing`] - Fixtures and a scriptable mock extractor

pub mod error;
pub mod pipeline;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;
pub mod validate;

// Re-export core types at crate root
pub use error::{DistillError, ExtractorError, ExtractorResult};
pub use pipeline::{Pipeline, RetryPolicy};
pub use stores::MemoryStore;
pub use traits::{
    extractor::{Extractor, Stage},
    progress::{NullSink, ProgressSink, ProgressStatus, ProgressUpdate},
    store::{AnalysisStore, SearchHit},
};
pub use types::{
    analysis::{AnalysisSummary, DocumentAnalysis, PipelineRun, RunOutcome, StageResult},
    classification::{ClassificationOutput, Difficulty},
    document::Document,
    outline::{ContentUnit, KeyEntity, OutlineOutput},
    proposition::{Proposition, PropositionLevel, PropositionOutput, Provenance},
    takeaway::{Takeaway, TakeawayLevel, TakeawayOutput},
};
pub use validate::{validate_analysis, Violation};
