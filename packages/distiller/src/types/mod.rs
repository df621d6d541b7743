//! Data model for the distillation pipeline.

pub mod analysis;
pub mod classification;
pub mod document;
pub mod outline;
pub mod proposition;
pub mod takeaway;

pub use analysis::{AnalysisSummary, DocumentAnalysis, PipelineRun, RunOutcome, StageResult};
pub use classification::{ClassificationOutput, Difficulty};
pub use document::Document;
pub use outline::{ContentUnit, KeyEntity, OutlineOutput};
pub use proposition::{Proposition, PropositionLevel, PropositionOutput, Provenance};
pub use takeaway::{Takeaway, TakeawayLevel, TakeawayOutput};
