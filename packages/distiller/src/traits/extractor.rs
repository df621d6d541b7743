//! Extractor trait: the opaque external capability invoked once per stage.
//!
//! Implementations wrap a reasoning service (OpenAI, Anthropic, etc.) and
//! handle prompting and response parsing. The pipeline only cares about the
//! stage contract: each method receives the original document plus the
//! *validated* outputs of every earlier stage, never raw data.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ExtractorResult;
use crate::types::classification::ClassificationOutput;
use crate::types::document::Document;
use crate::types::outline::OutlineOutput;
use crate::types::proposition::PropositionOutput;
use crate::types::takeaway::TakeawayOutput;

/// One step of the fixed pipeline sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Outline,
    Propositions,
    Takeaways,
    Classification,
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: [Stage; 4] = [
        Stage::Outline,
        Stage::Propositions,
        Stage::Takeaways,
        Stage::Classification,
    ];

    /// Zero-based position in the fixed sequence.
    pub fn index(&self) -> usize {
        match self {
            Stage::Outline => 0,
            Stage::Propositions => 1,
            Stage::Takeaways => 2,
            Stage::Classification => 3,
        }
    }

    /// Stable identifier used in progress events.
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Outline => "outline",
            Stage::Propositions => "propositions",
            Stage::Takeaways => "takeaways",
            Stage::Classification => "classification",
        }
    }

    /// Human-readable label for progress messages.
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Outline => "Mapping document structure",
            Stage::Propositions => "Extracting atomic facts",
            Stage::Takeaways => "Synthesizing takeaways",
            Stage::Classification => "Classifying document",
        }
    }

    /// Monotone completion estimate reached once this stage finishes.
    pub fn progress_fraction(&self) -> f32 {
        (self.index() + 1) as f32 / Stage::ALL.len() as f32
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The opaque extraction capability, one async method per fixed stage.
///
/// Implementations may fail transiently (timeout, rate limit, transport) or
/// permanently (malformed output); see
/// [`ExtractorError::is_transient`](crate::error::ExtractorError::is_transient).
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Stage 1: map the document into a hierarchical outline with summary,
    /// key entities and keywords.
    async fn outline(&self, document: &Document) -> ExtractorResult<OutlineOutput>;

    /// Stage 2: extract atomic propositions, attributed to outline units.
    async fn propositions(
        &self,
        document: &Document,
        outline: &OutlineOutput,
    ) -> ExtractorResult<PropositionOutput>;

    /// Stage 3: synthesize takeaways referencing extracted propositions.
    async fn takeaways(
        &self,
        document: &Document,
        outline: &OutlineOutput,
        propositions: &PropositionOutput,
    ) -> ExtractorResult<TakeawayOutput>;

    /// Stage 4: classify the document (subject, audience, difficulty).
    async fn classify(
        &self,
        document: &Document,
        outline: &OutlineOutput,
        propositions: &PropositionOutput,
        takeaways: &TakeawayOutput,
    ) -> ExtractorResult<ClassificationOutput>;
}
