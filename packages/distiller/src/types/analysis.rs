//! Cross-stage result types: stage results, pipeline runs, and the final
//! merged analysis.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::traits::extractor::Stage;
use crate::types::classification::ClassificationOutput;
use crate::types::document::Document;
use crate::types::outline::OutlineOutput;
use crate::types::proposition::{PropositionLevel, PropositionOutput};
use crate::types::takeaway::{TakeawayLevel, TakeawayOutput};

/// The validated output of one stage, as a tagged union.
///
/// Later stages can only be constructed from validated earlier outputs; the
/// orchestrator appends exactly one of these per completed stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum StageResult {
    Outline(OutlineOutput),
    Propositions(PropositionOutput),
    Takeaways(TakeawayOutput),
    Classification(ClassificationOutput),
}

impl StageResult {
    /// Which stage produced this result.
    pub fn stage(&self) -> Stage {
        match self {
            StageResult::Outline(_) => Stage::Outline,
            StageResult::Propositions(_) => Stage::Propositions,
            StageResult::Takeaways(_) => Stage::Takeaways,
            StageResult::Classification(_) => Stage::Classification,
        }
    }
}

/// Terminal state of a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    Succeeded,
    FailedAtStage { stage: Stage, cause: String },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Succeeded)
    }
}

/// The accumulated, append-only record of one document's pipeline execution.
///
/// Partial results from completed stages are retained here for diagnostics
/// on failure, but are never persisted or exposed as a complete document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRun {
    pub document_id: String,

    /// Validated stage outputs, in execution order
    pub results: Vec<StageResult>,

    /// Extractor attempts made per stage (index = stage index)
    pub attempts: Vec<u32>,

    pub outcome: RunOutcome,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl PipelineRun {
    /// The validated result of a given stage, if that stage completed.
    pub fn result_for(&self, stage: Stage) -> Option<&StageResult> {
        self.results.iter().find(|r| r.stage() == stage)
    }
}

/// The complete, whole-document-validated analysis of one document.
///
/// This is the only shape handed to persistence and returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    pub schema_version: String,

    pub document_id: String,
    pub title: String,

    pub outline: OutlineOutput,
    pub propositions: PropositionOutput,
    pub takeaways: TakeawayOutput,
    pub classification: ClassificationOutput,

    pub created_at: DateTime<Utc>,
}

impl DocumentAnalysis {
    pub const SCHEMA_VERSION: &'static str = "1.0";

    /// Assemble the final analysis from a document and its validated stage
    /// outputs. Whole-document validation happens separately.
    pub fn assemble(
        document: &Document,
        outline: OutlineOutput,
        propositions: PropositionOutput,
        takeaways: TakeawayOutput,
        classification: ClassificationOutput,
    ) -> Self {
        Self {
            schema_version: Self::SCHEMA_VERSION.to_string(),
            document_id: document.document_id.clone(),
            title: document.title.clone(),
            outline,
            propositions,
            takeaways,
            classification,
            created_at: Utc::now(),
        }
    }

    pub fn unit_count(&self) -> usize {
        self.outline.units.len()
    }

    pub fn proposition_count(&self) -> usize {
        self.propositions.propositions.len()
    }

    pub fn takeaway_count(&self) -> usize {
        self.takeaways.takeaways.len()
    }

    /// Distribution of propositions across cognitive levels.
    pub fn level_distribution(&self) -> HashMap<PropositionLevel, usize> {
        let mut dist: HashMap<PropositionLevel, usize> =
            PropositionLevel::ALL.iter().map(|l| (*l, 0)).collect();
        for prop in &self.propositions.propositions {
            *dist.entry(prop.level).or_insert(0) += 1;
        }
        dist
    }

    /// Distribution of takeaways across cognitive levels; `None` counts
    /// takeaways with no dominant level.
    pub fn takeaway_level_distribution(&self) -> HashMap<Option<TakeawayLevel>, usize> {
        let mut dist: HashMap<Option<TakeawayLevel>, usize> = HashMap::new();
        for level in TakeawayLevel::ALL {
            dist.insert(Some(level), 0);
        }
        dist.insert(None, 0);
        for takeaway in &self.takeaways.takeaways {
            *dist.entry(takeaway.level).or_insert(0) += 1;
        }
        dist
    }

    /// Summary row for listings.
    pub fn summary(&self) -> AnalysisSummary {
        let proposition_levels = self
            .level_distribution()
            .into_iter()
            .map(|(level, n)| (level.name().to_string(), n))
            .collect();
        let takeaway_levels = self
            .takeaway_level_distribution()
            .into_iter()
            .map(|(level, n)| {
                let key = level.map(|l| l.name()).unwrap_or("unspecified");
                (key.to_string(), n)
            })
            .collect();

        AnalysisSummary {
            document_id: self.document_id.clone(),
            title: self.title.clone(),
            unit_count: self.unit_count(),
            proposition_count: self.proposition_count(),
            takeaway_count: self.takeaway_count(),
            proposition_levels,
            takeaway_levels,
            created_at: self.created_at,
        }
    }
}

/// Summary counts for one persisted analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub document_id: String,
    pub title: String,
    pub unit_count: usize,
    pub proposition_count: usize,
    pub takeaway_count: usize,

    /// Propositions per cognitive level, keyed by serialized tag
    pub proposition_levels: HashMap<String, usize>,

    /// Takeaways per dominant level; "unspecified" counts absent levels
    pub takeaway_levels: HashMap<String, usize>,

    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[test]
    fn stage_result_reports_its_stage() {
        let result = StageResult::Outline(fixtures::three_unit_outline());
        assert_eq!(result.stage(), Stage::Outline);
    }

    #[test]
    fn distribution_covers_all_levels() {
        let analysis = fixtures::valid_analysis();
        let dist = analysis.level_distribution();
        assert_eq!(dist.len(), PropositionLevel::ALL.len());
        let total: usize = dist.values().sum();
        assert_eq!(total, analysis.proposition_count());
    }

    #[test]
    fn takeaway_distribution_counts_unlevelled_takeaways() {
        let mut analysis = fixtures::valid_analysis();
        analysis.takeaways.takeaways[1].level = None;

        let dist = analysis.takeaway_level_distribution();
        assert_eq!(dist[&Some(TakeawayLevel::Analysis)], 1);
        assert_eq!(dist[&Some(TakeawayLevel::Evaluation)], 0);
        assert_eq!(dist[&None], 1);
    }

    #[test]
    fn summary_counts_match() {
        let analysis = fixtures::valid_analysis();
        let summary = analysis.summary();
        assert_eq!(summary.unit_count, 3);
        assert_eq!(summary.proposition_count, 5);
        assert_eq!(summary.takeaway_count, 2);

        // Fixture mix: 2 recall, 1 each of the rest; 1 analysis + 1 evaluation takeaway.
        assert_eq!(summary.proposition_levels["recall"], 2);
        assert_eq!(summary.proposition_levels["comprehension"], 1);
        assert_eq!(summary.takeaway_levels["analysis"], 1);
        assert_eq!(summary.takeaway_levels["evaluation"], 1);
        assert_eq!(summary.takeaway_levels["unspecified"], 0);
    }
}
