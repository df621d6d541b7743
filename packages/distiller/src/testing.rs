//! Testing utilities: canned fixtures and a scriptable mock extractor.
//!
//! These are useful for testing applications built on the pipeline without
//! making real reasoning-service calls.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;

use crate::error::{ExtractorError, ExtractorResult};
use crate::traits::extractor::{Extractor, Stage};
use crate::types::classification::ClassificationOutput;
use crate::types::document::Document;
use crate::types::outline::OutlineOutput;
use crate::types::proposition::PropositionOutput;
use crate::types::takeaway::TakeawayOutput;

/// Canned, internally consistent stage outputs.
///
/// The shapes mirror the reference scenario: a 3-unit outline (A, B under A,
/// C under B), 5 propositions split across the units, 2 takeaways each
/// referencing 2 valid propositions.
pub mod fixtures {
    use chrono::Utc;

    use crate::types::analysis::DocumentAnalysis;
    use crate::types::classification::{ClassificationOutput, Difficulty};
    use crate::types::document::Document;
    use crate::types::outline::{ContentUnit, KeyEntity, OutlineOutput};
    use crate::types::proposition::{
        Proposition, PropositionLevel, PropositionOutput, Provenance,
    };
    use crate::types::takeaway::{Takeaway, TakeawayLevel, TakeawayOutput};

    pub fn sample_document() -> Document {
        Document::with_id(
            "doc_fixture",
            "The Studio System",
            "A chapter-length text about vertical integration in the classical \
             Hollywood studio system, long enough to pass submission checks. "
                .repeat(4),
        )
    }

    fn unit(
        unit_id: &str,
        title: &str,
        depth: u32,
        position: u32,
        parent: Option<&str>,
    ) -> ContentUnit {
        ContentUnit {
            unit_id: unit_id.into(),
            title: title.into(),
            depth,
            position,
            parent_id: parent.map(str::to_string),
            start_location: None,
            end_location: None,
        }
    }

    pub fn three_unit_outline() -> OutlineOutput {
        OutlineOutput {
            summary: "How vertical integration let studios dominate the industry.".into(),
            units: vec![
                unit("A", "The Studio System", 1, 1, None),
                unit("B", "Vertical Integration", 2, 1, Some("A")),
                unit("C", "Block Booking", 3, 1, Some("B")),
            ],
            key_entities: vec![KeyEntity {
                name: "Paramount Pictures".into(),
                kind: "organization".into(),
            }],
            keywords: vec!["vertical integration".into(), "studio system".into()],
        }
    }

    fn prop(id: &str, unit_id: &str, text: &str, level: PropositionLevel) -> Proposition {
        Proposition {
            proposition_id: id.into(),
            unit_id: unit_id.into(),
            text: text.into(),
            level,
            evidence: "¶001".into(),
            provenance: Provenance::Restated,
            tags: vec![],
        }
    }

    pub fn five_propositions() -> PropositionOutput {
        PropositionOutput {
            propositions: vec![
                prop(
                    "p001",
                    "A",
                    "The studio system dominated Hollywood from 1920 to 1948.",
                    PropositionLevel::Recall,
                ),
                prop(
                    "p002",
                    "A",
                    "Five major studios controlled production and exhibition.",
                    PropositionLevel::Recall,
                ),
                prop(
                    "p003",
                    "B",
                    "Vertical integration means owning production, distribution, and exhibition.",
                    PropositionLevel::Comprehension,
                ),
                prop(
                    "p004",
                    "B",
                    "Studio ownership of theaters guaranteed outlets for their films.",
                    PropositionLevel::Application,
                ),
                prop(
                    "p005",
                    "C",
                    "Block booking forced exhibitors to rent films in bundles.",
                    PropositionLevel::Analysis,
                ),
            ],
            notes: None,
        }
    }

    pub fn two_takeaways() -> TakeawayOutput {
        TakeawayOutput {
            takeaways: vec![
                Takeaway {
                    takeaway_id: "t001".into(),
                    unit_id: Some("B".into()),
                    text: "Vertical integration gave studios end-to-end market control.".into(),
                    proposition_ids: vec!["p003".into(), "p004".into()],
                    level: Some(TakeawayLevel::Analysis),
                    tags: vec!["market control".into()],
                },
                Takeaway {
                    takeaway_id: "t002".into(),
                    unit_id: Some("C".into()),
                    text: "Distribution practices entrenched the majors' dominance.".into(),
                    proposition_ids: vec!["p001".into(), "p005".into()],
                    level: Some(TakeawayLevel::Evaluation),
                    tags: vec![],
                },
            ],
        }
    }

    pub fn classification() -> ClassificationOutput {
        ClassificationOutput {
            subject_area: "film history".into(),
            audience: "undergraduate media studies".into(),
            difficulty: Difficulty::Introductory,
            themes: vec!["industrial organization".into()],
        }
    }

    pub fn valid_analysis() -> DocumentAnalysis {
        DocumentAnalysis {
            schema_version: DocumentAnalysis::SCHEMA_VERSION.into(),
            document_id: "doc_fixture".into(),
            title: "The Studio System".into(),
            outline: three_unit_outline(),
            propositions: five_propositions(),
            takeaways: two_takeaways(),
            classification: classification(),
            created_at: Utc::now(),
        }
    }
}

/// A mock extractor with scriptable per-stage failures and call tracking.
///
/// By default every stage returns the consistent [`fixtures`] outputs.
/// Failures queued with [`fail_then_succeed`](Self::fail_then_succeed) are
/// consumed one per call before the canned success is returned, which makes
/// retry behavior directly assertable.
#[derive(Clone, Default)]
pub struct MockExtractor {
    outline: Arc<RwLock<Option<OutlineOutput>>>,
    propositions: Arc<RwLock<Option<PropositionOutput>>>,
    takeaways: Arc<RwLock<Option<TakeawayOutput>>>,
    classification: Arc<RwLock<Option<ClassificationOutput>>>,

    /// Errors to return before succeeding, per stage (front first)
    scripted_failures: Arc<Mutex<HashMap<Stage, Vec<ExtractorError>>>>,

    /// Calls made, per stage
    calls: Arc<Mutex<HashMap<Stage, u32>>>,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the canned outline output.
    pub fn with_outline(self, outline: OutlineOutput) -> Self {
        *self.outline.write().unwrap() = Some(outline);
        self
    }

    /// Replace the canned proposition output.
    pub fn with_propositions(self, output: PropositionOutput) -> Self {
        *self.propositions.write().unwrap() = Some(output);
        self
    }

    /// Replace the canned takeaway output.
    pub fn with_takeaways(self, output: TakeawayOutput) -> Self {
        *self.takeaways.write().unwrap() = Some(output);
        self
    }

    /// Replace the canned classification output.
    pub fn with_classification(self, output: ClassificationOutput) -> Self {
        *self.classification.write().unwrap() = Some(output);
        self
    }

    /// Queue errors for a stage; each call consumes one until the queue is
    /// empty, after which the canned success is returned.
    pub fn fail_then_succeed(self, stage: Stage, errors: Vec<ExtractorError>) -> Self {
        self.scripted_failures
            .lock()
            .unwrap()
            .entry(stage)
            .or_default()
            .extend(errors);
        self
    }

    /// Number of calls made to a stage so far.
    pub fn call_count(&self, stage: Stage) -> u32 {
        self.calls.lock().unwrap().get(&stage).copied().unwrap_or(0)
    }

    fn record_call(&self, stage: Stage) -> Option<ExtractorError> {
        *self.calls.lock().unwrap().entry(stage).or_insert(0) += 1;
        let mut failures = self.scripted_failures.lock().unwrap();
        match failures.get_mut(&stage) {
            Some(queue) if !queue.is_empty() => Some(queue.remove(0)),
            _ => None,
        }
    }
}

#[async_trait]
impl Extractor for MockExtractor {
    async fn outline(&self, _document: &Document) -> ExtractorResult<OutlineOutput> {
        if let Some(err) = self.record_call(Stage::Outline) {
            return Err(err);
        }
        Ok(self
            .outline
            .read()
            .unwrap()
            .clone()
            .unwrap_or_else(fixtures::three_unit_outline))
    }

    async fn propositions(
        &self,
        _document: &Document,
        _outline: &OutlineOutput,
    ) -> ExtractorResult<PropositionOutput> {
        if let Some(err) = self.record_call(Stage::Propositions) {
            return Err(err);
        }
        Ok(self
            .propositions
            .read()
            .unwrap()
            .clone()
            .unwrap_or_else(fixtures::five_propositions))
    }

    async fn takeaways(
        &self,
        _document: &Document,
        _outline: &OutlineOutput,
        _propositions: &PropositionOutput,
    ) -> ExtractorResult<TakeawayOutput> {
        if let Some(err) = self.record_call(Stage::Takeaways) {
            return Err(err);
        }
        Ok(self
            .takeaways
            .read()
            .unwrap()
            .clone()
            .unwrap_or_else(fixtures::two_takeaways))
    }

    async fn classify(
        &self,
        _document: &Document,
        _outline: &OutlineOutput,
        _propositions: &PropositionOutput,
        _takeaways: &TakeawayOutput,
    ) -> ExtractorResult<ClassificationOutput> {
        if let Some(err) = self.record_call(Stage::Classification) {
            return Err(err);
        }
        Ok(self
            .classification
            .read()
            .unwrap()
            .clone()
            .unwrap_or_else(fixtures::classification))
    }
}
