//! The orchestrator: runs the fixed stage sequence for one document.
//!
//! Stages execute strictly in order; stage *i* receives the original
//! document plus the validated outputs of stages 1..i-1, never raw data.
//! Transient extractor failures are retried with exponential backoff; any
//! permanent failure, exhausted budget, or validation defect halts the run
//! at that stage. Completed-stage outputs are retained in the returned
//! [`PipelineRun`] for diagnostics but are only persisted when the whole
//! document validates.
//!
//! The pipeline publishes per-stage progress through its [`ProgressSink`];
//! terminal success/failure events are the caller's responsibility, so the
//! authoritative job state can be recorded before any terminal event goes
//! out.

pub mod retry;

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::{DistillError, ExtractorResult, Result};
use crate::traits::extractor::{Extractor, Stage};
use crate::traits::progress::{NullSink, ProgressSink, ProgressUpdate};
use crate::traits::store::AnalysisStore;
use crate::types::analysis::{DocumentAnalysis, PipelineRun, RunOutcome, StageResult};
use crate::types::document::Document;
use crate::validate;

pub use retry::RetryPolicy;

/// Orchestrates the fixed stage sequence against an [`Extractor`] and hands
/// validated results to an [`AnalysisStore`].
pub struct Pipeline {
    extractor: Arc<dyn Extractor>,
    store: Arc<dyn AnalysisStore>,
    sink: Arc<dyn ProgressSink>,
    retry: RetryPolicy,
}

impl Pipeline {
    pub fn new(extractor: Arc<dyn Extractor>, store: Arc<dyn AnalysisStore>) -> Self {
        Self {
            extractor,
            store,
            sink: Arc::new(NullSink),
            retry: RetryPolicy::default(),
        }
    }

    /// Publish progress through the given sink.
    pub fn with_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Run the full pipeline for one document.
    ///
    /// Always returns a [`PipelineRun`]; inspect
    /// [`outcome`](PipelineRun::outcome) for the terminal state. Cancellation
    /// is cooperative and honored at stage boundaries.
    pub async fn run(&self, document: &Document, cancel: CancellationToken) -> PipelineRun {
        let started_at = Utc::now();
        let mut results: Vec<StageResult> = Vec::with_capacity(Stage::ALL.len());
        let mut attempts = vec![0u32; Stage::ALL.len()];

        info!(document_id = %document.document_id, "pipeline starting");

        let outcome = self
            .run_stages(document, &cancel, &mut results, &mut attempts)
            .await;

        let outcome = match outcome {
            Ok(()) => RunOutcome::Succeeded,
            Err(err) => {
                let stage = match &err {
                    DistillError::Extractor { stage, .. } => *stage,
                    DistillError::Validation { stage, .. } => *stage,
                    // Storage and cancellation surface at the stage the run
                    // had reached.
                    _ => Stage::ALL[results.len().min(Stage::ALL.len() - 1)],
                };
                warn!(
                    document_id = %document.document_id,
                    stage = %stage,
                    error = %err,
                    "pipeline halted"
                );
                RunOutcome::FailedAtStage {
                    stage,
                    cause: err.cause(),
                }
            }
        };

        PipelineRun {
            document_id: document.document_id.clone(),
            results,
            attempts,
            outcome,
            started_at,
            finished_at: Utc::now(),
        }
    }

    async fn run_stages(
        &self,
        document: &Document,
        cancel: &CancellationToken,
        results: &mut Vec<StageResult>,
        attempts: &mut [u32],
    ) -> Result<()> {
        // Stage 1: outline
        self.enter_stage(Stage::Outline, cancel).await?;
        let outline = self
            .call_with_retry(Stage::Outline, &mut attempts[Stage::Outline.index()], || {
                self.extractor.outline(document)
            })
            .await?;
        self.check(Stage::Outline, validate::validate_outline(&outline))?;
        results.push(StageResult::Outline(outline.clone()));
        self.sink
            .publish(ProgressUpdate::stage_completed(
                Stage::Outline,
                format!("Outline complete ({} units)", outline.units.len()),
            ))
            .await;

        // Stage 2: propositions
        self.enter_stage(Stage::Propositions, cancel).await?;
        let propositions = self
            .call_with_retry(
                Stage::Propositions,
                &mut attempts[Stage::Propositions.index()],
                || self.extractor.propositions(document, &outline),
            )
            .await?;
        self.check(
            Stage::Propositions,
            validate::validate_propositions(&propositions, &outline),
        )?;
        results.push(StageResult::Propositions(propositions.clone()));
        self.sink
            .publish(ProgressUpdate::stage_completed(
                Stage::Propositions,
                format!(
                    "Extracted {} propositions",
                    propositions.propositions.len()
                ),
            ))
            .await;

        // Stage 3: takeaways
        self.enter_stage(Stage::Takeaways, cancel).await?;
        let takeaways = self
            .call_with_retry(
                Stage::Takeaways,
                &mut attempts[Stage::Takeaways.index()],
                || self.extractor.takeaways(document, &outline, &propositions),
            )
            .await?;
        self.check(
            Stage::Takeaways,
            validate::validate_takeaways(&takeaways, &outline, &propositions),
        )?;
        results.push(StageResult::Takeaways(takeaways.clone()));
        self.sink
            .publish(ProgressUpdate::stage_completed(
                Stage::Takeaways,
                format!("Synthesized {} takeaways", takeaways.takeaways.len()),
            ))
            .await;

        // Stage 4: classification
        self.enter_stage(Stage::Classification, cancel).await?;
        let classification = self
            .call_with_retry(
                Stage::Classification,
                &mut attempts[Stage::Classification.index()],
                || {
                    self.extractor
                        .classify(document, &outline, &propositions, &takeaways)
                },
            )
            .await?;
        results.push(StageResult::Classification(classification.clone()));

        // Whole-document pass before anything reaches persistence.
        let analysis = DocumentAnalysis::assemble(
            document,
            outline,
            propositions,
            takeaways,
            classification,
        );
        self.check(
            Stage::Classification,
            validate::validate_analysis(&analysis),
        )?;

        self.store
            .save(&analysis)
            .await
            .map_err(|err| match err {
                DistillError::Storage(inner) => DistillError::Storage(inner),
                other => DistillError::Storage(Box::new(other)),
            })?;

        info!(
            document_id = %document.document_id,
            units = analysis.unit_count(),
            propositions = analysis.proposition_count(),
            takeaways = analysis.takeaway_count(),
            "pipeline complete"
        );

        self.sink
            .publish(ProgressUpdate::stage_completed(
                Stage::Classification,
                "Classification complete".to_string(),
            ))
            .await;

        Ok(())
    }

    /// Honor cancellation at the stage boundary, then announce the stage.
    async fn enter_stage(&self, stage: Stage, cancel: &CancellationToken) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(DistillError::Cancelled);
        }
        self.sink.publish(ProgressUpdate::stage_started(stage)).await;
        Ok(())
    }

    fn check(&self, stage: Stage, violations: Vec<validate::Violation>) -> Result<()> {
        if violations.is_empty() {
            Ok(())
        } else {
            Err(DistillError::Validation { stage, violations })
        }
    }

    /// Invoke one extractor call with the retry budget, retrying only
    /// transient failure kinds.
    async fn call_with_retry<T, F, Fut>(
        &self,
        stage: Stage,
        attempts: &mut u32,
        mut call: F,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ExtractorResult<T>>,
    {
        let mut retries = 0u32;
        loop {
            *attempts += 1;
            match call().await {
                Ok(output) => return Ok(output),
                Err(err) if err.is_transient() && *attempts < self.retry.max_attempts => {
                    let delay = self.retry.backoff(retries);
                    warn!(
                        stage = %stage,
                        attempt = *attempts,
                        backoff_ms = delay.as_millis() as u64,
                        error = %err,
                        "transient extractor failure, retrying"
                    );
                    retries += 1;
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    return Err(DistillError::Extractor { stage, source: err });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractorError;
    use crate::stores::memory::MemoryStore;
    use crate::testing::{fixtures, MockExtractor};

    fn pipeline_with(mock: MockExtractor, store: Arc<MemoryStore>) -> Pipeline {
        Pipeline::new(Arc::new(mock), store).with_retry(RetryPolicy::fast(3))
    }

    #[tokio::test]
    async fn happy_path_persists_with_exact_counts() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = pipeline_with(MockExtractor::new(), store.clone());
        let doc = fixtures::sample_document();

        let run = pipeline.run(&doc, CancellationToken::new()).await;

        assert!(run.outcome.is_success());
        assert_eq!(run.results.len(), 4);
        let saved = store.load(&doc.document_id).await.unwrap().unwrap();
        assert_eq!(saved.unit_count(), 3);
        assert_eq!(saved.proposition_count(), 5);
        assert_eq!(saved.takeaway_count(), 2);
    }

    #[tokio::test]
    async fn transient_failures_are_retried_to_success() {
        let mock = MockExtractor::new().fail_then_succeed(
            Stage::Propositions,
            vec![ExtractorError::Timeout, ExtractorError::Timeout],
        );
        let store = Arc::new(MemoryStore::new());
        let pipeline = pipeline_with(mock.clone(), store);
        let doc = fixtures::sample_document();

        let run = pipeline.run(&doc, CancellationToken::new()).await;

        assert!(run.outcome.is_success());
        assert_eq!(mock.call_count(Stage::Propositions), 3);
        assert_eq!(run.attempts[Stage::Propositions.index()], 3);
    }

    #[tokio::test]
    async fn permanent_failure_halts_without_running_later_stages() {
        let mock = MockExtractor::new().fail_then_succeed(
            Stage::Propositions,
            vec![ExtractorError::Malformed("not json".into())],
        );
        let store = Arc::new(MemoryStore::new());
        let pipeline = pipeline_with(mock.clone(), store.clone());
        let doc = fixtures::sample_document();

        let run = pipeline.run(&doc, CancellationToken::new()).await;

        match &run.outcome {
            RunOutcome::FailedAtStage { stage, .. } => assert_eq!(*stage, Stage::Propositions),
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(mock.call_count(Stage::Propositions), 1);
        assert_eq!(mock.call_count(Stage::Takeaways), 0);
        assert_eq!(mock.call_count(Stage::Classification), 0);
        // Nothing persisted from a failed run.
        assert!(store.load(&doc.document_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn exhausted_retry_budget_is_a_stage_failure() {
        let mock = MockExtractor::new().fail_then_succeed(
            Stage::Outline,
            vec![
                ExtractorError::Timeout,
                ExtractorError::Timeout,
                ExtractorError::Timeout,
            ],
        );
        let store = Arc::new(MemoryStore::new());
        let pipeline = pipeline_with(mock.clone(), store);
        let doc = fixtures::sample_document();

        let run = pipeline.run(&doc, CancellationToken::new()).await;

        assert!(!run.outcome.is_success());
        assert_eq!(mock.call_count(Stage::Outline), 3);
    }

    #[tokio::test]
    async fn cancellation_is_honored_at_the_stage_boundary() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = pipeline_with(MockExtractor::new(), store.clone());
        let doc = fixtures::sample_document();

        let cancel = CancellationToken::new();
        cancel.cancel();
        let run = pipeline.run(&doc, cancel).await;

        assert!(!run.outcome.is_success());
        assert!(run.results.is_empty());
        assert!(store.load(&doc.document_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn invalid_stage_output_fails_with_all_violations() {
        let mut takeaways = fixtures::two_takeaways();
        takeaways.takeaways[0].proposition_ids = vec!["p998".into(), "p999".into()];
        let mock = MockExtractor::new().with_takeaways(takeaways);
        let store = Arc::new(MemoryStore::new());
        let pipeline = pipeline_with(mock, store);
        let doc = fixtures::sample_document();

        let run = pipeline.run(&doc, CancellationToken::new()).await;

        match &run.outcome {
            RunOutcome::FailedAtStage { stage, cause } => {
                assert_eq!(*stage, Stage::Takeaways);
                assert!(cause.contains("p998") && cause.contains("p999"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }
}
