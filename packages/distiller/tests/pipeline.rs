//! End-to-end pipeline scenarios against the mock extractor.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use distiller::testing::{fixtures, MockExtractor};
use distiller::{
    AnalysisStore, ExtractorError, MemoryStore, Pipeline, ProgressSink, ProgressStatus, ProgressUpdate,
    RetryPolicy, RunOutcome, Stage,
};

/// A sink that records every update it receives, in order.
#[derive(Default, Clone)]
struct RecordingSink {
    updates: Arc<Mutex<Vec<ProgressUpdate>>>,
}

impl RecordingSink {
    fn updates(&self) -> Vec<ProgressUpdate> {
        self.updates.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProgressSink for RecordingSink {
    async fn publish(&self, update: ProgressUpdate) {
        self.updates.lock().unwrap().push(update);
    }
}

fn pipeline(mock: MockExtractor, store: Arc<MemoryStore>) -> Pipeline {
    Pipeline::new(Arc::new(mock), store).with_retry(RetryPolicy::fast(3))
}

#[tokio::test]
async fn successful_run_has_zero_dangling_references() {
    let store = Arc::new(MemoryStore::new());
    let run = pipeline(MockExtractor::new(), store.clone())
        .run(&fixtures::sample_document(), CancellationToken::new())
        .await;

    assert!(run.outcome.is_success());
    let saved = store.load("doc_fixture").await.unwrap().unwrap();
    assert!(distiller::validate_analysis(&saved).is_empty());

    for takeaway in &saved.takeaways.takeaways {
        for prop_id in &takeaway.proposition_ids {
            assert!(saved.propositions.contains(prop_id));
        }
    }
    for prop in &saved.propositions.propositions {
        assert!(saved.outline.contains_unit(&prop.unit_id));
    }
}

#[tokio::test]
async fn retried_run_produces_the_same_result_as_a_clean_run() {
    // Clean run
    let clean_store = Arc::new(MemoryStore::new());
    let clean_run = pipeline(MockExtractor::new(), clean_store.clone())
        .run(&fixtures::sample_document(), CancellationToken::new())
        .await;
    assert!(clean_run.outcome.is_success());

    // Same stages, but stage 2 times out twice first
    let retried_store = Arc::new(MemoryStore::new());
    let mock = MockExtractor::new().fail_then_succeed(
        Stage::Propositions,
        vec![ExtractorError::Timeout, ExtractorError::Timeout],
    );
    let retried_run = pipeline(mock.clone(), retried_store.clone())
        .run(&fixtures::sample_document(), CancellationToken::new())
        .await;

    assert!(retried_run.outcome.is_success());
    assert_eq!(mock.call_count(Stage::Propositions), 3);

    let clean = clean_store.load("doc_fixture").await.unwrap().unwrap();
    let retried = retried_store.load("doc_fixture").await.unwrap().unwrap();
    assert_eq!(
        serde_json::to_value(&clean.outline).unwrap(),
        serde_json::to_value(&retried.outline).unwrap()
    );
    assert_eq!(
        serde_json::to_value(&clean.propositions).unwrap(),
        serde_json::to_value(&retried.propositions).unwrap()
    );
    assert_eq!(
        serde_json::to_value(&clean.takeaways).unwrap(),
        serde_json::to_value(&retried.takeaways).unwrap()
    );
}

#[tokio::test]
async fn permanent_failure_runs_no_later_stages() {
    let mock = MockExtractor::new().fail_then_succeed(
        Stage::Outline,
        vec![ExtractorError::Malformed("unparseable".into())],
    );
    let store = Arc::new(MemoryStore::new());
    let run = pipeline(mock.clone(), store)
        .run(&fixtures::sample_document(), CancellationToken::new())
        .await;

    match run.outcome {
        RunOutcome::FailedAtStage { stage, .. } => assert_eq!(stage, Stage::Outline),
        RunOutcome::Succeeded => panic!("run should have failed"),
    }
    assert_eq!(mock.call_count(Stage::Outline), 1);
    assert_eq!(mock.call_count(Stage::Propositions), 0);
    assert_eq!(mock.call_count(Stage::Takeaways), 0);
    assert_eq!(mock.call_count(Stage::Classification), 0);
}

#[tokio::test]
async fn dangling_takeaway_reference_fails_the_run_naming_the_id() {
    let mut takeaways = fixtures::two_takeaways();
    takeaways.takeaways[1].proposition_ids = vec!["p_missing".into()];
    let store = Arc::new(MemoryStore::new());
    let run = pipeline(
        MockExtractor::new().with_takeaways(takeaways),
        store.clone(),
    )
    .run(&fixtures::sample_document(), CancellationToken::new())
    .await;

    match run.outcome {
        RunOutcome::FailedAtStage { stage, cause } => {
            assert_eq!(stage, Stage::Takeaways);
            assert!(cause.contains("p_missing"));
        }
        RunOutcome::Succeeded => panic!("run should have failed"),
    }
    assert!(store.load("doc_fixture").await.unwrap().is_none());
}

#[tokio::test]
async fn progress_updates_are_ordered_and_monotone() {
    let sink = RecordingSink::default();
    let store = Arc::new(MemoryStore::new());
    let run = Pipeline::new(Arc::new(MockExtractor::new()), store)
        .with_sink(Arc::new(sink.clone()))
        .with_retry(RetryPolicy::no_retries())
        .run(&fixtures::sample_document(), CancellationToken::new())
        .await;

    assert!(run.outcome.is_success());
    let updates = sink.updates();
    // Two updates per stage: started + completed
    assert_eq!(updates.len(), Stage::ALL.len() * 2);

    let mut last_progress = -1.0f32;
    for update in &updates {
        assert!(update.progress >= last_progress);
        last_progress = update.progress;
        assert_eq!(update.status, ProgressStatus::InProgress);
    }

    // Stage identifiers appear in the fixed pipeline order
    let stages: Vec<Stage> = updates.iter().filter_map(|u| u.stage).collect();
    assert_eq!(stages[0], Stage::Outline);
    assert_eq!(stages[stages.len() - 1], Stage::Classification);
}

#[tokio::test]
async fn run_retains_partial_results_for_diagnostics() {
    let mock = MockExtractor::new().fail_then_succeed(
        Stage::Takeaways,
        vec![ExtractorError::Unavailable("quota exhausted".into())],
    );
    let store = Arc::new(MemoryStore::new());
    let run = pipeline(mock, store.clone())
        .run(&fixtures::sample_document(), CancellationToken::new())
        .await;

    assert!(!run.outcome.is_success());
    // Outline and propositions completed and are kept on the run record
    assert!(run.result_for(Stage::Outline).is_some());
    assert!(run.result_for(Stage::Propositions).is_some());
    assert!(run.result_for(Stage::Takeaways).is_none());
    // But nothing was persisted
    assert!(store.load("doc_fixture").await.unwrap().is_none());
}
