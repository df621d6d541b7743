//! Per-job execution: one spawned task per submitted document.
//!
//! The runner wraps the pipeline with the wall-clock budget, forwards its
//! stage progress into the hub, and owns the terminal write order: the
//! registry (source of truth) is updated first, the terminal progress event
//! is published second. Observers that re-query by job id after any terminal
//! event therefore never see a stale status.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};
use uuid::Uuid;

use distiller::{
    AnalysisStore, Document, Extractor, Pipeline, ProgressSink, ProgressUpdate, RetryPolicy,
    RunOutcome, StageResult,
};

use super::events::ProgressEvent;
use super::job::{Job, JobCounts};
use super::registry::JobRegistry;
use crate::stream_hub::StreamHub;

/// Forwards pipeline progress into the job's broadcast topic, remembering
/// the highest fraction published so a later timeout event never regresses.
struct HubSink {
    job_id: Uuid,
    hub: StreamHub,
    high_water: Arc<AtomicU32>,
}

#[async_trait]
impl ProgressSink for HubSink {
    async fn publish(&self, update: ProgressUpdate) {
        // Bit-pattern ordering matches numeric ordering for non-negative
        // floats, so fetch_max on the raw bits keeps the running maximum.
        self.high_water
            .fetch_max(update.progress.to_bits(), Ordering::Relaxed);
        self.hub
            .publish(self.job_id, ProgressEvent::from_update(self.job_id, update))
            .await;
    }
}

/// Spawns and supervises distillation jobs.
pub struct JobRunner {
    registry: JobRegistry,
    hub: StreamHub,
    extractor: Arc<dyn Extractor>,
    store: Arc<dyn AnalysisStore>,
    retry: RetryPolicy,
    job_timeout: Duration,
}

impl JobRunner {
    pub fn new(
        registry: JobRegistry,
        hub: StreamHub,
        extractor: Arc<dyn Extractor>,
        store: Arc<dyn AnalysisStore>,
        retry: RetryPolicy,
        job_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            hub,
            extractor,
            store,
            retry,
            job_timeout,
        }
    }

    /// Queue a document and start its job task. Returns the job id.
    pub fn spawn(&self, document: Document) -> Uuid {
        let job = Job::new(&document);
        let job_id = job.id;
        let cancel = self.registry.insert(job);

        let high_water = Arc::new(AtomicU32::new(0));
        let pipeline = Pipeline::new(self.extractor.clone(), self.store.clone())
            .with_sink(Arc::new(HubSink {
                job_id,
                hub: self.hub.clone(),
                high_water: high_water.clone(),
            }))
            .with_retry(self.retry);

        let registry = self.registry.clone();
        let hub = self.hub.clone();
        let job_timeout = self.job_timeout;

        tokio::spawn(async move {
            registry.mark_running(job_id);
            info!(
                job_id = %job_id,
                document_id = %document.document_id,
                words = document.word_count(),
                "job started"
            );

            match tokio::time::timeout(job_timeout, pipeline.run(&document, cancel.clone())).await
            {
                Err(_) => {
                    // Stop the pipeline at its next stage boundary; the job
                    // outcome is already decided.
                    cancel.cancel();
                    warn!(
                        job_id = %job_id,
                        budget_s = job_timeout.as_secs(),
                        "job exceeded its wall-clock budget"
                    );
                    registry.time_out(job_id);
                    let reached = f32::from_bits(high_water.load(Ordering::Relaxed));
                    hub.publish(job_id, ProgressEvent::timed_out(job_id, job_timeout, reached))
                        .await;
                }
                Ok(run) => match run.outcome {
                    RunOutcome::Succeeded => {
                        let counts = counts_of(&run.results);
                        registry.complete(job_id, counts);
                        hub.publish(
                            job_id,
                            ProgressEvent::completed(
                                job_id,
                                format!(
                                    "Distilled {} propositions and {} takeaways across {} units",
                                    counts.propositions, counts.takeaways, counts.units
                                ),
                            ),
                        )
                        .await;
                    }
                    RunOutcome::FailedAtStage { stage, cause } => {
                        registry.fail(job_id, Some(stage.name().to_string()), cause.clone());
                        hub.publish(job_id, ProgressEvent::failed(job_id, stage, cause))
                            .await;
                    }
                },
            }
            hub.cleanup().await;
        });

        job_id
    }
}

fn counts_of(results: &[StageResult]) -> JobCounts {
    let mut counts = JobCounts {
        units: 0,
        propositions: 0,
        takeaways: 0,
    };
    for result in results {
        match result {
            StageResult::Outline(outline) => counts.units = outline.units.len(),
            StageResult::Propositions(output) => {
                counts.propositions = output.propositions.len()
            }
            StageResult::Takeaways(output) => counts.takeaways = output.takeaways.len(),
            StageResult::Classification(_) => {}
        }
    }
    counts
}
