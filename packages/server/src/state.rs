//! Shared application state.

use std::sync::Arc;

use distiller::{AnalysisStore, Extractor};

use crate::config::Config;
use crate::jobs::{JobRegistry, JobRunner};
use crate::stream_hub::StreamHub;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: JobRegistry,
    pub hub: StreamHub,
    pub runner: Arc<JobRunner>,
    pub store: Arc<dyn AnalysisStore>,
}

impl AppState {
    pub fn new(
        config: Config,
        extractor: Arc<dyn Extractor>,
        store: Arc<dyn AnalysisStore>,
    ) -> Self {
        let registry = JobRegistry::new();
        let hub = StreamHub::with_capacity(config.stream_capacity);
        let runner = Arc::new(JobRunner::new(
            registry.clone(),
            hub.clone(),
            extractor,
            store.clone(),
            config.retry_policy(),
            config.job_timeout,
        ));
        Self {
            config: Arc::new(config),
            registry,
            hub,
            runner,
            store,
        }
    }
}
