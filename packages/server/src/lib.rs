//! HTTP service around the document distillation pipeline.
//!
//! Accepts document submissions, runs each through the staged pipeline on a
//! background job, broadcasts per-job progress over SSE, and serves the
//! persisted analyses.
//!
//! # Modules
//!
//! - [`app`] - Router wiring
//! - [`config`] - Environment configuration
//! - [`error`] - API error taxonomy
//! - [`jobs`] - Job registry, events and the per-job runner
//! - [`routes`] - HTTP handlers
//! - [`state`] - Shared application state
//! - [`stream_hub`] - Per-job broadcast fan-out

pub mod app;
pub mod config;
pub mod error;
pub mod jobs;
pub mod routes;
pub mod state;
pub mod stream_hub;

pub use app::build_app;
pub use config::Config;
pub use error::ApiError;
pub use state::AppState;
pub use stream_hub::StreamHub;
