//! Application setup and router wiring.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::routes::{documents, health, jobs, stream};
use crate::state::AppState;

/// Build the axum application router.
pub fn build_app(state: AppState) -> Router {
    // Let oversized submissions through to the handler's own limit check,
    // which answers with a JSON 413 instead of a bare rejection.
    let body_limit = state.config.max_document_bytes + 1024 * 1024;
    Router::new()
        .route("/health", get(health::health))
        .route(
            "/api/documents",
            post(documents::submit).get(documents::list),
        )
        .route(
            "/api/documents/:id",
            get(documents::fetch).delete(documents::remove),
        )
        .route("/api/documents/:id/search", get(documents::search))
        .route("/api/jobs/:id", get(jobs::status))
        .route("/api/jobs/:id/cancel", post(jobs::cancel))
        .route("/api/jobs/:id/events", get(stream::events))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
