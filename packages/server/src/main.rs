// Main entry point for the distillation API server

use std::sync::Arc;

use anyhow::{Context, Result};
use distiller::testing::MockExtractor;
use distiller::MemoryStore;
use server_core::{build_app, AppState, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug,distiller=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting document distillation API");

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(port = config.port, "Configuration loaded");

    // The extraction backend is wired here; until a hosted reasoning service
    // is integrated, the canned extractor stands in and distills every
    // document into the fixture analysis.
    let extractor = Arc::new(MockExtractor::new());
    tracing::warn!("no extraction backend configured; using canned extractor output");

    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(config.clone(), extractor, store);
    let app = build_app(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
