//! Mental Health Prediction Server - entry point
//!
//! Loads every model artifact, then serves HTTP until Ctrl-C.

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mh_inference::{config::Config, create_router, model::ModelRegistry, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "mh_inference=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing::info!("Mental Health Prediction API starting...");
    tracing::info!("Models directory: {}", config.models_dir.display());

    // Load models before accepting any request
    let (registry, report) = ModelRegistry::load(&config.models_dir);
    tracing::info!(
        loaded = report.loaded.len(),
        missing = report.missing.len(),
        failed = report.failed.len(),
        "Model registry ready"
    );
    if registry.is_empty() {
        tracing::warn!("No models loaded, every prediction will return 404");
    }

    let addr = config.bind_addr();
    let app = create_router(AppState::new(registry, config));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("🚀 Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for ctrl+c: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down...");
}
