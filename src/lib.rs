//! Mental Health Prediction Server
//!
//! Serves treatment-need predictions from models trained under federated
//! learning with differential privacy, one artifact per
//! (architecture, privacy budget) pair.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    MH-INFERENCE                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌──────────────┐   ┌────────────────────┐  │
//! │  │  API      │──▶│  Features    │──▶│  Model Registry    │  │
//! │  │  (Axum)   │   │  (normalize) │   │  LR / MLP / Deep   │  │
//! │  └───────────┘   └──────────────┘   │  × ε 0.1 / 5.0     │  │
//! │                                     └─────────┬──────────┘  │
//! │                                               ▼             │
//! │                                     ┌────────────────────┐  │
//! │                                     │ models/*.json      │  │
//! │                                     └────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod features;
pub mod handlers;
pub mod model;
pub mod schema;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use error::{AppError, AppResult};

use model::ModelRegistry;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ModelRegistry>,
    pub config: config::Config,
}

impl AppState {
    pub fn new(registry: ModelRegistry, config: config::Config) -> Self {
        Self {
            registry: Arc::new(registry),
            config,
        }
    }
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::check))
        .route("/predict", post(handlers::predict::predict))
        .route("/compare", post(handlers::predict::compare))
        .route("/models", get(handlers::models::list))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
