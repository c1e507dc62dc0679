//! Model listing handler

use axum::{extract::State, Json};

use crate::features::LayoutInfo;
use crate::schema::ModelsResponse;
use crate::AppState;

/// Loaded model keys plus the feature layout clients must send
pub async fn list(State(state): State<AppState>) -> Json<ModelsResponse> {
    let models = state.registry.models().map(|m| m.metadata().clone()).collect();
    Json(ModelsResponse::new(LayoutInfo::current(), models))
}
