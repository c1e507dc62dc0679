//! Prediction handlers

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::model::{ModelKey, PredictionResult};
use crate::schema::{CompareEntry, CompareRequest, CompareResponse, PredictionRequest};
use crate::{AppResult, AppState};

/// Score the features with one model
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictionRequest>, JsonRejection>,
) -> AppResult<Json<PredictionResult>> {
    let Json(request) = payload?;

    let result = state
        .registry
        .predict(&request.features, request.model_name, request.privacy_budget)
        .map_err(|e| {
            tracing::error!("Prediction error: {}", e);
            e
        })?;

    Ok(Json(result))
}

/// Score the features with every model variant
pub async fn compare(
    State(state): State<AppState>,
    payload: Result<Json<CompareRequest>, JsonRejection>,
) -> AppResult<Json<CompareResponse>> {
    let Json(request) = payload?;

    // compare_all is keyed by ModelKey, so iteration is already canonical order
    let comparison: Vec<(ModelKey, CompareEntry)> = state
        .registry
        .compare_all(&request.features)
        .into_iter()
        .map(|(key, result)| (key, CompareEntry::from(result)))
        .collect();

    Ok(Json(CompareResponse { comparison }))
}
