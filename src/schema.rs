//! Request and response bodies

use serde::{Deserialize, Serialize, Serializer};

use crate::features::{FeatureMap, LayoutInfo};
use crate::model::{Architecture, ModelKey, ModelMetadata, PredictError, PredictionResult, PrivacyBudget};

#[derive(Debug, Clone, Deserialize)]
pub struct PredictionRequest {
    /// Up to 15 named features; missing ones default to 0
    pub features: FeatureMap,
    pub model_name: Architecture,
    pub privacy_budget: PrivacyBudget,
}

/// `/compare` only needs the features. Clients send the full prediction
/// request, so model_name and privacy_budget are accepted and ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct CompareRequest {
    pub features: FeatureMap,
}

/// One cell of the comparison map
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CompareEntry {
    Prediction(PredictionResult),
    Error { error: String },
}

impl From<Result<PredictionResult, PredictError>> for CompareEntry {
    fn from(result: Result<PredictionResult, PredictError>) -> Self {
        match result {
            Ok(prediction) => CompareEntry::Prediction(prediction),
            Err(e) => CompareEntry::Error { error: e.to_string() },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CompareResponse {
    /// Serialized as an object keyed by `{model_name}_eps{budget}`, in
    /// `ModelKey::all()` order
    #[serde(serialize_with = "serialize_in_order")]
    pub comparison: Vec<(ModelKey, CompareEntry)>,
}

fn serialize_in_order<S>(entries: &[(ModelKey, CompareEntry)], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_map(entries.iter().map(|(key, entry)| (key, entry)))
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelsResponse {
    pub available_models: Vec<String>,
    pub feature_names: Vec<String>,
    pub feature_version: u8,
    pub layout_hash: u32,
    pub models: Vec<ModelMetadata>,
}

impl ModelsResponse {
    pub fn new(layout: LayoutInfo, models: Vec<ModelMetadata>) -> Self {
        Self {
            available_models: models.iter().map(|m| m.key.to_string()).collect(),
            feature_names: layout.feature_names,
            feature_version: layout.version,
            layout_hash: layout.hash,
            models,
        }
    }
}
