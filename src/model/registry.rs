//! Model Registry - loaded scoring functions keyed by architecture × budget
//!
//! Built once by `ModelRegistry::load` before the server accepts traffic and
//! read-only afterwards, so it is shared behind an `Arc` without locking.
//! Startup problems (missing or broken artifacts) are contained per key;
//! request problems always come back to the caller as `PredictError`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::artifact::{read_artifact, ArtifactInfo};
use super::confidence::{classify, ConfidenceBand};
use super::error::{LoadError, PredictError};
use super::key::{Architecture, ModelKey, PrivacyBudget};
use super::network::Network;
use crate::features::{normalize, FeatureMap, FEATURE_COUNT};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Model metadata reported by the listing endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ModelMetadata {
    pub key: ModelKey,
    pub architecture: Architecture,
    pub privacy_budget: PrivacyBudget,
    pub input_features: usize,
    pub parameters: usize,
    pub artifact: ArtifactInfo,
    pub loaded_at: DateTime<Utc>,
}

/// A network bound to one key, immutable after load
#[derive(Debug, Clone)]
pub struct LoadedModel {
    network: Network,
    metadata: ModelMetadata,
}

impl LoadedModel {
    pub fn new(key: ModelKey, network: Network, artifact: ArtifactInfo) -> Self {
        let metadata = ModelMetadata {
            key,
            architecture: key.architecture,
            privacy_budget: key.budget,
            input_features: FEATURE_COUNT,
            parameters: network.parameter_count(),
            artifact,
            loaded_at: Utc::now(),
        };
        Self { network, metadata }
    }

    pub fn key(&self) -> ModelKey {
        self.metadata.key
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

/// Prediction output, serialized as the `/predict` response body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    /// 0: no treatment needed, 1: treatment needed
    pub prediction: u8,
    pub probability: f64,
    pub model_name: Architecture,
    pub privacy_budget: PrivacyBudget,
    pub confidence: ConfidenceBand,
}

/// What happened to one key during startup
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(LoadedModel),
    /// Artifact absent; not an error
    Missing(PathBuf),
    Failed(LoadError),
}

/// Per-key summary of a registry load
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    pub loaded: Vec<ModelKey>,
    pub missing: Vec<ModelKey>,
    pub failed: Vec<(ModelKey, String)>,
}

// ============================================================================
// LOADING
// ============================================================================

/// Load the artifact for `key` from `models_dir`
pub fn load_model(models_dir: &Path, key: ModelKey) -> LoadOutcome {
    let path = models_dir.join(key.file_name());

    let loaded = read_artifact(&path).and_then(|(state, artifact)| {
        tracing::debug!("{}: {} tensors in {}", key, state.tensor_count(), path.display());
        let network = Network::from_state_dict(key.architecture, &state)?;
        Ok(LoadedModel::new(key, network, artifact))
    });

    match loaded {
        Ok(model) => LoadOutcome::Loaded(model),
        Err(LoadError::Missing(path)) => LoadOutcome::Missing(path),
        Err(e) => LoadOutcome::Failed(e),
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: BTreeMap<ModelKey, LoadedModel>,
}

impl ModelRegistry {
    /// Try every key in `models_dir`. Never fails: keys that can't be
    /// loaded are left out and listed in the report.
    pub fn load(models_dir: &Path) -> (Self, LoadReport) {
        let mut registry = Self::default();
        let mut report = LoadReport::default();

        for key in ModelKey::all() {
            match load_model(models_dir, key) {
                LoadOutcome::Loaded(model) => {
                    tracing::info!(
                        model = %key,
                        parameters = model.metadata().parameters,
                        checksum = %model.metadata().artifact.checksum,
                        "Loaded model"
                    );
                    report.loaded.push(key);
                    registry.models.insert(key, model);
                }
                LoadOutcome::Missing(path) => {
                    tracing::warn!(model = %key, "Model file not found: {}", path.display());
                    report.missing.push(key);
                }
                LoadOutcome::Failed(e) => {
                    tracing::error!(model = %key, "Failed to load model {}: {}", key, e);
                    report.failed.push((key, e.to_string()));
                }
            }
        }

        (registry, report)
    }

    pub fn get(&self, key: &ModelKey) -> Option<&LoadedModel> {
        self.models.get(key)
    }

    /// Loaded keys in canonical order
    pub fn keys(&self) -> impl Iterator<Item = ModelKey> + '_ {
        self.models.keys().copied()
    }

    pub fn models(&self) -> impl Iterator<Item = &LoadedModel> {
        self.models.values()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Score `features` with the model for (`architecture`, `budget`)
    pub fn predict(
        &self,
        features: &FeatureMap,
        architecture: Architecture,
        budget: PrivacyBudget,
    ) -> Result<PredictionResult, PredictError> {
        self.predict_key(features, ModelKey::new(architecture, budget))
    }

    pub fn predict_key(&self, features: &FeatureMap, key: ModelKey) -> Result<PredictionResult, PredictError> {
        let model = self.get(&key).ok_or(PredictError::NotFound(key))?;

        let start = Instant::now();
        let input = normalize(features);
        let probability = model.network().score(&input);

        if !probability.is_finite() {
            return Err(PredictError::Internal {
                key,
                message: format!("model produced non-finite probability {}", probability),
            });
        }

        let probability = f64::from(probability);
        let result = PredictionResult {
            prediction: classify(probability),
            probability,
            model_name: key.architecture,
            privacy_budget: key.budget,
            confidence: ConfidenceBand::from_probability(probability),
        };

        tracing::debug!(
            model = %key,
            probability,
            confidence = result.confidence.as_str(),
            latency_us = start.elapsed().as_micros() as u64,
            "Prediction"
        );

        Ok(result)
    }

    /// Predict with every key. Always returns one entry per valid key;
    /// failures are kept inline instead of aborting the sweep.
    pub fn compare_all(&self, features: &FeatureMap) -> BTreeMap<ModelKey, Result<PredictionResult, PredictError>> {
        ModelKey::all()
            .map(|key| (key, self.predict_key(features, key)))
            .collect()
    }
}
