//! Inference error types
//!
//! `LoadError` only ever happens at startup and is contained by the registry.
//! `PredictError` is what a caller sees.

use std::path::PathBuf;

use thiserror::Error;

use super::key::ModelKey;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Model file not found: {}", .0.display())]
    Missing(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Missing tensor '{0}'")]
    MissingTensor(String),

    #[error("Tensor '{name}' has shape {actual:?}, expected {expected:?}")]
    ShapeMismatch {
        name: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Tensor '{name}' declares {declared} values but holds {actual}")]
    DataLength {
        name: String,
        declared: usize,
        actual: usize,
    },
}

impl LoadError {
    /// Missing artifacts are expected and only warrant a warning
    pub fn is_missing(&self) -> bool {
        matches!(self, LoadError::Missing(_))
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    #[error("Model {0} not found")]
    NotFound(ModelKey),

    #[error("Inference failed for {key}: {message}")]
    Internal { key: ModelKey, message: String },
}
