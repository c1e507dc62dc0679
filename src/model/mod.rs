//! Model Module - registry and inference engine
//!
//! Loads the (architecture × privacy budget) artifacts once at startup and
//! scores requests against them.

pub mod artifact;
pub mod confidence;
pub mod error;
pub mod key;
pub mod network;
pub mod registry;

// Re-export common types
pub use confidence::ConfidenceBand;
pub use error::{LoadError, PredictError};
pub use key::{Architecture, ModelKey, PrivacyBudget};
pub use registry::{LoadReport, LoadedModel, ModelMetadata, ModelRegistry, PredictionResult};
