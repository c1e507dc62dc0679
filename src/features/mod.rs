//! Features Module - Request preprocessing
//!
//! Fixed 15-feature layout and the per-request normalization applied before
//! scoring.

pub mod layout;
pub mod vector;

// Re-export common types
pub use layout::{LayoutInfo, FEATURE_COUNT, FEATURE_LAYOUT};
pub use vector::{normalize, FeatureMap, FeatureVector};
