//! Feature Vector - Core data structure for model input
//!
//! Turns the sparse `name → value` mapping a client sends into the fixed
//! 15-slot layout from `layout.rs`, then z-scores it.
//!
//! NOTE: mean and std are taken across the 15 slots of the *request itself*,
//! not from training-set statistics. The deployed artifacts were served this
//! way, so it is kept, but it is almost certainly a defect upstream: two
//! requests that differ only by a constant offset normalize identically.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::layout::{layout_hash, FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION};

/// Value used for any canonical feature the request omits
pub const DEFAULT_FEATURE_VALUE: f64 = 0.0;

/// Added to the standard deviation so constant inputs don't divide by zero
pub const NORMALIZATION_EPSILON: f64 = 1e-8;

/// Raw request features keyed by name.
///
/// Values stay untyped so a key outside the layout can hold anything without
/// failing the request.
pub type FeatureMap = HashMap<String, Value>;

// ============================================================================
// VERSIONED FEATURE VECTOR
// ============================================================================

/// Feature values in `FEATURE_LAYOUT` order, tagged with the layout they follow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Feature layout version
    pub version: u8,
    /// CRC32 hash of the feature layout
    pub layout_hash: u32,
    /// Feature values in order defined by FEATURE_LAYOUT
    pub values: [f32; FEATURE_COUNT],
}

impl FeatureVector {
    /// Create from raw values with current version
    pub fn from_values(values: [f32; FEATURE_COUNT]) -> Self {
        Self {
            version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            values,
        }
    }

    /// Get values as slice
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// Get feature by name
    pub fn get_by_name(&self, name: &str) -> Option<f32> {
        super::layout::feature_index(name).map(|i| self.values[i])
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<[f32; FEATURE_COUNT]> for FeatureVector {
    fn from(values: [f32; FEATURE_COUNT]) -> Self {
        Self::from_values(values)
    }
}

// ============================================================================
// PREPROCESSING
// ============================================================================

/// Pick the canonical features out of `features`, in layout order.
///
/// Missing names become `DEFAULT_FEATURE_VALUE`, and so do canonical names
/// whose value is not a JSON number (string, bool, null, array, object).
/// Names outside the layout are never read.
pub fn fill_defaults(features: &FeatureMap) -> [f64; FEATURE_COUNT] {
    let mut raw = [DEFAULT_FEATURE_VALUE; FEATURE_COUNT];
    for (slot, name) in raw.iter_mut().zip(FEATURE_LAYOUT) {
        if let Some(value) = features.get(*name).and_then(Value::as_f64) {
            *slot = value;
        }
    }
    raw
}

/// Default-fill and z-score a request's features.
///
/// Never fails: malformed mappings degrade to defaults instead of rejecting
/// the request.
pub fn normalize(features: &FeatureMap) -> FeatureVector {
    let raw = fill_defaults(features);

    let n = FEATURE_COUNT as f64;
    let mean = raw.iter().sum::<f64>() / n;
    let variance = raw.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();

    let mut values = [0.0f32; FEATURE_COUNT];
    for (out, x) in values.iter_mut().zip(raw.iter()) {
        *out = ((x - mean) / (std + NORMALIZATION_EPSILON)) as f32;
    }

    FeatureVector::from_values(values)
}

// ============================================================================
// TESTS
// ============================================================================
