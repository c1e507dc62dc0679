//! Feature Layout - Centralized Feature Definition
//!
//! **This file controls the feature schema the models were trained on**
//!
//! ## Rules:
//! 1. Add feature → increment FEATURE_VERSION and retrain every artifact
//! 2. Change order → increment FEATURE_VERSION and retrain every artifact
//! 3. Remove feature → increment FEATURE_VERSION and retrain every artifact

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Feature names in exact order they appear in the model input
pub const FEATURE_LAYOUT: &[&str] = &[
    // === Demographics (0-6) ===
    "age",                   // 0: Years, 18-100
    "gender",                // 1: 0 male, 1 female, 2 other
    "education",             // 2: 0 high school .. 4 PhD
    "employment",            // 3: 0 unemployed .. 3 self-employed
    "income",                // 4: Annual income
    "marital_status",        // 5: 0 single .. 3 widowed
    "children",              // 6: Number of children

    // === Lifestyle (7-10) ===
    "alcohol_consumption",   // 7: 0-10
    "drug_use",              // 8: 0-10
    "sleep_hours",           // 9: Average hours per night
    "exercise_hours",        // 10: Hours per week

    // === Clinical (11-14) ===
    "stress_level",          // 11: 0-10
    "social_support",        // 12: 0-10
    "therapy_history",       // 13: 0 no, 1 yes
    "symptom_severity",      // 14: 0-10
];

/// Total number of features
/// Must match FEATURE_LAYOUT.len() and every artifact's input width
pub const FEATURE_COUNT: usize = 15;

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 of the version byte followed by every feature name, NUL separated
pub fn layout_hash() -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[FEATURE_VERSION]);

    for name in FEATURE_LAYOUT {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
    }

    hasher.finalize()
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Layout description returned by the model listing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for LayoutInfo {
    fn default() -> Self {
        Self::current()
    }
}

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

/// Get feature index by name (linear scan, the layout is tiny)
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

// ============================================================================
// TESTS
// ============================================================================
