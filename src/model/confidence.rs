//! Decision threshold and confidence banding
//!
//! The bands are asymmetric distances from the 0.5 decision boundary and are
//! checked High → Medium → Low with strict comparisons, so the edges
//! (0.3, 0.4, 0.6, 0.7) always fall into the *less* confident band.

use serde::{Deserialize, Serialize};

/// Probability strictly above this is class 1
pub const DECISION_THRESHOLD: f64 = 0.5;

/// High when probability is strictly outside [HIGH_LOWER, HIGH_UPPER]
pub const HIGH_LOWER: f64 = 0.3;
pub const HIGH_UPPER: f64 = 0.7;

/// Medium when probability is strictly outside [MEDIUM_LOWER, MEDIUM_UPPER]
pub const MEDIUM_LOWER: f64 = 0.4;
pub const MEDIUM_UPPER: f64 = 0.6;

/// Human-readable certainty bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceBand {
    Low,
    Medium,
    High,
}

impl ConfidenceBand {
    pub fn from_probability(probability: f64) -> Self {
        if probability < HIGH_LOWER || probability > HIGH_UPPER {
            ConfidenceBand::High
        } else if probability < MEDIUM_LOWER || probability > MEDIUM_UPPER {
            ConfidenceBand::Medium
        } else {
            ConfidenceBand::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceBand::Low => "Low",
            ConfidenceBand::Medium => "Medium",
            ConfidenceBand::High => "High",
        }
    }
}

/// 0 = no treatment needed, 1 = treatment needed
pub fn classify(probability: f64) -> u8 {
    if probability > DECISION_THRESHOLD {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_boundary() {
        assert_eq!(classify(0.5), 0);
        assert_eq!(classify(0.500001), 1);
        assert_eq!(classify(0.0), 0);
        assert_eq!(classify(1.0), 1);
    }

    #[test]
    fn test_band_extremes() {
        assert_eq!(ConfidenceBand::from_probability(0.0), ConfidenceBand::High);
        assert_eq!(ConfidenceBand::from_probability(0.05), ConfidenceBand::High);
        assert_eq!(ConfidenceBand::from_probability(0.95), ConfidenceBand::High);
        assert_eq!(ConfidenceBand::from_probability(1.0), ConfidenceBand::High);
    }

    #[test]
    fn test_band_edges_fall_to_less_confident() {
        assert_eq!(ConfidenceBand::from_probability(0.299999), ConfidenceBand::High);
        assert_eq!(ConfidenceBand::from_probability(0.30), ConfidenceBand::Medium);
        assert_eq!(ConfidenceBand::from_probability(0.70), ConfidenceBand::Medium);
        assert_eq!(ConfidenceBand::from_probability(0.700001), ConfidenceBand::High);

        assert_eq!(ConfidenceBand::from_probability(0.399999), ConfidenceBand::Medium);
        assert_eq!(ConfidenceBand::from_probability(0.40), ConfidenceBand::Low);
        assert_eq!(ConfidenceBand::from_probability(0.60), ConfidenceBand::Low);
        assert_eq!(ConfidenceBand::from_probability(0.600001), ConfidenceBand::Medium);
    }

    #[test]
    fn test_band_midpoint() {
        assert_eq!(ConfidenceBand::from_probability(0.5), ConfidenceBand::Low);
        assert_eq!(classify(0.5), 0);
    }

    #[test]
    fn test_band_serializes_as_label() {
        let json = serde_json::to_string(&ConfidenceBand::Medium).unwrap();
        assert_eq!(json, "\"Medium\"");
        assert_eq!(ConfidenceBand::High.as_str(), "High");
    }
}
