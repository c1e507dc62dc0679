//! Model identity - architecture × privacy budget

use std::fmt;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

/// Classifier shape an artifact was trained with
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Architecture {
    #[serde(rename = "LR")]
    Lr,
    #[serde(rename = "MLP")]
    Mlp,
    #[serde(rename = "DeepMLP")]
    DeepMlp,
}

impl Architecture {
    pub const ALL: [Architecture; 3] = [Architecture::Lr, Architecture::Mlp, Architecture::DeepMlp];

    pub fn as_str(&self) -> &'static str {
        match self {
            Architecture::Lr => "LR",
            Architecture::Mlp => "MLP",
            Architecture::DeepMlp => "DeepMLP",
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Differential-privacy budget (ε) the artifact was trained under.
///
/// Only a label here: it picks which artifact to score with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PrivacyBudget {
    /// ε = 0.1
    Tight,
    /// ε = 5.0
    Loose,
}

impl PrivacyBudget {
    pub const ALL: [PrivacyBudget; 2] = [PrivacyBudget::Tight, PrivacyBudget::Loose];

    pub fn epsilon(&self) -> f64 {
        match self {
            PrivacyBudget::Tight => 0.1,
            PrivacyBudget::Loose => 5.0,
        }
    }

    /// Match a client-supplied ε against the two trained budgets
    pub fn from_epsilon(epsilon: f64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|budget| (budget.epsilon() - epsilon).abs() < 1e-9)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PrivacyBudget::Tight => "0.1",
            PrivacyBudget::Loose => "5.0",
        }
    }
}

impl fmt::Display for PrivacyBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PrivacyBudget {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.epsilon())
    }
}

impl<'de> Deserialize<'de> for PrivacyBudget {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let epsilon = f64::deserialize(deserializer)?;
        PrivacyBudget::from_epsilon(epsilon).ok_or_else(|| {
            de::Error::custom(format!("privacy_budget must be 0.1 or 5.0, got {}", epsilon))
        })
    }
}

/// Registry key, rendered as `{architecture}_eps{budget}` (e.g. `MLP_eps5.0`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModelKey {
    pub architecture: Architecture,
    pub budget: PrivacyBudget,
}

impl ModelKey {
    pub fn new(architecture: Architecture, budget: PrivacyBudget) -> Self {
        Self { architecture, budget }
    }

    /// Every valid key, architectures outer, budgets inner
    pub fn all() -> impl Iterator<Item = ModelKey> {
        Architecture::ALL.into_iter().flat_map(|architecture| {
            PrivacyBudget::ALL
                .into_iter()
                .map(move |budget| ModelKey::new(architecture, budget))
        })
    }

    /// Artifact file name for this key inside the models directory
    pub fn file_name(&self) -> String {
        format!("{}.{}", self, super::artifact::ARTIFACT_EXTENSION)
    }
}

impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_eps{}", self.architecture, self.budget)
    }
}

impl Serialize for ModelKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
