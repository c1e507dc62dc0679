//! Scoring networks - LR, MLP and DeepMLP forward passes
//!
//! Each architecture is described once as a `LayerSpec` plan. Loading walks
//! the plan pulling tensors out of a state dict; scoring walks the bound
//! layers. Everything runs in inference mode: dropout is the identity and
//! batch norm uses its running statistics, folded into a per-channel affine
//! transform at load time.

use ndarray::{Array1, Array2};

use super::artifact::StateDict;
use super::error::LoadError;
use super::key::Architecture;
use crate::features::{FeatureVector, FEATURE_COUNT};

/// Hidden widths of `Architecture::Mlp`
pub const MLP_HIDDEN: [usize; 2] = [64, 32];

/// Embedding widths of `Architecture::DeepMlp`
pub const DEEP_MLP_EMBEDDING: [usize; 3] = [128, 64, 32];

/// Width of DeepMLP's head layer
pub const DEEP_MLP_HEAD: usize = 64;

/// Batch norm epsilon the artifacts were trained with
pub const BATCH_NORM_EPS: f32 = 1e-5;

// ============================================================================
// LAYER PLAN
// ============================================================================

/// One step of an architecture, with the state dict prefix it reads from
#[derive(Debug, Clone, PartialEq)]
pub enum LayerSpec {
    Linear { prefix: String, input: usize, output: usize },
    BatchNorm { prefix: String, features: usize },
    Relu,
}

impl LayerSpec {
    /// Tensor names and shapes this step needs
    pub fn tensors(&self) -> Vec<(String, Vec<usize>)> {
        match self {
            LayerSpec::Linear { prefix, input, output } => vec![
                (format!("{prefix}.weight"), vec![*output, *input]),
                (format!("{prefix}.bias"), vec![*output]),
            ],
            LayerSpec::BatchNorm { prefix, features } => ["weight", "bias", "running_mean", "running_var"]
                .iter()
                .map(|t| (format!("{prefix}.{t}"), vec![*features]))
                .collect(),
            LayerSpec::Relu => Vec::new(),
        }
    }
}

fn linear(prefix: impl Into<String>, input: usize, output: usize) -> LayerSpec {
    LayerSpec::Linear { prefix: prefix.into(), input, output }
}

/// Layer plan of an architecture for `input_dim` features.
///
/// Indices follow `nn.Sequential` numbering including the dropout modules
/// that are skipped at inference, so the prefixes match the trained state
/// dicts.
pub fn layer_plan(architecture: Architecture, input_dim: usize) -> Vec<LayerSpec> {
    match architecture {
        Architecture::Lr => vec![linear("linear", input_dim, 1)],

        Architecture::Mlp => {
            // Linear, ReLU, Dropout per hidden layer
            let mut plan = Vec::new();
            let mut prev = input_dim;
            let mut index = 0;
            for hidden in MLP_HIDDEN {
                plan.push(linear(format!("network.{index}"), prev, hidden));
                plan.push(LayerSpec::Relu);
                prev = hidden;
                index += 3;
            }
            plan.push(linear(format!("network.{index}"), prev, 1));
            plan
        }

        Architecture::DeepMlp => {
            // Linear, BatchNorm, ReLU, Dropout per embedding layer
            let mut plan = Vec::new();
            let mut prev = input_dim;
            let mut index = 0;
            for hidden in DEEP_MLP_EMBEDDING {
                plan.push(linear(format!("network.{index}"), prev, hidden));
                plan.push(LayerSpec::BatchNorm {
                    prefix: format!("network.{}", index + 1),
                    features: hidden,
                });
                plan.push(LayerSpec::Relu);
                prev = hidden;
                index += 4;
            }
            // Head: Linear, ReLU, Dropout, Linear
            plan.push(linear(format!("network.{index}"), prev, DEEP_MLP_HEAD));
            plan.push(LayerSpec::Relu);
            plan.push(linear(format!("network.{}", index + 3), DEEP_MLP_HEAD, 1));
            plan
        }
    }
}

// ============================================================================
// LAYERS
// ============================================================================

/// Fully connected layer, weight is `[out, in]`
#[derive(Debug, Clone)]
pub struct Linear {
    weight: Array2<f32>,
    bias: Array1<f32>,
}

impl Linear {
    pub fn new(weight: Array2<f32>, bias: Array1<f32>) -> Self {
        Self { weight, bias }
    }

    pub fn forward(&self, x: &Array1<f32>) -> Array1<f32> {
        self.weight.dot(x) + &self.bias
    }

    pub fn parameter_count(&self) -> usize {
        self.weight.len() + self.bias.len()
    }
}

/// Batch norm in eval mode, reduced to `x * scale + shift`
#[derive(Debug, Clone)]
pub struct BatchNorm {
    scale: Array1<f32>,
    shift: Array1<f32>,
    parameters: usize,
}

impl BatchNorm {
    pub fn new(
        weight: Array1<f32>,
        bias: Array1<f32>,
        running_mean: Array1<f32>,
        running_var: Array1<f32>,
    ) -> Self {
        let parameters = weight.len() + bias.len() + running_mean.len() + running_var.len();
        let scale = &weight / &running_var.mapv(|v| (v + BATCH_NORM_EPS).sqrt());
        let shift = &bias - &(&running_mean * &scale);
        Self { scale, shift, parameters }
    }

    pub fn forward(&self, x: &Array1<f32>) -> Array1<f32> {
        x * &self.scale + &self.shift
    }
}

#[derive(Debug, Clone)]
enum Layer {
    Linear(Linear),
    BatchNorm(BatchNorm),
    Relu,
}

impl Layer {
    fn forward(&self, x: Array1<f32>) -> Array1<f32> {
        match self {
            Layer::Linear(linear) => linear.forward(&x),
            Layer::BatchNorm(norm) => norm.forward(&x),
            Layer::Relu => x.mapv_into(|v| v.max(0.0)),
        }
    }

    fn parameter_count(&self) -> usize {
        match self {
            Layer::Linear(linear) => linear.parameter_count(),
            Layer::BatchNorm(norm) => norm.parameters,
            Layer::Relu => 0,
        }
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

// ============================================================================
// NETWORK
// ============================================================================

/// A bound scoring function: architecture plus frozen parameters
#[derive(Debug, Clone)]
pub struct Network {
    architecture: Architecture,
    layers: Vec<Layer>,
}

impl Network {
    /// Build `architecture` for the 15-feature layout from a state dict
    pub fn from_state_dict(architecture: Architecture, state: &StateDict) -> Result<Self, LoadError> {
        let mut layers = Vec::new();

        for spec in layer_plan(architecture, FEATURE_COUNT) {
            let layer = match spec {
                LayerSpec::Linear { prefix, input, output } => Layer::Linear(Linear::new(
                    state.matrix(&format!("{prefix}.weight"), output, input)?,
                    state.vector(&format!("{prefix}.bias"), output)?,
                )),
                LayerSpec::BatchNorm { prefix, features } => Layer::BatchNorm(BatchNorm::new(
                    state.vector(&format!("{prefix}.weight"), features)?,
                    state.vector(&format!("{prefix}.bias"), features)?,
                    state.vector(&format!("{prefix}.running_mean"), features)?,
                    state.vector(&format!("{prefix}.running_var"), features)?,
                )),
                LayerSpec::Relu => Layer::Relu,
            };
            layers.push(layer);
        }

        Ok(Self { architecture, layers })
    }

    pub fn architecture(&self) -> Architecture {
        self.architecture
    }

    pub fn parameter_count(&self) -> usize {
        self.layers.iter().map(Layer::parameter_count).sum()
    }

    /// Forward pass, returns the class-1 probability
    pub fn score(&self, input: &FeatureVector) -> f32 {
        let x = Array1::from(input.values.to_vec());
        let out = self.layers.iter().fold(x, |x, layer| layer.forward(x));
        sigmoid(out[0])
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_lr_plan_tensors() {
        let tensors: Vec<_> = layer_plan(Architecture::Lr, FEATURE_COUNT)
            .iter()
            .flat_map(LayerSpec::tensors)
            .collect();
        assert_eq!(
            tensors,
            vec![
                ("linear.weight".to_string(), vec![1, 15]),
                ("linear.bias".to_string(), vec![1]),
            ]
        );
    }

    #[test]
    fn test_mlp_plan_prefixes() {
        let prefixes: Vec<String> = layer_plan(Architecture::Mlp, FEATURE_COUNT)
            .into_iter()
            .filter_map(|spec| match spec {
                LayerSpec::Linear { prefix, .. } => Some(prefix),
                _ => None,
            })
            .collect();
        assert_eq!(prefixes, vec!["network.0", "network.3", "network.6"]);
    }

    #[test]
    fn test_deep_mlp_plan_prefixes() {
        let plan = layer_plan(Architecture::DeepMlp, FEATURE_COUNT);
        let linear: Vec<&str> = plan
            .iter()
            .filter_map(|spec| match spec {
                LayerSpec::Linear { prefix, .. } => Some(prefix.as_str()),
                _ => None,
            })
            .collect();
        let norms: Vec<&str> = plan
            .iter()
            .filter_map(|spec| match spec {
                LayerSpec::BatchNorm { prefix, .. } => Some(prefix.as_str()),
                _ => None,
            })
            .collect();

        assert_eq!(linear, vec!["network.0", "network.4", "network.8", "network.12", "network.15"]);
        assert_eq!(norms, vec!["network.1", "network.5", "network.9"]);
    }

    #[test]
    fn test_lr_score() {
        let dict = state_dict_with(Architecture::Lr, |name| if name.ends_with("bias") { -1.0 } else { 0.1 });
        let net = Network::from_state_dict(Architecture::Lr, &dict).unwrap();

        // 15 * 0.1 - 1.0 = 0.5
        let score = net.score(&FeatureVector::from_values([1.0; FEATURE_COUNT]));
        assert!(approx(score, sigmoid(0.5)));
        assert!(approx(score, 0.622_459_3));
        assert_eq!(net.parameter_count(), 16);
    }

    #[test]
    fn test_zero_input_scores_bias_only() {
        let dict = state_dict_with(Architecture::Lr, |name| if name.ends_with("bias") { 2.0 } else { 0.7 });
        let net = Network::from_state_dict(Architecture::Lr, &dict).unwrap();

        let score = net.score(&FeatureVector::from_values([0.0; FEATURE_COUNT]));
        assert!(approx(score, sigmoid(2.0)));
    }

    #[test]
    fn test_mlp_score() {
        let dict = state_dict_with(Architecture::Mlp, |name| match name {
            "network.0.weight" => 1.0,
            "network.3.weight" => 0.001,
            "network.6.weight" => 0.01,
            _ => 0.0,
        });
        let net = Network::from_state_dict(Architecture::Mlp, &dict).unwrap();

        // h1 = 15, h2 = 64 * 15 * 0.001 = 0.96, logit = 32 * 0.96 * 0.01
        let score = net.score(&FeatureVector::from_values([1.0; FEATURE_COUNT]));
        assert!(approx(score, sigmoid(0.3072)));
        assert_eq!(net.parameter_count(), 15 * 64 + 64 + 64 * 32 + 32 + 32 + 1);
    }

    #[test]
    fn test_mlp_relu_clamps_negative() {
        let dict = state_dict_with(Architecture::Mlp, |name| match name {
            "network.0.weight" => 1.0,
            "network.3.weight" => 1.0,
            "network.6.weight" => 1.0,
            _ => 0.0,
        });
        let net = Network::from_state_dict(Architecture::Mlp, &dict).unwrap();

        let score = net.score(&FeatureVector::from_values([-1.0; FEATURE_COUNT]));
        assert!(approx(score, 0.5));
    }

    #[test]
    fn test_batch_norm_eval() {
        let norm = BatchNorm::new(
            Array1::from(vec![2.0, 1.0]),
            Array1::from(vec![0.5, 0.0]),
            Array1::from(vec![1.0, 0.0]),
            Array1::from(vec![4.0 - BATCH_NORM_EPS, 1.0 - BATCH_NORM_EPS]),
        );

        let y = norm.forward(&Array1::from(vec![3.0, -2.0]));
        // (3 - 1) / 2 * 2 + 0.5, (-2 - 0) / 1 * 1 + 0
        assert!(approx(y[0], 2.5));
        assert!(approx(y[1], -2.0));
    }

    #[test]
    fn test_deep_mlp_score() {
        let dict = state_dict_with(Architecture::DeepMlp, |name| match name {
            "network.15.bias" => -1.5,
            n if n.ends_with("running_var") => 1.0,
            _ => 0.0,
        });
        let net = Network::from_state_dict(Architecture::DeepMlp, &dict).unwrap();

        let score = net.score(&FeatureVector::from_values([3.0; FEATURE_COUNT]));
        assert!(approx(score, sigmoid(-1.5)));
    }

    #[test]
    fn test_constant_fixture_loads_every_architecture() {
        for arch in Architecture::ALL {
            let net = Network::from_state_dict(arch, &constant_state_dict(arch, 0.01)).unwrap();
            let score = net.score(&FeatureVector::from_values([0.5; FEATURE_COUNT]));
            assert!(score > 0.0 && score < 1.0);
            assert_eq!(net.architecture(), arch);
        }
    }

    #[test]
    fn test_wrong_architecture_rejected() {
        let dict = constant_state_dict(Architecture::Lr, 0.1);
        let err = Network::from_state_dict(Architecture::Mlp, &dict).unwrap_err();
        assert!(matches!(err, LoadError::MissingTensor(_)));
    }

    #[test]
    fn test_wrong_input_width_rejected() {
        let mut dict = constant_state_dict(Architecture::Lr, 0.1);
        dict.insert(
            "linear.weight",
            crate::model::artifact::TensorEntry { shape: vec![1, 14], data: vec![0.1; 14] },
        );
        let err = Network::from_state_dict(Architecture::Lr, &dict).unwrap_err();
        assert!(matches!(err, LoadError::ShapeMismatch { .. }));
    }
}
