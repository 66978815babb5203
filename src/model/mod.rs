//! Two-branch sequence classifiers
//!
//! Every architecture takes two parallel integer-encoded sequence inputs
//! ("pi" and "m") and produces one logit per sample. The active architecture
//! is the transformer; the 1D-convolution baseline is kept selectable.

pub mod conv;
pub mod transformer;

use burn::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SeqPairError};
use conv::{ConvClassifier, ConvClassifierConfig};
use transformer::{TransformerClassifier, TransformerClassifierConfig};

/// Size of the sequence alphabet {A, T, C, G}.
pub const VOCAB_SIZE: usize = 4;

/// The registry of known architectures.
///
/// Checkpoint sidecars record the tag; loading resolves it through
/// [`ModelKind::from_tag`] and fails closed on anything unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Transformer,
    BaseConv,
}

impl ModelKind {
    pub fn tag(&self) -> &'static str {
        match self {
            ModelKind::Transformer => "transformer",
            ModelKind::BaseConv => "base_conv",
        }
    }

    pub fn from_tag(tag: &str) -> Result<Self> {
        match tag {
            "transformer" => Ok(ModelKind::Transformer),
            "base_conv" => Ok(ModelKind::BaseConv),
            other => Err(SeqPairError::UnknownModelKind(other.to_string())),
        }
    }
}

/// Architecture hyperparameters, shared between config file and checkpoint
/// sidecar.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub kind: ModelKind,
    /// Embedding dimension per token (transformer)
    pub d_model: usize,
    /// Attention heads (transformer)
    pub n_heads: usize,
    /// Feed-forward dimension inside the transformer block
    pub ff_dim: usize,
    /// Dense-head hidden dimension
    pub hidden_dim: usize,
    /// Dropout probability
    pub dropout: f64,
    /// Convolution filters (base_conv)
    pub conv_filters: usize,
    /// Convolution kernel size (base_conv)
    pub conv_kernel: usize,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            kind: ModelKind::Transformer,
            d_model: 32,
            n_heads: 2,
            ff_dim: 32,
            hidden_dim: 64,
            dropout: 0.1,
            conv_filters: 32,
            conv_kernel: 5,
        }
    }
}

/// A classifier of either known kind.
#[derive(Module, Debug)]
pub enum PairClassifier<B: Backend> {
    Transformer(TransformerClassifier<B>),
    BaseConv(ConvClassifier<B>),
}

impl<B: Backend> PairClassifier<B> {
    /// Forward pass producing one logit per sample.
    pub fn forward(&self, pi: Tensor<B, 2, Int>, m: Tensor<B, 2, Int>) -> Tensor<B, 1> {
        match self {
            PairClassifier::Transformer(model) => model.forward(pi, m),
            PairClassifier::BaseConv(model) => model.forward(pi, m),
        }
    }

    /// Probabilities in [0, 1].
    pub fn predict(&self, pi: Tensor<B, 2, Int>, m: Tensor<B, 2, Int>) -> Tensor<B, 1> {
        burn::tensor::activation::sigmoid(self.forward(pi, m))
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            PairClassifier::Transformer(_) => ModelKind::Transformer,
            PairClassifier::BaseConv(_) => ModelKind::BaseConv,
        }
    }
}

/// Construct a fresh model for the configured architecture and sequence
/// lengths.
pub fn build<B: Backend>(
    settings: &ModelSettings,
    pi_len: usize,
    m_len: usize,
    device: &B::Device,
) -> PairClassifier<B> {
    match settings.kind {
        ModelKind::Transformer => PairClassifier::Transformer(
            TransformerClassifierConfig::new(pi_len, m_len)
                .with_d_model(settings.d_model)
                .with_n_heads(settings.n_heads)
                .with_ff_dim(settings.ff_dim)
                .with_hidden_dim(settings.hidden_dim)
                .with_dropout(settings.dropout)
                .init(device),
        ),
        ModelKind::BaseConv => PairClassifier::BaseConv(
            ConvClassifierConfig::new(pi_len, m_len)
                .with_filters(settings.conv_filters)
                .with_kernel_size(settings.conv_kernel)
                .with_hidden_dim(settings.hidden_dim)
                .with_dropout(settings.dropout)
                .init(device),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_kind_tags_round_trip() {
        for kind in [ModelKind::Transformer, ModelKind::BaseConv] {
            assert_eq!(ModelKind::from_tag(kind.tag()).unwrap(), kind);
        }
        assert!(ModelKind::from_tag("quantum_lstm").is_err());
    }

    #[test]
    fn test_build_dispatches_on_kind() {
        let device = Default::default();
        let settings = ModelSettings {
            d_model: 8,
            n_heads: 2,
            ff_dim: 8,
            hidden_dim: 8,
            ..Default::default()
        };
        let model = build::<TestBackend>(&settings, 6, 6, &device);
        assert_eq!(model.kind(), ModelKind::Transformer);

        let settings = ModelSettings {
            kind: ModelKind::BaseConv,
            ..settings
        };
        let model = build::<TestBackend>(&settings, 6, 6, &device);
        assert_eq!(model.kind(), ModelKind::BaseConv);
    }

    #[test]
    fn test_predict_outputs_probabilities() {
        let device = Default::default();
        let settings = ModelSettings {
            d_model: 8,
            n_heads: 2,
            ff_dim: 8,
            hidden_dim: 8,
            ..Default::default()
        };
        let model = build::<TestBackend>(&settings, 5, 7, &device);

        let pi = Tensor::<TestBackend, 2, Int>::zeros([3, 5], &device);
        let m = Tensor::<TestBackend, 2, Int>::zeros([3, 7], &device);
        let probs = model.predict(pi, m);
        assert_eq!(probs.dims(), [3]);
        for p in probs.into_data().to_vec::<f32>().unwrap() {
            assert!((0.0..=1.0).contains(&p));
        }
    }
}
