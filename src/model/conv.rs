//! Convolutional baseline
//!
//! The original experiment's CNN baseline, kept selectable next to the
//! transformer: per branch, a small token embedding followed by two 1D
//! convolutions with same-padding and global mean pooling.

use burn::nn::conv::{Conv1d, Conv1dConfig};
use burn::nn::{
    Dropout, DropoutConfig, Embedding, EmbeddingConfig, Linear, LinearConfig, PaddingConfig1d, Relu,
};
use burn::prelude::*;

use super::VOCAB_SIZE;

/// Convolutional classifier configuration
#[derive(Config, Debug)]
pub struct ConvClassifierConfig {
    /// Length of the pi-sequence input
    pub pi_len: usize,
    /// Length of the m-sequence input
    pub m_len: usize,
    /// Convolution filters per layer
    #[config(default = "32")]
    pub filters: usize,
    /// Convolution kernel size
    #[config(default = "5")]
    pub kernel_size: usize,
    /// Dense-head hidden dimension
    #[config(default = "64")]
    pub hidden_dim: usize,
    /// Dropout probability
    #[config(default = "0.1")]
    pub dropout: f64,
}

#[derive(Module, Debug)]
struct ConvBranch<B: Backend> {
    embedding: Embedding<B>,
    conv_inner: Conv1d<B>,
    conv_outer: Conv1d<B>,
    activation: Relu,
}

impl<B: Backend> ConvBranch<B> {
    /// [batch, seq] integer labels -> [batch, filters]
    fn forward(&self, x: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        // [batch, seq, vocab] -> [batch, vocab, seq] for channel-first conv.
        let x = self.embedding.forward(x).swap_dims(1, 2);
        let x = self.activation.forward(self.conv_inner.forward(x));
        let x = self.activation.forward(self.conv_outer.forward(x));
        x.mean_dim(2).squeeze(2)
    }
}

/// Two-branch convolutional classifier.
#[derive(Module, Debug)]
pub struct ConvClassifier<B: Backend> {
    pi_branch: ConvBranch<B>,
    m_branch: ConvBranch<B>,
    hidden: Linear<B>,
    output: Linear<B>,
    dropout: Dropout,
    activation: Relu,
}

impl ConvClassifierConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> ConvClassifier<B> {
        let branch = || ConvBranch {
            embedding: EmbeddingConfig::new(VOCAB_SIZE, VOCAB_SIZE).init(device),
            conv_inner: Conv1dConfig::new(VOCAB_SIZE, self.filters, self.kernel_size)
                .with_padding(PaddingConfig1d::Same)
                .init(device),
            conv_outer: Conv1dConfig::new(self.filters, self.filters, self.kernel_size)
                .with_padding(PaddingConfig1d::Same)
                .init(device),
            activation: Relu::new(),
        };

        ConvClassifier {
            pi_branch: branch(),
            m_branch: branch(),
            hidden: LinearConfig::new(2 * self.filters, self.hidden_dim).init(device),
            output: LinearConfig::new(self.hidden_dim, 1).init(device),
            dropout: DropoutConfig::new(self.dropout).init(),
            activation: Relu::new(),
        }
    }
}

impl<B: Backend> ConvClassifier<B> {
    /// Forward pass returning one logit per sample.
    pub fn forward(&self, pi: Tensor<B, 2, Int>, m: Tensor<B, 2, Int>) -> Tensor<B, 1> {
        let pi_features = self.pi_branch.forward(pi);
        let m_features = self.m_branch.forward(m);

        let features = Tensor::cat(vec![pi_features, m_features], 1);
        let hidden = self.activation.forward(self.hidden.forward(features));
        let hidden = self.dropout.forward(hidden);
        self.output.forward(hidden).squeeze(1)
    }
}
