//! Transformer classifier
//!
//! The active architecture: each branch embeds its integer-encoded sequence
//! with token-and-position embeddings, runs one transformer block (multi-head
//! self-attention plus a feed-forward sublayer), and mean-pools over the
//! sequence. The pooled branch features are concatenated and fed through a
//! dense head producing a single logit.

use burn::nn::attention::{MhaInput, MultiHeadAttention, MultiHeadAttentionConfig};
use burn::nn::{
    Dropout, DropoutConfig, Embedding, EmbeddingConfig, LayerNorm, LayerNormConfig, Linear,
    LinearConfig, Relu,
};
use burn::prelude::*;

use super::VOCAB_SIZE;

/// Transformer classifier configuration
#[derive(Config, Debug)]
pub struct TransformerClassifierConfig {
    /// Length of the pi-sequence input
    pub pi_len: usize,
    /// Length of the m-sequence input
    pub m_len: usize,
    /// Embedding dimension
    #[config(default = "32")]
    pub d_model: usize,
    /// Number of attention heads
    #[config(default = "2")]
    pub n_heads: usize,
    /// Feed-forward dimension inside the block
    #[config(default = "32")]
    pub ff_dim: usize,
    /// Dense-head hidden dimension
    #[config(default = "64")]
    pub hidden_dim: usize,
    /// Dropout probability
    #[config(default = "0.1")]
    pub dropout: f64,
}

/// Token embedding plus learned position embedding.
#[derive(Module, Debug)]
pub struct TokenAndPositionEmbedding<B: Backend> {
    tokens: Embedding<B>,
    positions: Embedding<B>,
}

impl<B: Backend> TokenAndPositionEmbedding<B> {
    fn new(seq_len: usize, d_model: usize, device: &B::Device) -> Self {
        Self {
            tokens: EmbeddingConfig::new(VOCAB_SIZE, d_model).init(device),
            positions: EmbeddingConfig::new(seq_len, d_model).init(device),
        }
    }

    /// [batch, seq] integer labels -> [batch, seq, d_model]
    pub fn forward(&self, x: Tensor<B, 2, Int>) -> Tensor<B, 3> {
        let [_, seq_len] = x.dims();
        let device = x.device();

        let token_embed = self.tokens.forward(x);
        let position_ids =
            Tensor::<B, 1, Int>::arange(0..seq_len as i64, &device).reshape([1, seq_len]);
        let position_embed = self.positions.forward(position_ids);

        // Position embeddings broadcast over the batch dimension.
        token_embed + position_embed
    }
}

/// One pre-norm-free transformer block: self-attention and feed-forward
/// sublayers, each with residual connection, dropout, and layer norm.
#[derive(Module, Debug)]
pub struct TransformerBlock<B: Backend> {
    attention: MultiHeadAttention<B>,
    norm_attention: LayerNorm<B>,
    norm_feed_forward: LayerNorm<B>,
    ff_inner: Linear<B>,
    ff_outer: Linear<B>,
    dropout: Dropout,
    activation: Relu,
}

impl<B: Backend> TransformerBlock<B> {
    fn new(d_model: usize, n_heads: usize, ff_dim: usize, dropout: f64, device: &B::Device) -> Self {
        Self {
            attention: MultiHeadAttentionConfig::new(d_model, n_heads)
                .with_dropout(dropout)
                .init(device),
            norm_attention: LayerNormConfig::new(d_model).init(device),
            norm_feed_forward: LayerNormConfig::new(d_model).init(device),
            ff_inner: LinearConfig::new(d_model, ff_dim).init(device),
            ff_outer: LinearConfig::new(ff_dim, d_model).init(device),
            dropout: DropoutConfig::new(dropout).init(),
            activation: Relu::new(),
        }
    }

    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let attended = self.attention.forward(MhaInput::self_attn(x.clone())).context;
        let x = self.norm_attention.forward(x + self.dropout.forward(attended));

        let ff = self.ff_inner.forward(x.clone());
        let ff = self.activation.forward(ff);
        let ff = self.ff_outer.forward(ff);
        self.norm_feed_forward.forward(x + self.dropout.forward(ff))
    }
}

/// One input branch: embedding, transformer block, mean pooling.
#[derive(Module, Debug)]
struct EncoderBranch<B: Backend> {
    embedding: TokenAndPositionEmbedding<B>,
    block: TransformerBlock<B>,
}

impl<B: Backend> EncoderBranch<B> {
    /// [batch, seq] -> [batch, d_model]
    fn forward(&self, x: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        let x = self.embedding.forward(x);
        let x = self.block.forward(x);
        x.mean_dim(1).squeeze(1)
    }
}

/// The full two-branch transformer classifier.
#[derive(Module, Debug)]
pub struct TransformerClassifier<B: Backend> {
    pi_branch: EncoderBranch<B>,
    m_branch: EncoderBranch<B>,
    hidden: Linear<B>,
    output: Linear<B>,
    dropout: Dropout,
    activation: Relu,
}

impl TransformerClassifierConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> TransformerClassifier<B> {
        let branch = |seq_len: usize| EncoderBranch {
            embedding: TokenAndPositionEmbedding::new(seq_len, self.d_model, device),
            block: TransformerBlock::new(
                self.d_model,
                self.n_heads,
                self.ff_dim,
                self.dropout,
                device,
            ),
        };

        TransformerClassifier {
            pi_branch: branch(self.pi_len),
            m_branch: branch(self.m_len),
            hidden: LinearConfig::new(2 * self.d_model, self.hidden_dim).init(device),
            output: LinearConfig::new(self.hidden_dim, 1).init(device),
            dropout: DropoutConfig::new(self.dropout).init(),
            activation: Relu::new(),
        }
    }
}

impl<B: Backend> TransformerClassifier<B> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_forward_shape() {
        let device = Default::default();
        let model = TransformerClassifierConfig::new(10, 14)
            .with_d_model(8)
            .with_n_heads(2)
            .with_ff_dim(8)
            .with_hidden_dim(8)
            .init::<TestBackend>(&device);

        let pi = Tensor::<TestBackend, 2, Int>::zeros([4, 10], &device);
        let m = Tensor::<TestBackend, 2, Int>::zeros([4, 14], &device);
        let logits = model.forward(pi, m);

        assert_eq!(logits.dims(), [4]);
    }

    #[test]
    fn test_embedding_shape() {
        let device = Default::default();
        let embedding = TokenAndPositionEmbedding::<TestBackend>::new(6, 8, &device);
        let x = Tensor::<TestBackend, 2, Int>::zeros([2, 6], &device);
        assert_eq!(embedding.forward(x).dims(), [2, 6, 8]);
    }
}
