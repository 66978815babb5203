//! Training loop
//!
//! Mini-batch gradient descent with Adam and binary cross-entropy on logits.
//! Training halts once validation loss fails to improve for `patience`
//! consecutive epochs; the epoch cap is a safety bound, not the expected
//! stopping point. Final weights are the last epoch's.

use burn::module::AutodiffModule;
use burn::nn::loss::BinaryCrossEntropyLossConfig;
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::tensor::backend::AutodiffBackend;
use burn::tensor::ElementConversion;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::info;

use crate::config::TrainingConfig;
use crate::dataset::EncodedSet;
use crate::error::Result;
use crate::model::PairClassifier;

/// What the fitting loop did.
#[derive(Debug, Clone, Default)]
pub struct FitSummary {
    /// Epochs actually run
    pub epochs: usize,
    /// Best validation loss seen
    pub best_val_loss: f32,
    /// Whether early stopping fired before the epoch cap
    pub stopped_early: bool,
}

/// Fits a model against train data with validation monitoring.
pub struct Trainer {
    config: TrainingConfig,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    /// Train `model`, shuffling the training set each epoch with an rng
    /// derived from `seed` so a whole run is reproducible on a fixed backend.
    pub fn fit<B: AutodiffBackend>(
        &self,
        mut model: PairClassifier<B>,
        train: &EncodedSet,
        validation: &EncodedSet,
        seed: u64,
        device: &B::Device,
    ) -> Result<(PairClassifier<B>, FitSummary)> {
        let loss_fn = BinaryCrossEntropyLossConfig::new()
            .with_logits(true)
            .init::<B>(device);
        let valid_loss_fn = BinaryCrossEntropyLossConfig::new()
            .with_logits(true)
            .init::<B::InnerBackend>(device);
        let mut optim = AdamConfig::new().init();
        let mut shuffle_rng = StdRng::seed_from_u64(seed);

        let mut order: Vec<usize> = (0..train.len()).collect();
        let mut best_val_loss = f32::INFINITY;
        let mut epochs_without_improvement = 0;
        let mut summary = FitSummary::default();

        for epoch in 0..self.config.max_epochs {
            let lr = self.config.learning_rate(epoch);
            order.shuffle(&mut shuffle_rng);

            let mut train_loss_sum = 0.0f32;
            let mut batches = 0usize;
            for chunk in order.chunks(self.config.batch_size) {
                let (pi, m, _, targets) = train.batch::<B>(chunk, device);
                let logits = model.forward(pi, m);
                let loss = loss_fn.forward(logits, targets);
                train_loss_sum += loss.clone().into_scalar().elem::<f32>();
                batches += 1;

                let grads = GradientsParams::from_grads(loss.backward(), &model);
                model = optim.step(lr, model, grads);
            }
            let train_loss = train_loss_sum / batches.max(1) as f32;

            // Validation monitoring on the inference module (dropout off).
            let valid_model = model.valid();
            let (pi, m, _, targets) = validation.tensors::<B::InnerBackend>(device);
            let val_loss: f32 = valid_loss_fn
                .forward(valid_model.forward(pi, m), targets)
                .into_scalar()
                .elem();

            info!(
                "Epoch {}/{}: train_loss={:.4}, val_loss={:.4}, lr={:.6}",
                epoch + 1,
                self.config.max_epochs,
                train_loss,
                val_loss,
                lr
            );

            summary.epochs = epoch + 1;
            if val_loss < best_val_loss {
                best_val_loss = val_loss;
                epochs_without_improvement = 0;
            } else {
                epochs_without_improvement += 1;
                if epochs_without_improvement >= self.config.patience {
                    info!(
                        "Early stopping at epoch {} (no val_loss improvement for {} epochs)",
                        epoch + 1,
                        self.config.patience
                    );
                    summary.stopped_early = true;
                    break;
                }
            }
        }

        summary.best_val_loss = best_val_loss;
        Ok((model, summary))
    }
}
