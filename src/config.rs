use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::model::ModelSettings;

/// Main configuration structure.
///
/// Replaces the constants that used to be buried in the experiment script:
/// every knob the runner or batch driver depends on is a named field with a
/// documented default.
#[derive(Debug, Clone, Deserialize)]
pub struct ExperimentConfig {
    /// Directory holding the raw paired-sequence dataset (`*.tsv`)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Directory for model checkpoints
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,
    /// Directory for the results table
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Number of seeds the batch driver sweeps (seeds 0..seed_count)
    #[serde(default = "default_seed_count")]
    pub seed_count: u64,
    #[serde(default)]
    pub split: SplitConfig,
    #[serde(default)]
    pub training: TrainingConfig,
    #[serde(default)]
    pub model: ModelSettings,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data/raw")
}

fn default_model_dir() -> PathBuf {
    PathBuf::from("./models")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./outputs")
}

fn default_seed_count() -> u64 {
    30
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            model_dir: default_model_dir(),
            output_dir: default_output_dir(),
            seed_count: default_seed_count(),
            split: SplitConfig::default(),
            training: TrainingConfig::default(),
            model: ModelSettings::default(),
        }
    }
}

/// Train/validation/test partition fractions.
///
/// The test fraction is the remainder; the three parts are disjoint and
/// together cover the dataset.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Fraction of samples assigned to the training partition
    pub train_fraction: f64,
    /// Fraction of samples assigned to the validation partition
    pub validation_fraction: f64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            train_fraction: 0.8,
            validation_fraction: 0.1,
        }
    }
}

/// Training-loop hyperparameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Mini-batch size
    pub batch_size: usize,
    /// Epoch cap; a safety bound, early stopping is the expected exit
    pub max_epochs: usize,
    /// Early-stopping patience on validation loss, in epochs
    pub patience: usize,
    /// Base learning rate for epochs 0..10; decayed afterwards
    pub base_lr: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            batch_size: 512,
            max_epochs: 1000,
            patience: 5,
            base_lr: 1e-3,
        }
    }
}

impl TrainingConfig {
    /// Learning rate for a given epoch: flat for the first 10 epochs, then
    /// exponential decay by 0.1^(epoch/10).
    pub fn learning_rate(&self, epoch: usize) -> f64 {
        if epoch < 10 {
            self.base_lr
        } else {
            self.base_lr * 0.1f64.powf(epoch as f64 / 10.0)
        }
    }
}

impl ExperimentConfig {
    /// Load configuration from an optional TOML file, with `SEQPAIR_*`
    /// environment variables taking precedence (e.g.
    /// `SEQPAIR_TRAINING__BATCH_SIZE=256`). Without a file, defaults
    /// reproduce the original experiment constants.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        } else {
            builder = builder.add_source(File::with_name("seqpair").required(false));
        }
        let settings = builder
            .add_source(Environment::with_prefix("SEQPAIR").separator("__"))
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_original_constants() {
        let cfg = ExperimentConfig::default();
        assert_eq!(cfg.training.batch_size, 512);
        assert_eq!(cfg.training.max_epochs, 1000);
        assert_eq!(cfg.training.patience, 5);
        assert_eq!(cfg.seed_count, 30);
        assert!((cfg.split.train_fraction - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_learning_rate_schedule() {
        let cfg = TrainingConfig::default();
        for epoch in 0..10 {
            assert!((cfg.learning_rate(epoch) - 1e-3).abs() < 1e-12);
        }
        // epoch 10: 1e-3 * 0.1^1 = 1e-4
        assert!((cfg.learning_rate(10) - 1e-4).abs() < 1e-12);
        // epoch 20: 1e-3 * 0.1^2 = 1e-5
        assert!((cfg.learning_rate(20) - 1e-5).abs() < 1e-12);
        // schedule is monotonically non-increasing
        assert!(cfg.learning_rate(15) < cfg.learning_rate(10));
    }
}
