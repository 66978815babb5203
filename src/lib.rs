//! seqpair — seeded transformer experiments over paired DNA sequences
//!
//! Trains a two-branch classifier on (pi, m) sequence pairs, repeats the
//! experiment across seeds with deterministic data splits, and aggregates the
//! per-seed validation/test metrics into a results table.

pub mod config;
pub mod dataset;
pub mod encoding;
pub mod error;
pub mod experiment;
pub mod metrics;
pub mod model;
pub mod report;
pub mod training;

pub use config::{ExperimentConfig, SplitConfig, TrainingConfig};
pub use error::{Result, SeqPairError};
pub use experiment::{evaluate, run_batch, train_and_eval};
pub use metrics::{MetricSet, MetricsReport};
pub use model::{ModelKind, ModelSettings, PairClassifier};
pub use training::{Checkpointer, FitSummary, Trainer};

/// CPU backend used for evaluation and inference.
pub type DefaultBackend = burn_ndarray::NdArray<f32>;

/// Autodiff-wrapped backend used for training.
pub type DefaultAutodiffBackend = burn::backend::Autodiff<DefaultBackend>;
