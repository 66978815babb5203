//! Training machinery
//!
//! The mini-batch fitting loop (Adam + binary cross-entropy, early stopping,
//! learning-rate schedule) and model checkpointing.

pub mod checkpoint;
pub mod trainer;

pub use checkpoint::{CheckpointMeta, Checkpointer};
pub use trainer::{FitSummary, Trainer};
