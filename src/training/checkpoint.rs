//! Model checkpointing
//!
//! Weights go through burn's named-mpk recorder; a JSON sidecar records the
//! architecture tag, its hyperparameters, and the input lengths so a
//! checkpoint can be rebuilt without the original call site. The tag is
//! resolved through the `ModelKind` registry at load time and fails closed on
//! anything unknown.

use std::fs;
use std::path::{Path, PathBuf};

use burn::module::Module;
use burn::prelude::*;
use burn::record::{FullPrecisionSettings, NamedMpkFileRecorder};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, SeqPairError};
use crate::model::{self, ModelKind, ModelSettings, PairClassifier};

/// Sidecar metadata stored next to the weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointMeta {
    /// Architecture tag, resolved via [`ModelKind::from_tag`]
    pub model: String,
    pub pi_len: usize,
    pub m_len: usize,
    pub settings: ModelSettings,
    pub created_at: DateTime<Utc>,
}

/// Saves and loads model checkpoints under one directory.
pub struct Checkpointer {
    dir: PathBuf,
}

impl Checkpointer {
    /// Create a checkpointer, creating the directory if needed.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    // The recorder appends its own `.mpk` extension to this base path.
    fn base_path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    pub fn weights_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.mpk"))
    }

    fn meta_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.weights_path(name).exists() && self.meta_path(name).exists()
    }

    /// Persist weights and sidecar for a fitted model.
    pub fn save<B: Backend>(
        &self,
        model: &PairClassifier<B>,
        name: &str,
        settings: &ModelSettings,
        pi_len: usize,
        m_len: usize,
    ) -> Result<PathBuf> {
        let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
        model.clone().save_file(self.base_path(name), &recorder)?;

        let meta = CheckpointMeta {
            model: model.kind().tag().to_string(),
            pi_len,
            m_len,
            settings: settings.clone(),
            created_at: Utc::now(),
        };
        fs::write(self.meta_path(name), serde_json::to_string_pretty(&meta)?)?;

        let path = self.weights_path(name);
        info!("Saved checkpoint to {}", path.display());
        Ok(path)
    }

    /// Load a checkpointed model read-only.
    ///
    /// The sidecar's architecture tag is resolved first; an unknown tag is a
    /// fatal `UnknownModelKind` error before any weights are touched.
    pub fn load<B: Backend>(&self, name: &str, device: &B::Device) -> Result<PairClassifier<B>> {
        let meta_path = self.meta_path(name);
        let raw = fs::read_to_string(&meta_path).map_err(|e| {
            SeqPairError::Checkpoint(format!(
                "missing sidecar {}: {e}",
                meta_path.display()
            ))
        })?;

        let value: serde_json::Value = serde_json::from_str(&raw)?;
        let tag = value
            .get("model")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                SeqPairError::Checkpoint(format!(
                    "sidecar {} has no model tag",
                    meta_path.display()
                ))
            })?;
        let kind = ModelKind::from_tag(tag)?;
        let meta: CheckpointMeta = serde_json::from_value(value)?;

        let settings = ModelSettings {
            kind,
            ..meta.settings
        };
        let model = model::build::<B>(&settings, meta.pi_len, meta.m_len, device);

        let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
        let model = model.load_file(self.base_path(name), &recorder, device)?;
        Ok(model)
    }
}
