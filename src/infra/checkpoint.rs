// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores token classifier weights with Burn's
// CompactRecorder, plus the JSON files inference needs to rebuild
// the same model and the same tokenizer windows.
//
//   checkpoints/
//     model_epoch_1.mpk      ← weights after epoch 1
//     model_epoch_2.mpk
//     ...
//     latest_epoch.json      ← number of the latest epoch
//     train_config.json      ← architecture + window size + stride
//     tokenizer.json         ← written by TokenizerStore
//     metrics.csv            ← written by MetricsLogger
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
    tensor::backend::AutodiffBackend,
};
use crate::application::train_use_case::TrainConfig;
use crate::ml::model::TokenClassifierModel;

/// Manages saving and loading of model checkpoints.
/// All files are stored in the configured directory.
pub struct CheckpointManager {
    /// Path to the directory where checkpoints are stored
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a new CheckpointManager. The directory is created on first save.
    pub fn new(dir: impl Into<String>) -> Self {
        Self { dir: PathBuf::from(dir.into()) }
    }

    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create checkpoint dir '{}'", self.dir.display()))
    }

    /// Save model weights for a given epoch and move the latest pointer.
    pub fn save_model<B: AutodiffBackend>(
        &self,
        model: &TokenClassifierModel<B>,
        epoch: usize,
    ) -> Result<()> {
        self.ensure_dir()?;
        // The recorder adds the file extension
        let path = self.dir.join(format!("model_epoch_{epoch}"));

        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| {
                format!("Failed to save checkpoint to '{}'", path.display())
            })?;

        let latest_path = self.dir.join("latest_epoch.json");
        fs::write(&latest_path, serde_json::to_string(&epoch)?)
            .with_context(|| "Failed to write latest_epoch.json")?;

        tracing::debug!("Saved checkpoint: epoch {}", epoch);
        Ok(())
    }

    /// Load model weights from the latest saved checkpoint.
    /// `model` must have the architecture the checkpoint was saved with.
    pub fn load_model<B: Backend>(
        &self,
        model:  TokenClassifierModel<B>,
        device: &B::Device,
    ) -> Result<TokenClassifierModel<B>> {
        let epoch = self.latest_epoch()?;
        let path  = self.dir.join(format!("model_epoch_{epoch}"));

        tracing::info!("Loading checkpoint from epoch {}", epoch);

        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load checkpoint '{}'. Have you trained the model first?",
                    path.display())
            })?;

        Ok(model.load_record(record))
    }

    /// Save the training configuration to JSON.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        self.ensure_dir()?;
        let path = self.dir.join("train_config.json");

        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| {
                format!("Cannot write config to '{}'", path.display())
            })?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    /// Load the training configuration written by `save_config`.
    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join("train_config.json");

        let json = fs::read_to_string(&path)
            .with_context(|| {
                format!(
                    "Cannot read config from '{}'. \
                     Make sure you have run 'train' before 'predict'.",
                    path.display()
                )
            })?;

        serde_json::from_str(&json)
            .with_context(|| format!("Malformed config in '{}'", path.display()))
    }

    /// Like `load_config`, but `None` when no config was ever saved.
    /// A config that exists but cannot be read is still an error.
    pub fn load_config_if_present(&self) -> Result<Option<TrainConfig>> {
        if !self.dir.join("train_config.json").exists() {
            return Ok(None);
        }
        self.load_config().map(Some)
    }

    /// Read latest_epoch.json and return the epoch number.
    /// Returns an error if training hasn't been run yet.
    fn latest_epoch(&self) -> Result<usize> {
        let path = self.dir.join("latest_epoch.json");

        let s = fs::read_to_string(&path)
            .with_context(|| {
                "Cannot find 'latest_epoch.json'. \
                 Have you run 'train' first?"
            })?;

        Ok(serde_json::from_str::<usize>(&s)?)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_round_trip() {
        let dir  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path().join("ckpt").to_string_lossy());

        let cfg = TrainConfig { max_seq_len: 128, stride: 32, ..TrainConfig::default() };
        ckpt.save_config(&cfg).unwrap();

        let loaded = ckpt.load_config().unwrap();
        assert_eq!(loaded.max_seq_len, 128);
        assert_eq!(loaded.stride, 32);
    }

    #[test]
    fn test_missing_config_is_an_error() {
        let dir  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path().to_string_lossy());
        assert!(ckpt.load_config().is_err());
    }

    #[test]
    fn test_absent_config_is_none() {
        let dir  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path().to_string_lossy());
        assert!(ckpt.load_config_if_present().unwrap().is_none());
    }

    #[test]
    fn test_malformed_config_is_not_treated_as_absent() {
        let dir  = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("train_config.json"), "{ not json").unwrap();
        let ckpt = CheckpointManager::new(dir.path().to_string_lossy());

        let err = ckpt.load_config_if_present().unwrap_err();
        assert!(format!("{err:#}").contains("Malformed config"));
    }

    #[test]
    fn test_present_config_is_loaded() {
        let dir  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path().to_string_lossy());
        ckpt.save_config(&TrainConfig { stride: 16, ..TrainConfig::default() }).unwrap();

        let cfg = ckpt.load_config_if_present().unwrap().unwrap();
        assert_eq!(cfg.stride, 16);
    }
}
