// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores the best model using Burn's CompactRecorder.
//
// What gets saved:
//   1. train_config.json  — the full TrainConfig (dataset source,
//                           architecture, optimiser settings)
//   2. best.json          — which run/epoch produced the best
//                           validation accuracy so far
//   3. model_best.mpk.gz  — weights of that model
//
// "Best" is across all runs: a later run only overwrites the
// weights when it beats every earlier run on validation.
//
// Why save the config separately?
//   The RGCN's parameter layout depends on the graph (one
//   embedding table per featureless node type, one Linear per
//   relation), so `evaluate` has to rebuild the same graph and
//   model before the record can be loaded into it.

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::Rgcn;

/// Where the saved weights came from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BestCheckpoint {
    /// 1-based run number
    pub run:       usize,
    /// 1-based epoch number
    pub epoch:     usize,
    pub valid_acc: f64,
}

pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create the manager and its directory (like `mkdir -p`).
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create checkpoint dir '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    /// Save model weights and the best.json pointer.
    pub fn save_model<B: Backend>(&self, model: &Rgcn<B>, best: &BestCheckpoint) -> Result<()> {
        // Recorder adds the .mpk.gz extension
        let path = self.dir.join("model_best");

        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;

        let best_path = self.dir.join("best.json");
        fs::write(&best_path, serde_json::to_string_pretty(best)?)
            .with_context(|| format!("Failed to write '{}'", best_path.display()))?;

        tracing::debug!(
            "Saved best model: run {} epoch {} (valid {:.4})",
            best.run,
            best.epoch,
            best.valid_acc
        );
        Ok(())
    }

    /// Load the saved weights into a model with the same layout.
    pub fn load_model<B: Backend>(&self, model: Rgcn<B>, device: &B::Device) -> Result<Rgcn<B>> {
        let path = self.dir.join("model_best");

        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!(
                    "Cannot load checkpoint '{}'. Train with --save-best first.",
                    path.display()
                )
            })?;

        Ok(model.load_record(record))
    }

    /// Remove the best model and its pointer left by a previous `train`.
    pub fn clear_best(&self) -> Result<()> {
        for name in ["best.json", "model_best.mpk.gz"] {
            let path = self.dir.join(name);
            if path.exists() {
                fs::remove_file(&path)
                    .with_context(|| format!("Cannot remove stale '{}'", path.display()))?;
                tracing::debug!("Removed stale '{}'", path.display());
            }
        }
        Ok(())
    }

    pub fn load_best(&self) -> Result<BestCheckpoint> {
        let path = self.dir.join("best.json");
        let json = fs::read_to_string(&path).with_context(|| {
            format!("Cannot read '{}'. Train with --save-best first.", path.display())
        })?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Must be called before training so `evaluate` can rebuild the model.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join("train_config.json");
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join("train_config.json");
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read config from '{}'. \
                 Make sure you have run 'train' before 'evaluate'.",
                path.display()
            )
        })?;
        Ok(serde_json::from_str(&json)?)
    }
}
