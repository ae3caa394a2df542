// ============================================================
// Layer 2 — EvaluateUseCase
// ============================================================
// Reloads the best checkpoint written by `train --save-best` and
// scores it on the train / valid / test splits.
//
//   Step 1: Read train_config.json          (Layer 6 - infra)
//   Step 2: Rebuild the same graph + schema (Layer 4 / 3)
//   Step 3: Rebuild the model, load weights (Layer 5 / 6)
//   Step 4: Predict and score               (Layer 5 - ml)
//
// No autodiff here, the plain backend is enough for inference.

use anyhow::Result;
use burn::{
    backend::{NdArray, Wgpu},
    prelude::*,
};

use crate::application::{
    compute_device::{resolve_device, wgpu_usable, ComputeDevice},
    prepared_graph::PreparedGraph,
    train_use_case::{BackendKind, TrainConfig},
};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::{
    evaluator::SplitAccuracy,
    model::{Rgcn, RgcnConfig},
    tensors::GraphTensors,
    trainer::test,
};

pub struct EvaluateUseCase {
    checkpoint_dir: String,
    backend:        Option<BackendKind>,
}

impl EvaluateUseCase {
    /// `backend` overrides the one saved in the training config.
    pub fn new(checkpoint_dir: String, backend: Option<BackendKind>) -> Self {
        Self { checkpoint_dir, backend }
    }

    pub fn execute(&self) -> Result<SplitAccuracy> {
        let ckpt = CheckpointManager::new(&self.checkpoint_dir)?;
        let cfg  = ckpt.load_config()?;
        let best = ckpt.load_best()?;
        tracing::info!(
            "Evaluating run {} epoch {} (valid {:.2}% at save time)",
            best.run,
            best.epoch,
            100.0 * best.valid_acc
        );

        let prepared = PreparedGraph::load(&cfg.dataset)?;

        let backend = self.backend.unwrap_or(cfg.backend);
        let acc = match resolve_device(backend, cfg.device, wgpu_usable) {
            ComputeDevice::Wgpu(device)    => evaluate::<Wgpu>(&cfg, &prepared, &ckpt, &device)?,
            ComputeDevice::NdArray(device) => evaluate::<NdArray>(&cfg, &prepared, &ckpt, &device)?,
        };

        println!(
            "Train: {:.2}%, Valid: {:.2}% Test: {:.2}%",
            100.0 * acc.train,
            100.0 * acc.valid,
            100.0 * acc.test
        );
        Ok(acc)
    }
}

fn evaluate<B: Backend>(
    cfg:      &TrainConfig,
    prepared: &PreparedGraph,
    ckpt:     &CheckpointManager,
    device:   &B::Device,
) -> Result<SplitAccuracy> {
    let PreparedGraph { graph, relations, schema } = prepared;

    let tensors = GraphTensors::<B>::new(graph, schema, relations, device)?;
    let model: Rgcn<B> = RgcnConfig::new(cfg.hidden_channels, schema.num_classes, cfg.num_layers)
        .with_dropout(cfg.dropout)
        .init(schema, device);
    let model = ckpt.load_model(model, device)?;

    test(&model, &tensors, schema, &graph.labels, &graph.split)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::train_use_case::{DatasetSource, TrainUseCase};
    use tempfile::TempDir;

    #[test]
    fn test_evaluate_reloads_saved_best_model() {
        let dir = TempDir::new().unwrap();
        let cfg = TrainConfig {
            dataset:         DatasetSource::Synthetic { seed: 4 },
            backend:         BackendKind::NdArray,
            hidden_channels: 8,
            num_layers:      2,
            epochs:          2,
            runs:            1,
            save_best:       true,
            checkpoint_dir:  dir.path().display().to_string(),
            ..TrainConfig::default()
        };
        TrainUseCase::new(cfg).execute().unwrap();

        let acc = EvaluateUseCase::new(dir.path().display().to_string(), None)
            .execute()
            .unwrap();
        for a in acc.as_array() {
            assert!((0.0..=1.0).contains(&a));
        }
    }

    #[test]
    fn test_retrain_without_save_best_drops_old_model() {
        let dir = TempDir::new().unwrap();
        let base = TrainConfig {
            backend:         BackendKind::NdArray,
            hidden_channels: 8,
            num_layers:      2,
            epochs:          1,
            runs:            1,
            log_steps:       0,
            checkpoint_dir:  dir.path().display().to_string(),
            ..TrainConfig::default()
        };
        TrainUseCase::new(TrainConfig {
            dataset:   DatasetSource::Synthetic { seed: 4 },
            save_best: true,
            ..base.clone()
        })
        .execute()
        .unwrap();
        assert!(dir.path().join("best.json").exists());

        // second training into the same directory, different graph, nothing saved
        TrainUseCase::new(TrainConfig {
            dataset:   DatasetSource::Synthetic { seed: 99 },
            save_best: false,
            ..base
        })
        .execute()
        .unwrap();

        let res = EvaluateUseCase::new(dir.path().display().to_string(), None).execute();
        assert!(res.is_err(), "stale checkpoint was evaluated: {res:?}");
    }

    #[test]
    fn test_evaluate_without_training_fails() {
        let dir = TempDir::new().unwrap();
        let res = EvaluateUseCase::new(dir.path().display().to_string(), None).execute();
        assert!(res.is_err());
    }
}
