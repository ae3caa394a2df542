// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load the graph, build adjacency and schema  (Layer 4 / 3)
//   Step 2: Save config, drop any older best model      (Layer 6 - infra)
//   Step 3: Pick the backend and device                 (Layer 5 - ml)
//   Step 4: Run every training run                      (Layer 5 - ml)

use anyhow::Result;
use burn::backend::{Autodiff, NdArray, Wgpu};
use serde::{Deserialize, Serialize};

use crate::application::{
    compute_device::{resolve_device, wgpu_usable, ComputeDevice},
    prepared_graph::PreparedGraph,
};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::MetricsLogger,
    run_logger::RunLogger,
};
use crate::ml::trainer::run_training;

/// Where the graph comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DatasetSource {
    /// Extracted OGB ogbn-mag directory (contains raw/ and split/)
    Ogb { dir: String },
    /// Generated ogbn-mag-shaped graph
    Synthetic { seed: u64 },
}

/// Compute backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendKind {
    Wgpu,
    NdArray,
}

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training invocation. Saved as
// train_config.json so `evaluate` can rebuild the same model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub dataset:         DatasetSource,
    pub backend:         BackendKind,
    /// GPU index for the wgpu backend
    pub device:          usize,
    /// Print a progress line every this many epochs (0 = never)
    pub log_steps:       usize,
    pub num_layers:      usize,
    pub hidden_channels: usize,
    pub dropout:         f64,
    pub lr:              f64,
    pub epochs:          usize,
    pub runs:            usize,
    /// Run r (0-based) is seeded with seed + r
    pub seed:            u64,
    pub checkpoint_dir:  String,
    /// Keep the weights of the best-validation epoch across all runs
    pub save_best:       bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            dataset:         DatasetSource::Ogb { dir: "dataset/ogbn_mag".to_string() },
            backend:         BackendKind::Wgpu,
            device:          0,
            log_steps:       1,
            num_layers:      3,
            hidden_channels: 256,
            dropout:         0.5,
            lr:              0.01,
            epochs:          300,
            runs:            10,
            seed:            0,
            checkpoint_dir:  "checkpoints".to_string(),
            save_best:       false,
        }
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<RunLogger> {
        let cfg = &self.config;
        println!("{cfg:?}");

        // ── Step 1: Graph, adjacency, schema ──────────────────────────────────
        let prepared = PreparedGraph::load(&cfg.dataset)?;
        println!("{}", prepared.graph);

        // ── Step 2: Save config for evaluate ──────────────────────────────────
        let ckpt    = CheckpointManager::new(&cfg.checkpoint_dir)?;
        let metrics = MetricsLogger::new(&cfg.checkpoint_dir)?;
        ckpt.clear_best()?;
        ckpt.save_config(cfg)?;
        tracing::info!("Writing per-epoch metrics to '{}'", metrics.csv_path().display());

        // ── Steps 3-4: Backend dispatch + training runs ───────────────────────
        match resolve_device(cfg.backend, cfg.device, wgpu_usable) {
            ComputeDevice::Wgpu(device) => {
                tracing::info!("Using WGPU device: {:?}", device);
                run_training::<Autodiff<Wgpu>>(cfg, &prepared, &device, &ckpt, &metrics)
            }
            ComputeDevice::NdArray(device) => {
                tracing::info!("Using NdArray device: {:?}", device);
                run_training::<Autodiff<NdArray>>(cfg, &prepared, &device, &ckpt, &metrics)
            }
        }
    }
}
