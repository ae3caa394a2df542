// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Three subcommands: `train`, `evaluate` and `inspect`.
// The train flags and defaults follow the reference ogbn-mag
// RGCN script (--device, --log-steps, --num-layers, ...).

use clap::{Args, Subcommand, ValueEnum};

use crate::application::train_use_case::{BackendKind, DatasetSource, TrainConfig};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the RGCN on ogbn-mag over several runs
    Train(TrainArgs),

    /// Score the best checkpoint saved by `train --save-best`
    Evaluate(EvaluateArgs),

    /// Print node counts, splits and relations of a graph
    Inspect(DatasetArgs),
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendArg {
    Wgpu,
    Ndarray,
}

impl From<BackendArg> for BackendKind {
    fn from(b: BackendArg) -> Self {
        match b {
            BackendArg::Wgpu    => BackendKind::Wgpu,
            BackendArg::Ndarray => BackendKind::NdArray,
        }
    }
}

/// Which graph to load
#[derive(Args, Debug, Clone)]
pub struct DatasetArgs {
    /// Extracted ogbn-mag directory (with raw/ and split/ inside)
    #[arg(long, default_value = "dataset/ogbn_mag")]
    pub dataset_dir: String,

    /// Use a generated ogbn-mag-shaped graph instead, seeded with this value
    #[arg(long, value_name = "SEED")]
    pub synthetic: Option<u64>,
}

impl From<DatasetArgs> for DatasetSource {
    fn from(a: DatasetArgs) -> Self {
        match a.synthetic {
            Some(seed) => DatasetSource::Synthetic { seed },
            None       => DatasetSource::Ogb { dir: a.dataset_dir },
        }
    }
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,

    #[arg(long, value_enum, default_value_t = BackendArg::Wgpu)]
    pub backend: BackendArg,

    /// GPU index (wgpu backend only)
    #[arg(long, default_value_t = 0)]
    pub device: usize,

    /// Print progress every N epochs
    #[arg(long, default_value_t = 1)]
    pub log_steps: usize,

    #[arg(long, default_value_t = 3)]
    pub num_layers: usize,

    #[arg(long, default_value_t = 256)]
    pub hidden_channels: usize,

    #[arg(long, default_value_t = 0.5)]
    pub dropout: f64,

    #[arg(long, default_value_t = 0.01)]
    pub lr: f64,

    #[arg(long, default_value_t = 300)]
    pub epochs: usize,

    /// Independent runs, each from a fresh initialisation
    #[arg(long, default_value_t = 10)]
    pub runs: usize,

    /// Base seed; run r uses seed + r
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Where train_config.json, metrics.csv and checkpoints go
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Save the weights of the best validation epoch
    #[arg(long)]
    pub save_best: bool,
}

/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            dataset:         a.dataset.into(),
            backend:         a.backend.into(),
            device:          a.device,
            log_steps:       a.log_steps,
            num_layers:      a.num_layers,
            hidden_channels: a.hidden_channels,
            dropout:         a.dropout,
            lr:              a.lr,
            epochs:          a.epochs,
            runs:            a.runs,
            seed:            a.seed,
            checkpoint_dir:  a.checkpoint_dir,
            save_best:       a.save_best,
        }
    }
}

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Directory written by `train`
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Override the backend stored in the training config
    #[arg(long, value_enum)]
    pub backend: Option<BackendArg>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    fn train_config(args: &[&str]) -> TrainConfig {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Train(a) => a.into(),
            other => panic!("expected train, got {other:?}"),
        }
    }

    #[test]
    fn test_train_defaults_match_config_defaults() {
        let cfg = train_config(&["rgcn-mag", "train"]);
        let def = TrainConfig::default();
        assert_eq!(cfg.dataset, def.dataset);
        assert_eq!(cfg.backend, def.backend);
        assert_eq!(cfg.num_layers, def.num_layers);
        assert_eq!(cfg.hidden_channels, def.hidden_channels);
        assert_eq!(cfg.dropout, def.dropout);
        assert_eq!(cfg.lr, def.lr);
        assert_eq!(cfg.epochs, def.epochs);
        assert_eq!(cfg.runs, def.runs);
        assert!(!cfg.save_best);
    }

    #[test]
    fn test_train_flags() {
        let cfg = train_config(&[
            "rgcn-mag", "train",
            "--synthetic", "7",
            "--backend", "ndarray",
            "--num-layers", "2",
            "--hidden-channels", "64",
            "--runs", "1",
            "--save-best",
        ]);
        assert_eq!(cfg.dataset, DatasetSource::Synthetic { seed: 7 });
        assert_eq!(cfg.backend, BackendKind::NdArray);
        assert_eq!(cfg.num_layers, 2);
        assert_eq!(cfg.hidden_channels, 64);
        assert_eq!(cfg.runs, 1);
        assert!(cfg.save_best);
    }

    #[test]
    fn test_unknown_backend_rejected() {
        assert!(Cli::try_parse_from(["rgcn-mag", "train", "--backend", "cuda"]).is_err());
    }
}
