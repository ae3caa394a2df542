// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and routes each subcommand to its
// Layer 2 use case. No computation happens here.
//
//   train     — multi-run RGCN training on ogbn-mag
//   evaluate  — score the saved best checkpoint
//   inspect   — describe the loaded graph

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, DatasetArgs, EvaluateArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "rgcn-mag",
    version,
    about = "Full-batch RGCN node classification on OGB ogbn-mag."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => run_train(args),
            Commands::Evaluate(args) => run_evaluate(args),
            Commands::Inspect(args)  => run_inspect(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    let checkpoint_dir = args.checkpoint_dir.clone();
    TrainUseCase::new(args.into()).execute()?;

    tracing::info!("Training complete. Outputs in '{}'", checkpoint_dir);
    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    use crate::application::evaluate_use_case::EvaluateUseCase;

    EvaluateUseCase::new(args.checkpoint_dir, args.backend.map(Into::into)).execute()?;
    Ok(())
}

fn run_inspect(args: DatasetArgs) -> Result<()> {
    use crate::application::inspect_use_case::InspectUseCase;

    InspectUseCase::new(args.into()).execute()?;
    Ok(())
}
