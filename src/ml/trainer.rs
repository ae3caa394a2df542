// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Full-batch training: every epoch is one forward pass over the
// whole graph and one Adam step on the training-node loss.
//
//   for run in 1..=runs:
//       fresh model + fresh Adam            (seeded with seed + run)
//       for epoch in 1..=epochs:
//           loss = train_epoch(...)           (Autodiff backend)
//           acc  = test(model.valid(), ...) (inner backend, no dropout)
//           log / csv / best checkpoint
//       per-run statistics
//   statistics over all runs
//
// Evaluation uses model.valid() on GraphTensors::inner(), so it
// records no autodiff graph and dropout is switched off.

use anyhow::{ensure, Result};
use burn::{
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::application::prepared_graph::PreparedGraph;
use crate::application::train_use_case::TrainConfig;
use crate::domain::{graph::SplitIndex, schema::GraphSchema};
use crate::infra::{
    checkpoint::{BestCheckpoint, CheckpointManager},
    metrics::{EpochMetrics, MetricsLogger},
    run_logger::RunLogger,
};
use crate::ml::{
    evaluator::{evaluate_splits, SplitAccuracy},
    model::{Rgcn, RgcnConfig},
    tensors::GraphTensors,
};

/// One optimisation step. Returns the updated model and the loss before the step.
pub fn train_epoch<B, O>(
    model:  Rgcn<B>,
    optim:  &mut O,
    graph:  &GraphTensors<B>,
    schema: &GraphSchema,
    lr:     f64,
) -> (Rgcn<B>, f64)
where
    B: AutodiffBackend,
    O: Optimizer<Rgcn<B>, B>,
{
    let loss = model.forward_loss(graph, schema);
    let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();

    let grads = loss.backward();
    let grads = GradientsParams::from_grads(grads, &model);
    (optim.step(lr, model, grads), loss_val)
}

/// Predict every target node and score the three splits.
pub fn test<B: Backend>(
    model:  &Rgcn<B>,
    graph:  &GraphTensors<B>,
    schema: &GraphSchema,
    labels: &[i64],
    split:  &SplitIndex,
) -> Result<SplitAccuracy> {
    // argmax(1) returns [N, 1]; flatten to [N]
    let y_pred: Vec<i64> = model
        .forward(graph, schema)
        .argmax(1)
        .flatten::<1>(0, 1)
        .into_data()
        .iter::<i64>()
        .collect();

    evaluate_splits(labels, &y_pred, split)
}

/// Progress line printed every `log_steps` epochs. `run` is 0-based.
pub fn epoch_line(run: usize, epoch: usize, loss: f64, acc: &SplitAccuracy) -> String {
    format!(
        "Run: {:02}, Epoch: {:02}, Loss: {:.4}, Train: {:.2}%, Valid: {:.2}% Test: {:.2}%",
        run + 1,
        epoch,
        loss,
        100.0 * acc.train,
        100.0 * acc.valid,
        100.0 * acc.test,
    )
}

pub fn run_training<B: AutodiffBackend>(
    cfg:      &TrainConfig,
    prepared: &PreparedGraph,
    device:   &B::Device,
    ckpt:     &CheckpointManager,
    metrics:  &MetricsLogger,
) -> Result<RunLogger> {
    let PreparedGraph { graph, relations, schema } = prepared;
    // mean NLL over zero nodes is NaN
    ensure!(
        !graph.split.train.is_empty(),
        "the train split of '{}' is empty, nothing to fit",
        graph.target
    );

    let tensors   = GraphTensors::<B>::new(graph, schema, relations, device)?;
    let eval_view = tensors.inner();

    let model_cfg = RgcnConfig::new(cfg.hidden_channels, schema.num_classes, cfg.num_layers)
        .with_dropout(cfg.dropout);

    let mut logger = RunLogger::new(cfg.runs);
    let mut best: Option<BestCheckpoint> = None;

    for run in 0..logger.runs() {
        // ── Fresh parameters and optimiser state for every run ────────────────
        B::seed(cfg.seed.wrapping_add(run as u64));
        let mut model: Rgcn<B> = model_cfg.init(schema, device);

        // m = β1*m + (1-β1)*g        (mean)
        // v = β2*v + (1-β2)*g²       (variance)
        // θ = θ - lr * m / (√v + ε)  (update)
        let mut optim = AdamConfig::new().with_epsilon(1e-8).init();

        tracing::info!("Run {:02}: {} epochs, lr {}", run + 1, cfg.epochs, cfg.lr);

        for epoch in 1..=cfg.epochs {
            let (next, loss) = train_epoch(model, &mut optim, &tensors, schema, cfg.lr);
            model = next;

            let model_valid = model.valid();
            let result = test(&model_valid, &eval_view, schema, &graph.labels, &graph.split)?;
            logger.add_result(run, result)?;
            metrics.log(&EpochMetrics::new(run + 1, epoch, loss, result))?;

            if cfg.log_steps > 0 && epoch % cfg.log_steps == 0 {
                println!("{}", epoch_line(run, epoch, loss, &result));
            }

            if cfg.save_best && best.map_or(true, |b| result.valid > b.valid_acc) {
                let candidate = BestCheckpoint { run: run + 1, epoch, valid_acc: result.valid };
                ckpt.save_model(&model_valid, &candidate)?;
                best = Some(candidate);
            }
        }

        if cfg.epochs > 0 {
            let summary = logger.run_summary(run)?;
            tracing::info!("Run {:02}: best validation at epoch {}", run + 1, summary.best_epoch);
            logger.print_statistics(Some(run))?;
        }
    }

    if logger.runs() > 0 && cfg.epochs > 0 {
        logger.print_statistics(None)?;
    }
    if let Some(b) = best {
        tracing::info!(
            "Best checkpoint: run {} epoch {} (valid {:.2}%) in '{}'",
            b.run,
            b.epoch,
            100.0 * b.valid_acc,
            ckpt.dir().display()
        );
    }

    Ok(logger)
}
