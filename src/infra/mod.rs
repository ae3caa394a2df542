// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns used by the training workflow:
//
//   checkpoint.rs  — train_config.json, best.json and the best
//                    model's weights (Burn CompactRecorder)
//
//   metrics.rs     — one CSV row per (run, epoch) with the loss
//                    and the three split accuracies
//
//   run_logger.rs  — in-memory results of every run; prints the
//                    per-run and across-run statistics
//
// None of these know how the model works; they only persist or
// summarise what Layer 5 produces.

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Per-epoch metrics CSV logger
pub mod metrics;

/// Multi-run accuracy bookkeeping and statistics
pub mod run_logger;
