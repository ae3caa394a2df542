// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Workflow coordination only: each use case wires the data, ml
// and infra layers together for one CLI command. No model math
// and no file formats live here.

/// Graph + adjacency + schema, shared by every workflow
pub mod prepared_graph;

/// Backend + device id → a device that exists on this machine
pub mod compute_device;

/// The multi-run training workflow and its config
pub mod train_use_case;

/// Reload the best checkpoint and score it
pub mod evaluate_use_case;

/// Print the loaded graph and its relations
pub mod inspect_use_case;
