// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer asks for "a graph" without caring where
// it comes from:
//   - OgbMagLoader  → reads the OGB raw directory layout
//   - SyntheticMag  → generates a small MAG-shaped graph in memory
//
// Both implement GraphSource, so TrainUseCase works with either.

use anyhow::Result;
use crate::domain::graph::HeteroGraph;

// ─── GraphSource ──────────────────────────────────────────────────────────────
/// Any component that can produce a validated heterogeneous graph.
pub trait GraphSource {
    /// Load (or build) the graph. Implementations validate before returning.
    fn load(&self) -> Result<HeteroGraph>;

    /// Short human-readable description for logs
    fn describe(&self) -> String;
}
