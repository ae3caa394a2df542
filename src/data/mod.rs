// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from "bytes on disk" to "relation adjacency lists",
// before any tensor is created:
//
//   OGB raw tables            SyntheticMag
//       │                         │
//       ▼                         ▼
//   OgbMagLoader ──────► HeteroGraph ◄── splitter (generated graphs only)
//                             │
//                             ▼
//                      build_relations   → transposed, reversed, symmetric
//                             │
//                             ▼
//                    Vec<RelationAdjacency>  → handed to Layer 5 (ml)

/// Reads ogbn-mag from the OGB raw directory layout
pub mod loader;

/// Seeded MAG-shaped graph generator
pub mod synthetic;

/// Shuffles target nodes into train/valid/test index lists
pub mod splitter;

/// Builds the per-relation adjacency the model aggregates over
pub mod adjacency;
