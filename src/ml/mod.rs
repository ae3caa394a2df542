// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// Everything that touches Burn tensors lives here.
//
//   tensors.rs   — the graph moved onto a device: per-type
//                  features and one mean-adjacency per relation
//
//   model.rs     — RGCN: input projections / embeddings,
//                  relational convolutions, log_softmax head
//
//   trainer.rs   — full-batch Adam loop over several runs
//
//   evaluator.rs — split accuracy (host side, no Burn)
//
// Reference: Schlichtkrull et al. (2018) Modeling Relational Data
//            with Graph Convolutional Networks

pub mod tensors;

pub mod model;

pub mod trainer;

pub mod evaluator;
