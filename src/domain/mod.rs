// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs and traits describing a heterogeneous graph
// benchmark: node types, relation triples, features, labels and
// the fixed train/valid/test split.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Everything here can be unit tested without a GPU.

// Typed failures for malformed or inconsistent datasets
pub mod error;

// The in-memory heterogeneous graph and its parts
pub mod graph;

// Name → index resolution used to build the model
pub mod schema;

// Core abstractions (traits) that other layers implement
pub mod traits;
