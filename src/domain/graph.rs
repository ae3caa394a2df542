// ============================================================
// Layer 3 — Heterogeneous Graph Domain Types
// ============================================================
// A heterogeneous graph has several node types (paper, author,
// institution, field_of_study) and several relation types, each
// written as a triple (source type, relation, destination type):
//
//   (author, affiliated_with, institution)
//   (author, writes,          paper)
//   (paper,  cites,           paper)
//   (paper,  has_topic,       field_of_study)
//
// Only some node types carry input features (papers do, the rest
// do not). Only the target type carries labels and a split.
//
// BTreeMap is used instead of HashMap so that iteration order is
// stable — the model's parameter layout depends on that order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::domain::error::DatasetError;

// ─── EdgeType ─────────────────────────────────────────────────────────────────
/// A relation triple of node-type names.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeType {
    pub src: String,
    pub rel: String,
    pub dst: String,
}

impl EdgeType {
    pub fn new(src: impl Into<String>, rel: impl Into<String>, dst: impl Into<String>) -> Self {
        Self { src: src.into(), rel: rel.into(), dst: dst.into() }
    }

    /// The same relation read backwards: (dst, "to", src)
    pub fn reversed(&self) -> Self {
        Self::new(self.dst.clone(), "to", self.src.clone())
    }

    /// True when both endpoints have the same node type (e.g. paper cites paper)
    pub fn is_self_relation(&self) -> bool {
        self.src == self.dst
    }
}

/// `src_rel_dst` — stable string key for a relation
impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.src, self.rel, self.dst)
    }
}

// ─── NodeFeatures ─────────────────────────────────────────────────────────────
/// Dense row-major feature matrix: `num_nodes × dim` values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeFeatures {
    pub dim:    usize,
    pub values: Vec<f32>,
}

impl NodeFeatures {
    pub fn new(dim: usize, values: Vec<f32>) -> Self {
        Self { dim, values }
    }
}

// ─── SplitIndex ───────────────────────────────────────────────────────────────
/// Indices of target nodes in each evaluation split.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitIndex {
    pub train: Vec<usize>,
    pub valid: Vec<usize>,
    pub test:  Vec<usize>,
}

impl SplitIndex {
    pub fn new(train: Vec<usize>, valid: Vec<usize>, test: Vec<usize>) -> Self {
        Self { train, valid, test }
    }

    /// (name, indices) for every split, in reporting order
    pub fn named(&self) -> [(&'static str, &[usize]); 3] {
        [
            ("train", self.train.as_slice()),
            ("valid", self.valid.as_slice()),
            ("test",  self.test.as_slice()),
        ]
    }
}

// ─── HeteroGraph ──────────────────────────────────────────────────────────────
/// A fully loaded node-classification benchmark.
#[derive(Debug, Clone)]
pub struct HeteroGraph {
    /// Node type → number of nodes of that type
    pub num_nodes: BTreeMap<String, usize>,

    /// Input features, only for types that have them
    pub features: BTreeMap<String, NodeFeatures>,

    /// Relation → list of (source index, destination index)
    pub edges: BTreeMap<EdgeType, Vec<(usize, usize)>>,

    /// The node type being classified
    pub target: String,

    /// One class id per target node
    pub labels: Vec<i64>,

    pub num_classes: usize,

    pub split: SplitIndex,
}

impl HeteroGraph {
    /// Number of nodes of a type, or 0 if the type is unknown
    pub fn count(&self, node_type: &str) -> usize {
        self.num_nodes.get(node_type).copied().unwrap_or(0)
    }

    pub fn num_edges(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    /// Check every size and index relation the rest of the pipeline relies on.
    pub fn validate(&self) -> Result<(), DatasetError> {
        let target_count = self.num_nodes.get(&self.target).copied().ok_or_else(|| {
            DatasetError::UnknownNodeType { node_type: self.target.clone() }
        })?;

        for (node_type, feats) in &self.features {
            let expected = self.num_nodes.get(node_type).copied().ok_or_else(|| {
                DatasetError::UnknownNodeType { node_type: node_type.clone() }
            })?;
            if feats.dim == 0 || feats.values.len() != expected * feats.dim {
                return Err(DatasetError::SizeMismatch {
                    what:     format!("features of '{node_type}'"),
                    expected: expected * feats.dim,
                    found:    feats.values.len(),
                });
            }
        }

        if self.labels.len() != target_count {
            return Err(DatasetError::SizeMismatch {
                what:     format!("labels of '{}'", self.target),
                expected: target_count,
                found:    self.labels.len(),
            });
        }
        if let Some(&bad) = self
            .labels
            .iter()
            .find(|&&y| y < 0 || y as usize >= self.num_classes)
        {
            return Err(DatasetError::IndexOutOfRange {
                what:  "label".to_string(),
                index: bad,
                bound: self.num_classes,
            });
        }

        for (edge_type, pairs) in &self.edges {
            let num_src = self.num_nodes.get(&edge_type.src).copied().ok_or_else(|| {
                DatasetError::UnknownNodeType { node_type: edge_type.src.clone() }
            })?;
            let num_dst = self.num_nodes.get(&edge_type.dst).copied().ok_or_else(|| {
                DatasetError::UnknownNodeType { node_type: edge_type.dst.clone() }
            })?;
            for &(s, d) in pairs {
                if s >= num_src {
                    return Err(DatasetError::IndexOutOfRange {
                        what:  format!("source of '{edge_type}'"),
                        index: s as i64,
                        bound: num_src,
                    });
                }
                if d >= num_dst {
                    return Err(DatasetError::IndexOutOfRange {
                        what:  format!("destination of '{edge_type}'"),
                        index: d as i64,
                        bound: num_dst,
                    });
                }
            }
        }

        for (name, idx) in self.split.named() {
            if let Some(&bad) = idx.iter().find(|&&i| i >= target_count) {
                return Err(DatasetError::IndexOutOfRange {
                    what:  format!("{name} split"),
                    index: bad as i64,
                    bound: target_count,
                });
            }
        }

        Ok(())
    }
}

/// One-screen summary: node counts, feature widths, edge counts, split sizes
impl fmt::Display for HeteroGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "HeteroGraph(target={}, num_classes={})", self.target, self.num_classes)?;
        writeln!(f, "  nodes:")?;
        for (node_type, n) in &self.num_nodes {
            match self.features.get(node_type) {
                Some(feats) => writeln!(f, "    {node_type:<16} {n:>9}  x=[{n}, {}]", feats.dim)?,
                None        => writeln!(f, "    {node_type:<16} {n:>9}")?,
            }
        }
        writeln!(f, "  edges:")?;
        for (edge_type, pairs) in &self.edges {
            writeln!(f, "    {:<40} {:>9}", edge_type.to_string(), pairs.len())?;
        }
        write!(
            f,
            "  split: train={} valid={} test={}",
            self.split.train.len(),
            self.split.valid.len(),
            self.split.test.len()
        )
    }
}
