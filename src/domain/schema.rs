// ============================================================
// Layer 3 — Graph Schema
// ============================================================
// The model stores its per-type and per-relation layers in Vecs,
// not maps, so every node type and relation needs a fixed index.
// GraphSchema is that index: built once from the graph and the
// relation list, then shared by the tensor builder and the model.
//
//   node_types: ["author", "field_of_study", "institution", "paper"]
//                   0            1                 2            3
//   relations:  [(author_writes_paper, 0 → 3), (paper_to_author, 3 → 0), ...]

use serde::{Deserialize, Serialize};

use crate::domain::error::DatasetError;
use crate::domain::graph::{EdgeType, HeteroGraph};

/// One relation with both endpoint types resolved to indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationSlot {
    pub edge_type: EdgeType,
    pub src:       usize,
    pub dst:       usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSchema {
    /// Node type names in sorted order
    pub node_types:   Vec<String>,
    /// Node count per type, parallel to `node_types`
    pub num_nodes:    Vec<usize>,
    /// Input feature width per type; None for featureless types
    pub feature_dims: Vec<Option<usize>>,
    /// Relations in aggregation order
    pub relations:    Vec<RelationSlot>,
    /// Index of the classified node type
    pub target:       usize,
    pub num_classes:  usize,
}

impl GraphSchema {
    pub fn new(graph: &HeteroGraph, relations: &[EdgeType]) -> Result<Self, DatasetError> {
        let node_types: Vec<String> = graph.num_nodes.keys().cloned().collect();
        let num_nodes = graph.num_nodes.values().copied().collect();
        let feature_dims = node_types
            .iter()
            .map(|t| graph.features.get(t).map(|f| f.dim))
            .collect();

        let index_of = |name: &str| -> Result<usize, DatasetError> {
            node_types
                .iter()
                .position(|t| t == name)
                .ok_or_else(|| DatasetError::UnknownNodeType { node_type: name.to_string() })
        };

        let relations = relations
            .iter()
            .map(|edge_type| {
                Ok(RelationSlot {
                    src:       index_of(&edge_type.src)?,
                    dst:       index_of(&edge_type.dst)?,
                    edge_type: edge_type.clone(),
                })
            })
            .collect::<Result<Vec<_>, DatasetError>>()?;

        let target = index_of(&graph.target)?;

        Ok(Self {
            node_types,
            num_nodes,
            feature_dims,
            relations,
            target,
            num_classes: graph.num_classes,
        })
    }

    pub fn num_node_types(&self) -> usize {
        self.node_types.len()
    }

    /// Indices of every relation whose destination is `node_type`
    pub fn relations_into(&self, node_type: usize) -> Vec<usize> {
        self.relations
            .iter()
            .enumerate()
            .filter(|(_, r)| r.dst == node_type)
            .map(|(i, _)| i)
            .collect()
    }
}
