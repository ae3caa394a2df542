// ============================================================
// Layer 5 — Graph Tensors
// ============================================================
// Converts a HeteroGraph plus its relation list into device
// tensors, once, before training starts. Training is full-batch:
// every epoch sees the whole graph, so there is no DataLoader.
//
// Mean aggregation without a sparse matrix type:
//
//   For one relation with E edges (src_e → dst_e), and source
//   node states x: [num_src, C]
//
//     msgs = x.select(0, src)        [E, C]   gather source rows
//     msgs = msgs * w                [E, C]   w_e = 1 / deg(dst_e)
//     out  = zeros[num_dst, C]
//              .select_assign(0, dst, msgs)   scatter-add by dst
//
//   which is exactly adjᵀ · x with mean reduction. Both select and
//   select_assign are differentiable, so gradients flow back into
//   x (and into the learnable embeddings of featureless types).

use anyhow::{ensure, Result};
use burn::{prelude::*, tensor::backend::AutodiffBackend};

use crate::data::adjacency::RelationAdjacency;
use crate::domain::graph::HeteroGraph;
use crate::domain::schema::GraphSchema;

// ─── MeanAdjacency ────────────────────────────────────────────────────────────
/// One relation's adjacency on the device.
#[derive(Debug, Clone)]
pub struct MeanAdjacency<B: Backend> {
    /// Source node of each edge — shape [E]
    pub src:     Tensor<B, 1, Int>,
    /// Destination node of each edge — shape [E]
    pub dst:     Tensor<B, 1, Int>,
    /// 1 / in_degree(dst) per edge — shape [E, 1]
    pub weight:  Tensor<B, 2>,
    pub num_dst: usize,
    pub num_edges: usize,
}

impl<B: Backend> MeanAdjacency<B> {
    pub fn from_relation(rel: &RelationAdjacency, device: &B::Device) -> Self {
        let src: Vec<i64> = rel.src.iter().map(|&i| i as i64).collect();
        let dst: Vec<i64> = rel.dst.iter().map(|&i| i as i64).collect();
        let num_edges = src.len();

        Self {
            src:     Tensor::<B, 1, Int>::from_ints(src.as_slice(), device),
            dst:     Tensor::<B, 1, Int>::from_ints(dst.as_slice(), device),
            weight:  Tensor::<B, 1>::from_floats(rel.mean_weights().as_slice(), device)
                .reshape([num_edges, 1]),
            num_dst: rel.num_dst,
            num_edges,
        }
    }

    /// Mean of source states over each destination's neighbours.
    /// x: [num_src, C] → [num_dst, C]
    pub fn aggregate(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        let [_, channels] = x.dims();
        let zeros = Tensor::<B, 2>::zeros([self.num_dst, channels], &x.device());
        if self.num_edges == 0 {
            return zeros;
        }
        let msgs = x.select(0, self.src.clone()) * self.weight.clone();
        zeros.select_assign(0, self.dst.clone(), msgs)
    }
}

// ─── GraphTensors ─────────────────────────────────────────────────────────────
/// The whole graph on one device, indexed by the GraphSchema.
#[derive(Debug, Clone)]
pub struct GraphTensors<B: Backend> {
    /// Input features per node type; None for featureless types
    pub x:            Vec<Option<Tensor<B, 2>>>,
    /// One adjacency per schema relation, same order
    pub adjs:         Vec<MeanAdjacency<B>>,
    /// Training node indices of the target type — shape [T]
    pub train_idx:    Tensor<B, 1, Int>,
    /// Labels of the training nodes — shape [T]
    pub train_labels: Tensor<B, 1, Int>,
}

impl<B: Backend> GraphTensors<B> {
    pub fn new(
        graph:     &HeteroGraph,
        schema:    &GraphSchema,
        relations: &[RelationAdjacency],
        device:    &B::Device,
    ) -> Result<Self> {
        ensure!(
            relations.len() == schema.relations.len(),
            "schema has {} relations but {} adjacencies were given",
            schema.relations.len(),
            relations.len()
        );

        let x = schema
            .node_types
            .iter()
            .zip(&schema.num_nodes)
            .map(|(node_type, &n)| {
                graph.features.get(node_type).map(|f| {
                    Tensor::<B, 1>::from_floats(f.values.as_slice(), device).reshape([n, f.dim])
                })
            })
            .collect();

        let adjs = relations
            .iter()
            .map(|rel| MeanAdjacency::from_relation(rel, device))
            .collect();

        let train: Vec<i64>  = graph.split.train.iter().map(|&i| i as i64).collect();
        let labels: Vec<i64> = graph.split.train.iter().map(|&i| graph.labels[i]).collect();

        tracing::debug!("Moved graph to device: {} relations, {} training nodes", relations.len(), train.len());

        Ok(Self {
            x,
            adjs,
            train_idx:    Tensor::<B, 1, Int>::from_ints(train.as_slice(), device),
            train_labels: Tensor::<B, 1, Int>::from_ints(labels.as_slice(), device),
        })
    }
}

impl<B: AutodiffBackend> GraphTensors<B> {
    /// The same tensors on the inner (non-autodiff) backend.
    /// Used for evaluation: no graph recording, no dropout.
    pub fn inner(&self) -> GraphTensors<B::InnerBackend> {
        GraphTensors {
            x: self.x.iter().map(|t| t.clone().map(Tensor::inner)).collect(),
            adjs: self
                .adjs
                .iter()
                .map(|a| MeanAdjacency {
                    src:       a.src.clone().inner(),
                    dst:       a.dst.clone().inner(),
                    weight:    a.weight.clone().inner(),
                    num_dst:   a.num_dst,
                    num_edges: a.num_edges,
                })
                .collect(),
            train_idx:    self.train_idx.clone().inner(),
            train_labels: self.train_labels.clone().inner(),
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::adjacency::build_relations;
    use crate::domain::graph::{tests::tiny_graph, EdgeType};
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    fn to_vec(t: Tensor<TestBackend, 2>) -> Vec<f32> {
        t.into_data().iter::<f32>().collect()
    }

    #[test]
    fn test_aggregate_is_neighbour_mean() {
        let device = Default::default();
        // dst 0 ← src {0, 1}; dst 1 ← src {2}; dst 2 has no neighbours
        let rel = RelationAdjacency::from_pairs(
            EdgeType::new("a", "r", "b"),
            3,
            3,
            vec![(0, 0), (1, 0), (2, 1)],
        );
        let adj = MeanAdjacency::<TestBackend>::from_relation(&rel, &device);
        let x   = Tensor::<TestBackend, 1>::from_floats([1.0, 10.0, 3.0, 20.0, 5.0, 30.0], &device)
            .reshape([3, 2]);

        let out = to_vec(adj.aggregate(x));
        assert_eq!(out, vec![2.0, 15.0, 5.0, 30.0, 0.0, 0.0]);
    }

    #[test]
    fn test_aggregate_without_edges_is_zero() {
        let device = Default::default();
        let rel = RelationAdjacency::from_pairs(EdgeType::new("a", "r", "b"), 2, 4, Vec::new());
        let adj = MeanAdjacency::<TestBackend>::from_relation(&rel, &device);
        let x   = Tensor::<TestBackend, 2>::ones([2, 3], &device);
        let out = adj.aggregate(x);
        assert_eq!(out.dims(), [4, 3]);
        assert!(to_vec(out).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_graph_tensors_follow_schema() {
        let device = Default::default();
        let graph  = tiny_graph();
        let rels   = build_relations(&graph);
        let types: Vec<EdgeType> = rels.iter().map(|r| r.edge_type.clone()).collect();
        let schema = GraphSchema::new(&graph, &types).unwrap();

        let gt = GraphTensors::<TestBackend>::new(&graph, &schema, &rels, &device).unwrap();
        assert!(gt.x[0].is_none());
        assert_eq!(gt.x[1].as_ref().unwrap().dims(), [3, 2]);
        assert_eq!(gt.adjs.len(), 3);
        assert_eq!(
            gt.train_labels.into_data().iter::<i64>().collect::<Vec<_>>(),
            vec![0]
        );
    }

    #[test]
    fn test_relation_count_mismatch_is_an_error() {
        let device = Default::default();
        let graph  = tiny_graph();
        let rels   = build_relations(&graph);
        let schema = GraphSchema::new(&graph, &[]).unwrap();
        assert!(GraphTensors::<TestBackend>::new(&graph, &schema, &rels, &device).is_err());
    }
}
