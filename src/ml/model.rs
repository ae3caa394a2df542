// ============================================================
// Layer 5 — RGCN Model
// ============================================================
// Relational graph convolution over a heterogeneous graph.
//
//   input:   paper features → Linear,  other types → embedding table
//   hidden:  (num_layers - 1) × [RgcnConv → ReLU → Dropout] on every type
//   output:  RgcnConv restricted to the target type → log_softmax
//
// Each layer owns its Linear layers in Vecs ordered like the
// GraphSchema, which is why the schema is passed to forward.

use burn::{
    module::Param,
    nn::{Dropout, DropoutConfig, Initializer, Linear, LinearConfig},
    prelude::*,
    tensor::activation::{log_softmax, relu},
};

use crate::domain::schema::GraphSchema;
use crate::ml::tensors::GraphTensors;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct RgcnConfig {
    pub hidden_channels: usize,
    pub out_channels:    usize,
    pub num_layers:      usize,
    #[config(default = 0.5)]
    pub dropout:         f64,
}

impl RgcnConfig {
    /// Build the model for a graph layout. `num_layers` is treated as at least 1.
    pub fn init<B: Backend>(&self, schema: &GraphSchema, device: &B::Device) -> Rgcn<B> {
        let hidden = self.hidden_channels;

        // Featured types get an input projection, the rest a learned embedding table
        let mut lins: Vec<Linear<B>> = Vec::new();
        let mut embs: Vec<Param<Tensor<B, 2>>> = Vec::new();
        for (t, dim) in schema.feature_dims.iter().enumerate() {
            match dim {
                Some(d) => lins.push(LinearConfig::new(*d, hidden).init(device)),
                None => {
                    let n = schema.num_nodes[t];
                    embs.push(
                        Initializer::XavierUniform { gain: 1.0 }
                            .init_with([n, hidden], Some(hidden), Some(n), device),
                    );
                }
            }
        }

        let all_types = schema.num_node_types();
        let all_rels  = schema.relations.len();
        let convs = (1..self.num_layers.max(1))
            .map(|_| RgcnConv::new(hidden, hidden, all_types, all_rels, device))
            .collect();

        // Only the target type is read from the last layer
        let into_target = schema.relations_into(schema.target).len();
        let out_conv = RgcnConv::new(hidden, self.out_channels, 1, into_target, device);

        Rgcn {
            lins,
            embs,
            convs,
            out_conv,
            dropout: DropoutConfig::new(self.dropout).init(),
        }
    }
}

// ─── RgcnConv ─────────────────────────────────────────────────────────────────
/// One relational convolution.
///
/// For every node type t it handles:   out[t]  = root_t(x[t])
/// For every relation (s → d):         out[d] += rel_lin(mean_{s→d}(x[s]))
///
/// Which node types and relations a layer handles is decided by the
/// caller; `root_lins` and `rel_lins` are parallel to those lists.
#[derive(Module, Debug)]
pub struct RgcnConv<B: Backend> {
    pub rel_lins:  Vec<Linear<B>>,
    pub root_lins: Vec<Linear<B>>,
}

impl<B: Backend> RgcnConv<B> {
    pub fn new(
        in_channels:  usize,
        out_channels: usize,
        node_types:   usize,
        relations:    usize,
        device:       &B::Device,
    ) -> Self {
        let rel_lins = (0..relations)
            .map(|_| LinearConfig::new(in_channels, out_channels).with_bias(false).init(device))
            .collect();
        let root_lins = (0..node_types)
            .map(|_| LinearConfig::new(in_channels, out_channels).init(device))
            .collect();
        Self { rel_lins, root_lins }
    }

    /// `x` holds one state per schema node type. Returns one output per
    /// entry of `node_types`, in that order.
    pub fn forward(
        &self,
        x:          &[Tensor<B, 2>],
        graph:      &GraphTensors<B>,
        schema:     &GraphSchema,
        node_types: &[usize],
        relations:  &[usize],
    ) -> Vec<Tensor<B, 2>> {
        let mut out: Vec<Tensor<B, 2>> = self
            .root_lins
            .iter()
            .zip(node_types)
            .map(|(lin, &t)| lin.forward(x[t].clone()))
            .collect();

        for (lin, &r) in self.rel_lins.iter().zip(relations) {
            let slot = &schema.relations[r];
            // every relation's destination is one of this layer's node types
            let Some(pos) = node_types.iter().position(|&t| t == slot.dst) else {
                continue;
            };
            let msg  = lin.forward(graph.adjs[r].aggregate(x[slot.src].clone()));
            out[pos] = out[pos].clone() + msg;
        }

        out
    }
}

// ─── Rgcn ─────────────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct Rgcn<B: Backend> {
    /// Input projections for featured node types, in schema order
    pub lins:    Vec<Linear<B>>,
    /// Embedding tables for featureless node types, in schema order
    pub embs:    Vec<Param<Tensor<B, 2>>>,
    /// Hidden convolutions over every node type and relation
    pub convs:   Vec<RgcnConv<B>>,
    /// Last convolution, target type only
    pub out_conv: RgcnConv<B>,
    pub dropout: Dropout,
}

impl<B: Backend> Rgcn<B> {
    /// Log-probabilities for every target node — shape [num_target, out_channels]
    pub fn forward(&self, graph: &GraphTensors<B>, schema: &GraphSchema) -> Tensor<B, 2> {
        // ── Initial node states ───────────────────────────────────────────────
        // lins / embs were built in schema order, so walk them in step
        let (mut li, mut ei) = (0, 0);
        let mut x: Vec<Tensor<B, 2>> = Vec::with_capacity(graph.x.len());
        for feat in &graph.x {
            match feat {
                Some(f) => {
                    x.push(self.lins[li].forward(f.clone()));
                    li += 1;
                }
                None => {
                    x.push(self.embs[ei].val());
                    ei += 1;
                }
            }
        }

        // ── Hidden layers: all types, all relations, ReLU + dropout ───────────
        let all_types: Vec<usize> = (0..schema.num_node_types()).collect();
        let all_rels:  Vec<usize> = (0..schema.relations.len()).collect();

        for conv in &self.convs {
            x = conv
                .forward(&x, graph, schema, &all_types, &all_rels)
                .into_iter()
                .map(|h| self.dropout.forward(relu(h)))
                .collect();
        }

        // ── Output layer: target type only ────────────────────────────────────
        let target = [schema.target];
        let into_target = schema.relations_into(schema.target);
        let out = self
            .out_conv
            .forward(&x, graph, schema, &target, &into_target)
            .remove(0);

        log_softmax(out, 1)
    }

    /// Negative log-likelihood over the training nodes.
    pub fn forward_loss(&self, graph: &GraphTensors<B>, schema: &GraphSchema) -> Tensor<B, 1> {
        let log_probs = self.forward(graph, schema).select(0, graph.train_idx.clone());
        nll_loss(log_probs, graph.train_labels.clone())
    }
}

/// mean(-log_probs[i, targets[i]])
pub fn nll_loss<B: Backend>(log_probs: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> Tensor<B, 1> {
    let [n] = targets.dims();
    log_probs
        .gather(1, targets.reshape([n, 1]))
        .mean()
        .neg()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::adjacency::build_relations;
    use crate::domain::graph::{tests::tiny_graph, EdgeType};
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    fn setup(num_layers: usize) -> (Rgcn<TestBackend>, GraphTensors<TestBackend>, GraphSchema) {
        let device = Default::default();
        let graph  = tiny_graph();
        let rels   = build_relations(&graph);
        let types: Vec<EdgeType> = rels.iter().map(|r| r.edge_type.clone()).collect();
        let schema = GraphSchema::new(&graph, &types).unwrap();
        let tensors = GraphTensors::new(&graph, &schema, &rels, &device).unwrap();
        let model  = RgcnConfig::new(8, 2, num_layers).init(&schema, &device);
        (model, tensors, schema)
    }

    #[test]
    fn test_parameter_layout() {
        let (model, _, _) = setup(3);
        // one featured type (paper), one featureless (author)
        assert_eq!(model.lins.len(), 1);
        assert_eq!(model.embs.len(), 1);
        assert_eq!(model.embs[0].val().dims(), [2, 8]);
        assert_eq!(model.convs.len(), 2);
        // hidden layers: 2 node types, 3 relations
        assert_eq!(model.convs[0].root_lins.len(), 2);
        assert_eq!(model.convs[0].rel_lins.len(), 3);
        // last layer: paper only, relations into paper are writes + cites
        assert_eq!(model.out_conv.root_lins.len(), 1);
        assert_eq!(model.out_conv.rel_lins.len(), 2);
    }

    #[test]
    fn test_rel_lins_have_no_bias() {
        let (model, _, _) = setup(2);
        assert!(model.convs[0].rel_lins.iter().all(|l| l.bias.is_none()));
        assert!(model.convs[0].root_lins.iter().all(|l| l.bias.is_some()));
    }

    #[test]
    fn test_output_is_log_probabilities() {
        let (model, tensors, schema) = setup(2);
        let out = model.forward(&tensors, &schema);
        assert_eq!(out.dims(), [3, 2]);

        let row_sums: Vec<f32> = out.exp().sum_dim(1).into_data().iter::<f32>().collect();
        for s in row_sums {
            assert!((s - 1.0).abs() < 1e-4, "row sums to {s}");
        }
    }

    #[test]
    fn test_single_layer_model() {
        let (model, tensors, schema) = setup(1);
        assert!(model.convs.is_empty());
        assert_eq!(model.forward(&tensors, &schema).dims(), [3, 2]);
    }

    #[test]
    fn test_nll_loss_picks_target_column() {
        let device = Default::default();
        let log_probs = Tensor::<TestBackend, 1>::from_floats([-0.1, -2.0, -3.0, -0.5], &device)
            .reshape([2, 2]);
        let targets = Tensor::<TestBackend, 1, Int>::from_ints([0, 1], &device);
        let loss: f32 = nll_loss(log_probs, targets).into_scalar();
        assert!((loss - 0.3).abs() < 1e-6);
    }
}
