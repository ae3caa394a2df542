// ============================================================
// Layer 4 — Relation Adjacency
// ============================================================
// Turns the raw edge lists of a HeteroGraph into the relation
// list the RGCN aggregates over.
//
// Message direction:
//   The stored edge (author a, writes, paper p) means "a wrote p".
//   For the relation author_writes_paper, paper p receives the
//   mean of its authors' states. So every adjacency is stored
//   destination-major (transposed): one (dst, src) entry per edge.
//
// Reverse edges:
//   Authors should also hear from their papers, so every relation
//   between two different node types gets a reverse relation
//   (paper, to, author). A relation inside one node type
//   (paper cites paper) is instead made symmetric: citing and
//   cited papers both aggregate each other through ONE relation.
//
// Duplicate edges are collapsed, so the mean runs over distinct
// neighbours.
//
//   stored:   author_writes_paper, paper_cites_paper
//   produced: author_writes_paper, paper_to_author, paper_cites_paper

use crate::domain::graph::{EdgeType, HeteroGraph};

/// Destination-major adjacency for one relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationAdjacency {
    pub edge_type: EdgeType,
    pub num_src:   usize,
    pub num_dst:   usize,
    /// Source node of each edge, sorted by (dst, src)
    pub src:       Vec<usize>,
    /// Destination node of each edge
    pub dst:       Vec<usize>,
}

impl RelationAdjacency {
    /// Build from (src, dst) pairs. Pairs are sorted destination-major
    /// and deduplicated.
    pub fn from_pairs(
        edge_type: EdgeType,
        num_src:   usize,
        num_dst:   usize,
        pairs:     impl IntoIterator<Item = (usize, usize)>,
    ) -> Self {
        let mut by_dst: Vec<(usize, usize)> = pairs.into_iter().map(|(s, d)| (d, s)).collect();
        by_dst.sort_unstable();
        by_dst.dedup();

        let (dst, src) = by_dst.into_iter().unzip();
        Self { edge_type, num_src, num_dst, src, dst }
    }

    pub fn num_edges(&self) -> usize {
        self.src.len()
    }

    /// Number of distinct in-neighbours of every destination node
    pub fn in_degrees(&self) -> Vec<usize> {
        let mut deg = vec![0usize; self.num_dst];
        for &d in &self.dst {
            deg[d] += 1;
        }
        deg
    }

    /// Per-edge weight 1/deg(dst): a weighted scatter-sum with these
    /// weights is the mean over each destination's neighbours.
    /// Isolated destinations have no edges and therefore end up at zero.
    pub fn mean_weights(&self) -> Vec<f32> {
        let deg = self.in_degrees();
        self.dst.iter().map(|&d| 1.0 / deg[d] as f32).collect()
    }
}

/// Build the aggregation relations for a graph, in edge-type order.
pub fn build_relations(graph: &HeteroGraph) -> Vec<RelationAdjacency> {
    let mut relations = Vec::with_capacity(graph.edges.len() * 2);

    for (edge_type, pairs) in &graph.edges {
        let num_src = graph.count(&edge_type.src);
        let num_dst = graph.count(&edge_type.dst);

        if edge_type.is_self_relation() {
            let both_ways = pairs.iter().flat_map(|&(s, d)| [(s, d), (d, s)]);
            relations.push(RelationAdjacency::from_pairs(
                edge_type.clone(), num_src, num_dst, both_ways,
            ));
        } else {
            relations.push(RelationAdjacency::from_pairs(
                edge_type.clone(), num_src, num_dst, pairs.iter().copied(),
            ));
            relations.push(RelationAdjacency::from_pairs(
                edge_type.reversed(), num_dst, num_src, pairs.iter().map(|&(s, d)| (d, s)),
            ));
        }

        tracing::debug!("Built adjacency for '{}' ({} edges)", edge_type, pairs.len());
    }

    relations
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::graph::tests::tiny_graph;

    #[test]
    fn test_relation_order_and_reverse_edges() {
        let rels  = build_relations(&tiny_graph());
        let names: Vec<String> = rels.iter().map(|r| r.edge_type.to_string()).collect();
        assert_eq!(
            names,
            vec!["author_writes_paper", "paper_to_author", "paper_cites_paper"]
        );

        // paper_to_author: papers (3) aggregate into authors (2)
        let rev = &rels[1];
        assert_eq!((rev.num_src, rev.num_dst), (3, 2));
        // author 0 wrote papers 0 and 1, author 1 wrote paper 2
        assert_eq!(rev.dst, vec![0, 0, 1]);
        assert_eq!(rev.src, vec![0, 1, 2]);
    }

    #[test]
    fn test_self_relation_is_symmetric() {
        let rels  = build_relations(&tiny_graph());
        let cites = &rels[2];
        // 0→1, 1→2 plus reverse 1→0, 2→1
        assert_eq!(cites.num_edges(), 4);
        assert_eq!(cites.in_degrees(), vec![1, 2, 1]);
    }

    #[test]
    fn test_duplicates_are_collapsed() {
        let adj = RelationAdjacency::from_pairs(
            EdgeType::new("a", "r", "b"),
            2,
            2,
            vec![(0, 1), (0, 1), (1, 1)],
        );
        assert_eq!(adj.num_edges(), 2);
        assert_eq!(adj.mean_weights(), vec![0.5, 0.5]);
    }

    #[test]
    fn test_mean_weights_sum_to_one_per_destination() {
        let adj = RelationAdjacency::from_pairs(
            EdgeType::new("a", "r", "b"),
            4,
            3,
            vec![(0, 0), (1, 0), (2, 0), (3, 2)],
        );
        let w = adj.mean_weights();
        let mut per_dst = [0.0f32; 3];
        for (&d, &wi) in adj.dst.iter().zip(&w) {
            per_dst[d] += wi;
        }
        assert!((per_dst[0] - 1.0).abs() < 1e-6);
        // node 1 has no in-edges
        assert_eq!(per_dst[1], 0.0);
        assert!((per_dst[2] - 1.0).abs() < 1e-6);
    }
}
