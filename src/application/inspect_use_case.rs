// ============================================================
// Layer 2 — InspectUseCase
// ============================================================
// Loads a graph and prints what the model would be built from:
// node counts, feature dims, split sizes and every relation
// (including the generated reverse relations) with its size.

use anyhow::Result;

use crate::application::{prepared_graph::PreparedGraph, train_use_case::DatasetSource};

pub struct InspectUseCase {
    dataset: DatasetSource,
}

impl InspectUseCase {
    pub fn new(dataset: DatasetSource) -> Self {
        Self { dataset }
    }

    pub fn execute(&self) -> Result<PreparedGraph> {
        let prepared = PreparedGraph::load(&self.dataset)?;
        println!("{}", prepared.graph);

        println!("Relations used by the model ({}):", prepared.relations.len());
        for rel in &prepared.relations {
            println!(
                "  {:<45} {:>10} edges  ({} -> {} nodes)",
                rel.edge_type.to_string(),
                rel.num_edges(),
                rel.num_src,
                rel.num_dst
            );
        }

        let schema = &prepared.schema;
        let target = schema.target;
        println!(
            "Target '{}': {} classes, {} incoming relations",
            schema.node_types[target],
            schema.num_classes,
            schema.relations_into(target).len()
        );
        Ok(prepared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inspect_synthetic_graph() {
        let prepared = InspectUseCase::new(DatasetSource::Synthetic { seed: 0 })
            .execute()
            .unwrap();
        assert_eq!(prepared.graph.target, "paper");
        assert_eq!(prepared.relations.len(), 7);
    }
}
