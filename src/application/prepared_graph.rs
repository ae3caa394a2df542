// ============================================================
// Layer 2 — Prepared Graph
// ============================================================
// Every workflow starts the same way:
//
//   Step 1: Pick the graph source from the config   (Layer 4 - data)
//   Step 2: Load and validate the graph             (Layer 4 - data)
//   Step 3: Build relation adjacency                (Layer 4 - data)
//   Step 4: Resolve names to indices (schema)       (Layer 3 - domain)
//
// PreparedGraph bundles the three results so train, evaluate and
// inspect share one code path and always agree on the layout.

use anyhow::{Context, Result};

use crate::application::train_use_case::DatasetSource;
use crate::data::{
    adjacency::{build_relations, RelationAdjacency},
    loader::OgbMagLoader,
    synthetic::SyntheticMag,
};
use crate::domain::{
    graph::{EdgeType, HeteroGraph},
    schema::GraphSchema,
    traits::GraphSource,
};

pub struct PreparedGraph {
    pub graph:     HeteroGraph,
    pub relations: Vec<RelationAdjacency>,
    pub schema:    GraphSchema,
}

impl PreparedGraph {
    pub fn load(source: &DatasetSource) -> Result<Self> {
        let source: Box<dyn GraphSource> = match source {
            DatasetSource::Ogb { dir }         => Box::new(OgbMagLoader::new(dir)),
            DatasetSource::Synthetic { seed }  => Box::new(SyntheticMag::with_seed(*seed)),
        };
        tracing::info!("Loading graph: {}", source.describe());

        let graph = source.load()?;
        Self::from_graph(graph)
    }

    pub fn from_graph(graph: HeteroGraph) -> Result<Self> {
        let relations = build_relations(&graph);
        let types: Vec<EdgeType> = relations.iter().map(|r| r.edge_type.clone()).collect();
        let schema = GraphSchema::new(&graph, &types).context("Cannot resolve graph schema")?;

        tracing::info!(
            "Prepared {} relations over {} node types (target '{}', {} classes)",
            relations.len(),
            schema.num_node_types(),
            graph.target,
            schema.num_classes
        );
        Ok(Self { graph, relations, schema })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_source_prepares_mag_relations() {
        let prepared = PreparedGraph::load(&DatasetSource::Synthetic { seed: 1 }).unwrap();
        let names: Vec<String> = prepared
            .relations
            .iter()
            .map(|r| r.edge_type.to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "author_affiliated_with_institution",
                "institution_to_author",
                "author_writes_paper",
                "paper_to_author",
                "paper_cites_paper",
                "paper_has_topic_field_of_study",
                "field_of_study_to_paper",
            ]
        );
        assert_eq!(prepared.schema.relations.len(), 7);
        assert_eq!(prepared.schema.node_types[prepared.schema.target], "paper");
    }

    #[test]
    fn test_missing_dataset_dir_is_an_error() {
        let source = DatasetSource::Ogb { dir: "/definitely/not/here".to_string() };
        assert!(PreparedGraph::load(&source).is_err());
    }
}
