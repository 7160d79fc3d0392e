//! Facade wiring the extraction, similarity, and graph collaborators
//! together behind one ingest/search API.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::TrellisConfig;
use crate::error::TrellisResult;
use crate::retrieval::HybridRetriever;
use crate::traits::{GraphExtractor, GraphStore, SimilaritySource};
use crate::types::{GraphSnapshot, Metadata, RankedResult, SearchMode};

/// Outcome of one ingest call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    /// Node records stored.
    pub nodes: usize,
    /// Edge records stored.
    pub edges: usize,
}

/// One-stop shop: raw text in, ranked results and graph exports out.
///
/// All collaborators are injected at construction; there is no ambient
/// global state.
pub struct HybridDb {
    extractor: Arc<dyn GraphExtractor>,
    similarity: Arc<dyn SimilaritySource>,
    graph: Arc<dyn GraphStore>,
    retriever: HybridRetriever,
}

impl HybridDb {
    /// Wire up a database from its collaborators.
    pub fn new(
        extractor: Arc<dyn GraphExtractor>,
        similarity: Arc<dyn SimilaritySource>,
        graph: Arc<dyn GraphStore>,
        config: TrellisConfig,
    ) -> Self {
        let retriever = HybridRetriever::new(Arc::clone(&similarity), Arc::clone(&graph))
            .with_config(config.retrieval);
        Self {
            extractor,
            similarity,
            graph,
            retriever,
        }
    }

    /// Parse raw text once and store the records everywhere: the
    /// similarity collaborator for semantic search, the graph store for
    /// structural search. Blank input is skipped, not an error.
    ///
    /// `source_metadata` entries are merged into every extracted node
    /// before storage, overwriting extracted keys on conflict — the
    /// caller's attribution is authoritative.
    pub async fn ingest(
        &self,
        raw_text: &str,
        source_metadata: Option<Metadata>,
    ) -> TrellisResult<IngestReport> {
        if raw_text.trim().is_empty() {
            return Ok(IngestReport::default());
        }

        let mut records = self.extractor.extract(raw_text).await?;

        if let Some(source) = source_metadata {
            for node in &mut records.nodes {
                for (key, value) in &source {
                    node.metadata.insert(key.clone(), value.clone());
                }
            }
        }

        info!(
            nodes = records.nodes.len(),
            edges = records.edges.len(),
            "ingesting extracted records"
        );

        self.similarity.index(&records.nodes).await?;
        self.graph.upsert_nodes(&records.nodes).await?;
        self.graph.upsert_edges(&records.edges).await?;

        Ok(IngestReport {
            nodes: records.nodes.len(),
            edges: records.edges.len(),
        })
    }

    /// Unified search interface over the three modes.
    pub async fn search(
        &self,
        query: &str,
        mode: SearchMode,
        top_k: usize,
    ) -> TrellisResult<Vec<RankedResult>> {
        self.retriever.search(query, mode, top_k).await
    }

    /// Full-graph snapshot for visualization consumers.
    pub async fn export_graph(&self) -> TrellisResult<GraphSnapshot> {
        self.graph.export_subgraph().await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::traits::ExtractedRecords;
    use crate::types::{Edge, Node, SimilarityHit};

    use super::*;

    struct FixedExtractor {
        records: ExtractedRecords,
    }

    #[async_trait]
    impl GraphExtractor for FixedExtractor {
        async fn extract(&self, _text: &str) -> TrellisResult<ExtractedRecords> {
            Ok(self.records.clone())
        }
    }

    /// Records indexed nodes so tests can inspect what reached the
    /// similarity collaborator.
    #[derive(Default)]
    struct RecordingSimilarity {
        indexed: Mutex<Vec<Node>>,
    }

    #[async_trait]
    impl SimilaritySource for RecordingSimilarity {
        async fn index(&self, nodes: &[Node]) -> TrellisResult<()> {
            self.indexed.lock().unwrap().extend_from_slice(nodes);
            Ok(())
        }

        async fn search(&self, _query: &str, _limit: usize) -> TrellisResult<Vec<SimilarityHit>> {
            Ok(Vec::new())
        }
    }

    #[derive(Default)]
    struct RecordingGraph {
        nodes: Mutex<Vec<Node>>,
        edges: Mutex<Vec<Edge>>,
    }

    #[async_trait]
    impl GraphStore for RecordingGraph {
        async fn upsert_nodes(&self, nodes: &[Node]) -> TrellisResult<()> {
            self.nodes.lock().unwrap().extend_from_slice(nodes);
            Ok(())
        }

        async fn upsert_edges(&self, edges: &[Edge]) -> TrellisResult<()> {
            self.edges.lock().unwrap().extend_from_slice(edges);
            Ok(())
        }

        async fn neighbors(&self, _node_id: &str, _depth: usize) -> TrellisResult<HashSet<String>> {
            Ok(HashSet::new())
        }

        async fn export_subgraph(&self) -> TrellisResult<GraphSnapshot> {
            Ok(GraphSnapshot::default())
        }
    }

    fn db(records: ExtractedRecords) -> (HybridDb, Arc<RecordingSimilarity>, Arc<RecordingGraph>) {
        let similarity = Arc::new(RecordingSimilarity::default());
        let graph = Arc::new(RecordingGraph::default());
        let db = HybridDb::new(
            Arc::new(FixedExtractor { records }),
            Arc::clone(&similarity) as Arc<dyn SimilaritySource>,
            Arc::clone(&graph) as Arc<dyn GraphStore>,
            TrellisConfig::default(),
        );
        (db, similarity, graph)
    }

    #[tokio::test]
    async fn test_ingest_stores_everywhere() {
        let records = ExtractedRecords {
            nodes: vec![Node::new("Python", "Python"), Node::new("Guido", "Guido")],
            edges: vec![Edge::new("Guido", "Python", "creates")],
        };
        let (db, similarity, graph) = db(records);

        let report = db.ingest("Guido created Python.", None).await.unwrap();

        assert_eq!(report, IngestReport { nodes: 2, edges: 1 });
        assert_eq!(similarity.indexed.lock().unwrap().len(), 2);
        assert_eq!(graph.nodes.lock().unwrap().len(), 2);
        assert_eq!(graph.edges.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_ingest_merges_source_metadata() {
        let mut extracted = Metadata::new();
        extracted.insert("label".to_string(), serde_json::json!("CONCEPT"));
        let records = ExtractedRecords {
            nodes: vec![Node::new("Python", "Python").with_metadata(extracted)],
            edges: vec![],
        };
        let (db, _, graph) = db(records);

        let mut source = Metadata::new();
        source.insert("source".to_string(), serde_json::json!("history_book"));
        source.insert("label".to_string(), serde_json::json!("OVERRIDDEN"));

        db.ingest("Python.", Some(source)).await.unwrap();

        let stored = graph.nodes.lock().unwrap();
        assert_eq!(stored[0].metadata["source"], "history_book");
        // Caller-supplied keys overwrite extracted ones.
        assert_eq!(stored[0].metadata["label"], "OVERRIDDEN");
    }

    #[tokio::test]
    async fn test_ingest_skips_blank_text() {
        let (db, similarity, graph) = db(ExtractedRecords::default());

        let report = db.ingest("   \n\t ", None).await.unwrap();

        assert_eq!(report, IngestReport::default());
        assert!(similarity.indexed.lock().unwrap().is_empty());
        assert!(graph.nodes.lock().unwrap().is_empty());
    }
}
