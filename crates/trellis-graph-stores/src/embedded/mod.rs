//! Embedded relation-graph store.
//!
//! Keeps two copies of the graph and keeps them in lockstep: a SQLite
//! database that every mutation commits to synchronously before
//! returning, and a petgraph `DiGraph` that answers neighbor queries
//! and exports without touching disk. Opening a store hydrates the
//! in-memory half from SQLite in full; after that, reads never hit the
//! database.
//!
//! ```text
//! upsert ──► SQLite (durable, committed first)
//!              │
//!              ▼
//!            petgraph DiGraph (in-memory) ──► neighbors / export
//! ```
//!
//! Module split: [`schema`] owns the DDL, [`sync`] moves records
//! between SQLite and petgraph, [`graph_ops`] is the pure in-memory
//! layer.

pub mod graph_ops;
pub mod schema;
pub mod sync;

use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use rusqlite::Connection;
use tracing::info;

use trellis_core::error::{TrellisError, TrellisResult};
use trellis_core::traits::{GraphStore, GraphStoreConfig};
use trellis_core::types::{Edge, GraphSnapshot, Node};

use graph_ops::{IdIndex, KnowledgeGraph};

/// The in-memory half, locked as a unit so readers always observe the
/// graph and its id index in agreement.
struct MemoryState {
    graph: KnowledgeGraph,
    ids: IdIndex,
}

/// Embedded graph store using petgraph + SQLite.
///
/// Thread-safe: the connection lock serializes writers; the state lock
/// gives readers a consistent snapshot. Mutating calls hold both, write
/// each record durably, then apply it in memory — a record whose durable
/// write fails touches neither half.
pub struct EmbeddedGraphStore {
    conn: Mutex<Connection>,
    state: Mutex<MemoryState>,
}

impl EmbeddedGraphStore {
    /// Open (or create) a store at the given database path and hydrate
    /// the in-memory graph from it.
    pub fn new(db_path: impl AsRef<Path>) -> TrellisResult<Self> {
        Self::from_connection(Connection::open(db_path)?)
    }

    /// Create a non-durable in-memory store.
    pub fn in_memory() -> TrellisResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Create a store from a [`GraphStoreConfig`].
    pub fn from_config(config: &GraphStoreConfig) -> TrellisResult<Self> {
        if config.is_in_memory() {
            Self::in_memory()
        } else {
            Self::new(&config.url)
        }
    }

    fn from_connection(conn: Connection) -> TrellisResult<Self> {
        schema::init_schema(&conn)?;

        let mut graph = KnowledgeGraph::new();
        let mut ids = IdIndex::new();
        sync::load_graph(&conn, &mut graph, &mut ids)?;
        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "graph hydrated from SQLite"
        );

        Ok(Self {
            conn: Mutex::new(conn),
            state: Mutex::new(MemoryState { graph, ids }),
        })
    }

    /// Persist nodes and update memory, one record at a time.
    pub fn add_nodes(&self, nodes: &[Node]) -> TrellisResult<()> {
        if nodes.is_empty() {
            return Ok(());
        }

        let conn = self.lock_conn()?;
        let mut state = self.lock_state()?;
        let state = &mut *state;
        for node in nodes {
            sync::save_node(&conn, node)?;
            graph_ops::upsert_vertex(&mut state.graph, &mut state.ids, node);
        }
        info!(count = nodes.len(), "upserted nodes");
        Ok(())
    }

    /// Persist edges and update memory, one record at a time.
    pub fn add_edges(&self, edges: &[Edge]) -> TrellisResult<()> {
        if edges.is_empty() {
            return Ok(());
        }

        let conn = self.lock_conn()?;
        let mut state = self.lock_state()?;
        let state = &mut *state;
        for edge in edges {
            sync::save_edge(&conn, edge)?;
            graph_ops::upsert_link(&mut state.graph, &mut state.ids, edge);
        }
        info!(count = edges.len(), "upserted edges");
        Ok(())
    }

    /// Ids within `depth` undirected hops of `node_id`.
    pub fn neighbor_ids(&self, node_id: &str, depth: usize) -> TrellisResult<HashSet<String>> {
        let state = self.lock_state()?;
        Ok(graph_ops::neighborhood(&state.graph, &state.ids, node_id, depth))
    }

    /// Snapshot of the full graph.
    pub fn snapshot(&self) -> TrellisResult<GraphSnapshot> {
        let state = self.lock_state()?;
        Ok(graph_ops::snapshot(&state.graph))
    }

    /// Number of vertices (node records plus placeholder endpoints).
    pub fn node_count(&self) -> TrellisResult<usize> {
        Ok(self.lock_state()?.graph.node_count())
    }

    /// Number of edges.
    pub fn edge_count(&self) -> TrellisResult<usize> {
        Ok(self.lock_state()?.graph.edge_count())
    }

    fn lock_conn(&self) -> TrellisResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| TrellisError::internal(e.to_string()))
    }

    fn lock_state(&self) -> TrellisResult<std::sync::MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|e| TrellisError::internal(e.to_string()))
    }
}

#[async_trait]
impl GraphStore for EmbeddedGraphStore {
    async fn upsert_nodes(&self, nodes: &[Node]) -> TrellisResult<()> {
        self.add_nodes(nodes)
    }

    async fn upsert_edges(&self, edges: &[Edge]) -> TrellisResult<()> {
        self.add_edges(edges)
    }

    async fn neighbors(&self, node_id: &str, depth: usize) -> TrellisResult<HashSet<String>> {
        self.neighbor_ids(node_id, depth)
    }

    async fn export_subgraph(&self) -> TrellisResult<GraphSnapshot> {
        self.snapshot()
    }
}

impl std::fmt::Debug for EmbeddedGraphStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddedGraphStore")
            .field("node_count", &self.node_count().unwrap_or(0))
            .field("edge_count", &self.edge_count().unwrap_or(0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use trellis_core::types::Metadata;

    use super::*;

    fn meta(key: &str, value: &str) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert(key.to_string(), serde_json::json!(value));
        metadata
    }

    #[tokio::test]
    async fn test_upsert_idempotence() {
        let store = EmbeddedGraphStore::in_memory().unwrap();

        store
            .upsert_nodes(&[Node::new("A", "v1").with_metadata(meta("rev", "1"))])
            .await
            .unwrap();
        store
            .upsert_nodes(&[Node::new("A", "v2").with_metadata(meta("rev", "2"))])
            .await
            .unwrap();

        assert_eq!(store.node_count().unwrap(), 1);
        let snap = store.export_subgraph().await.unwrap();
        assert_eq!(snap.nodes[0].text, "v2");
        assert_eq!(snap.nodes[0].metadata["rev"], "2");
    }

    #[tokio::test]
    async fn test_edge_uniqueness() {
        let store = EmbeddedGraphStore::in_memory().unwrap();

        store
            .upsert_edges(&[Edge::new("A", "B", "creates").with_weight(0.5)])
            .await
            .unwrap();
        store
            .upsert_edges(&[Edge::new("A", "B", "creates").with_weight(0.9)])
            .await
            .unwrap();

        assert_eq!(store.edge_count().unwrap(), 1);
        let snap = store.export_subgraph().await.unwrap();
        assert_eq!(snap.links[0].weight, 0.9);
    }

    #[tokio::test]
    async fn test_neighbor_symmetry_at_depth_one() {
        let store = EmbeddedGraphStore::in_memory().unwrap();
        store
            .upsert_edges(&[Edge::new("A", "B", "creates")])
            .await
            .unwrap();

        assert!(store.neighbors("A", 1).await.unwrap().contains("B"));
        assert!(store.neighbors("B", 1).await.unwrap().contains("A"));
    }

    #[tokio::test]
    async fn test_multi_hop_monotonic() {
        let store = EmbeddedGraphStore::in_memory().unwrap();
        store
            .upsert_edges(&[
                Edge::new("A", "B", "r"),
                Edge::new("C", "B", "r"),
                Edge::new("C", "D", "r"),
                Edge::new("E", "D", "r"),
            ])
            .await
            .unwrap();

        for depth in 1..5 {
            let smaller = store.neighbors("A", depth).await.unwrap();
            let larger = store.neighbors("A", depth + 1).await.unwrap();
            assert!(smaller.is_subset(&larger));
        }
        assert_eq!(store.neighbors("A", 4).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_unknown_node_yields_empty_set() {
        let store = EmbeddedGraphStore::in_memory().unwrap();
        assert!(store.neighbors("nobody", 1).await.unwrap().is_empty());
        assert!(store.neighbors("nobody", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_export_key_contract() {
        let store = EmbeddedGraphStore::in_memory().unwrap();

        // Empty graph first.
        let json = serde_json::to_value(store.export_subgraph().await.unwrap()).unwrap();
        assert_eq!(json["links"], serde_json::json!([]));
        assert!(json.get("edges").is_none());

        store.upsert_nodes(&[Node::new("A", "a")]).await.unwrap();
        store
            .upsert_edges(&[Edge::new("A", "B", "creates")])
            .await
            .unwrap();

        let json = serde_json::to_value(store.export_subgraph().await.unwrap()).unwrap();
        assert!(json.get("edges").is_none());
        assert_eq!(json["links"][0]["type"], "creates");
        assert_eq!(json["links"][0]["source"], "A");
        assert_eq!(json["links"][0]["target"], "B");
    }

    #[tokio::test]
    async fn test_persistence_round_trip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("graph.db");

        let node_ids = ["A", "B", "C", "D"];
        {
            let store = EmbeddedGraphStore::new(&db_path).unwrap();
            store
                .upsert_nodes(&[
                    Node::new("A", "a").with_metadata(meta("label", "PERSON")),
                    Node::new("B", "b"),
                    Node::new("C", "c"),
                    Node::new("D", "d"),
                ])
                .await
                .unwrap();
            store
                .upsert_edges(&[
                    Edge::new("A", "B", "knows"),
                    Edge::new("B", "C", "employs").with_weight(0.4),
                    Edge::new("D", "B", "knows"),
                ])
                .await
                .unwrap();
        }

        let reopened = EmbeddedGraphStore::new(&db_path).unwrap();
        assert_eq!(reopened.node_count().unwrap(), 4);
        assert_eq!(reopened.edge_count().unwrap(), 3);

        // Identical neighbors for every node present before restart.
        let fresh = EmbeddedGraphStore::in_memory().unwrap();
        fresh
            .upsert_nodes(&[
                Node::new("A", "a"),
                Node::new("B", "b"),
                Node::new("C", "c"),
                Node::new("D", "d"),
            ])
            .await
            .unwrap();
        fresh
            .upsert_edges(&[
                Edge::new("A", "B", "knows"),
                Edge::new("B", "C", "employs").with_weight(0.4),
                Edge::new("D", "B", "knows"),
            ])
            .await
            .unwrap();

        for id in node_ids {
            for depth in 1..4 {
                assert_eq!(
                    reopened.neighbors(id, depth).await.unwrap(),
                    fresh.neighbors(id, depth).await.unwrap(),
                    "neighbors({id}, {depth}) changed across restart"
                );
            }
        }
    }

    #[tokio::test]
    async fn test_orphan_edges_traverse_identically_after_restart() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("graph.db");

        {
            let store = EmbeddedGraphStore::new(&db_path).unwrap();
            store.upsert_nodes(&[Node::new("A", "a")]).await.unwrap();
            // B and C never get node records.
            store
                .upsert_edges(&[Edge::new("A", "B", "r"), Edge::new("B", "C", "r")])
                .await
                .unwrap();

            assert_eq!(
                store.neighbors("A", 2).await.unwrap(),
                HashSet::from(["B".to_string(), "C".to_string()])
            );
        }

        let reopened = EmbeddedGraphStore::new(&db_path).unwrap();
        assert_eq!(
            reopened.neighbors("A", 2).await.unwrap(),
            HashSet::from(["B".to_string(), "C".to_string()])
        );
    }

    #[tokio::test]
    async fn test_hydration_tolerates_corrupt_metadata() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("graph.db");

        {
            let store = EmbeddedGraphStore::new(&db_path).unwrap();
            store
                .upsert_nodes(&[
                    Node::new("good", "fine").with_metadata(meta("label", "OK")),
                    Node::new("victim", "soon corrupt"),
                ])
                .await
                .unwrap();
        }

        // Corrupt one row behind the store's back.
        {
            let raw = Connection::open(&db_path).unwrap();
            raw.execute(
                "UPDATE nodes SET metadata = 'garbage{{' WHERE id = 'victim'",
                [],
            )
            .unwrap();
        }

        let reopened = EmbeddedGraphStore::new(&db_path).unwrap();
        assert_eq!(reopened.node_count().unwrap(), 2);

        let snap = reopened.export_subgraph().await.unwrap();
        let victim = snap.nodes.iter().find(|n| n.id == "victim").unwrap();
        assert!(victim.metadata.is_empty());
        let good = snap.nodes.iter().find(|n| n.id == "good").unwrap();
        assert_eq!(good.metadata["label"], "OK");
    }

    #[tokio::test]
    async fn test_late_node_record_fills_placeholder() {
        let store = EmbeddedGraphStore::in_memory().unwrap();

        store
            .upsert_edges(&[Edge::new("A", "B", "r")])
            .await
            .unwrap();
        store
            .upsert_nodes(&[Node::new("B", "arrived late")])
            .await
            .unwrap();

        assert_eq!(store.node_count().unwrap(), 2);
        let snap = store.export_subgraph().await.unwrap();
        let b = snap.nodes.iter().find(|n| n.id == "B").unwrap();
        assert_eq!(b.text, "arrived late");
        // The edge still connects the same vertex.
        assert!(store.neighbors("B", 1).await.unwrap().contains("A"));
    }
}
