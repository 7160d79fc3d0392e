//! Graph store trait and configuration.

use std::collections::HashSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TrellisResult;
use crate::types::{Edge, GraphSnapshot, Node};

/// Single source of truth for the relation graph.
///
/// Implementations must be write-through: every mutating call commits to
/// durable storage before updating any in-memory state, and returns only
/// once the durable half is committed. Batches are not atomic as a unit;
/// each record is — a record whose durable write fails must leave the
/// in-memory half of that record untouched.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Insert or replace nodes, keyed by `id`.
    async fn upsert_nodes(&self, nodes: &[Node]) -> TrellisResult<()>;

    /// Insert or replace edges, keyed by `(source, target, type)`.
    async fn upsert_edges(&self, edges: &[Edge]) -> TrellisResult<()>;

    /// Ids reachable within `depth` undirected hops of `node_id`,
    /// excluding `node_id` itself. Depth 1 is the union of successors and
    /// predecessors. Unknown ids yield an empty set, not an error.
    async fn neighbors(&self, node_id: &str, depth: usize) -> TrellisResult<HashSet<String>>;

    /// A serializable snapshot of the full graph.
    async fn export_subgraph(&self) -> TrellisResult<GraphSnapshot>;
}

/// Graph store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphStoreConfig {
    /// Database path for embedded stores; `:memory:` or empty for an
    /// in-memory database.
    pub url: String,
}

impl Default for GraphStoreConfig {
    fn default() -> Self {
        Self {
            url: "./data/graph.db".to_string(),
        }
    }
}

impl GraphStoreConfig {
    /// Config for an in-memory (non-durable) store.
    pub fn in_memory() -> Self {
        Self {
            url: ":memory:".to_string(),
        }
    }

    /// Whether this config selects an in-memory database.
    pub fn is_in_memory(&self) -> bool {
        self.url.is_empty() || self.url == ":memory:"
    }
}
