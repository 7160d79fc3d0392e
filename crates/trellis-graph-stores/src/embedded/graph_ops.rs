//! In-memory graph operations using petgraph DiGraph.
//!
//! The in-memory half of the store: string-keyed vertices over a petgraph
//! `DiGraph`, with multi-edges distinguished by relation type and an id
//! index for O(1) lookups.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use trellis_core::types::{Edge, GraphSnapshot, Metadata, Node};

/// Vertex data in the in-memory graph.
///
/// A vertex exists either because a node record was upserted or because an
/// edge referenced the id before any node record arrived (a placeholder
/// with empty text and metadata).
#[derive(Debug, Clone)]
pub struct NodeVertex {
    /// Node id (the lookup key).
    pub id: String,
    /// Node content.
    pub text: String,
    /// Node metadata.
    pub metadata: Metadata,
}

impl NodeVertex {
    /// Placeholder vertex for an edge endpoint with no node record yet.
    pub fn placeholder(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: String::new(),
            metadata: Metadata::new(),
        }
    }
}

impl From<&Node> for NodeVertex {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            text: node.text.clone(),
            metadata: node.metadata.clone(),
        }
    }
}

/// Edge data in the in-memory graph.
#[derive(Debug, Clone)]
pub struct EdgeLink {
    /// Relation label; part of the edge identity.
    pub edge_type: String,
    /// Edge weight.
    pub weight: f64,
}

/// The in-memory graph type.
pub type KnowledgeGraph = DiGraph<NodeVertex, EdgeLink>;

/// Index from node id to petgraph index.
pub type IdIndex = HashMap<String, NodeIndex>;

/// Get or create the vertex for `id`, as a placeholder if absent.
pub fn ensure_vertex(graph: &mut KnowledgeGraph, ids: &mut IdIndex, id: &str) -> NodeIndex {
    if let Some(&idx) = ids.get(id) {
        return idx;
    }
    let idx = graph.add_node(NodeVertex::placeholder(id));
    ids.insert(id.to_string(), idx);
    idx
}

/// Insert or replace the vertex for a node record. Replacement is
/// wholesale: text and metadata are overwritten, never merged.
pub fn upsert_vertex(graph: &mut KnowledgeGraph, ids: &mut IdIndex, node: &Node) -> NodeIndex {
    if let Some(&idx) = ids.get(&node.id) {
        if let Some(vertex) = graph.node_weight_mut(idx) {
            vertex.text = node.text.clone();
            vertex.metadata = node.metadata.clone();
        }
        return idx;
    }
    let idx = graph.add_node(NodeVertex::from(node));
    ids.insert(node.id.clone(), idx);
    idx
}

/// Insert or replace the link for an edge record, keyed by
/// `(source, target, type)`. Missing endpoints are materialized as
/// placeholder vertices.
pub fn upsert_link(graph: &mut KnowledgeGraph, ids: &mut IdIndex, edge: &Edge) {
    let source_idx = ensure_vertex(graph, ids, &edge.source);
    let target_idx = ensure_vertex(graph, ids, &edge.target);

    let existing = graph
        .edges_connecting(source_idx, target_idx)
        .find(|e| e.weight().edge_type == edge.edge_type)
        .map(|e| e.id());

    match existing {
        Some(edge_idx) => {
            if let Some(link) = graph.edge_weight_mut(edge_idx) {
                link.weight = edge.weight;
            }
        }
        None => {
            graph.add_edge(
                source_idx,
                target_idx,
                EdgeLink {
                    edge_type: edge.edge_type.clone(),
                    weight: edge.weight,
                },
            );
        }
    }
}

/// Ids reachable within `depth` undirected hops of `id`, excluding `id`
/// itself. Unknown ids and depth 0 yield an empty set.
pub fn neighborhood(
    graph: &KnowledgeGraph,
    ids: &IdIndex,
    id: &str,
    depth: usize,
) -> HashSet<String> {
    let mut reachable = HashSet::new();
    let start = match ids.get(id) {
        Some(&idx) => idx,
        None => return reachable,
    };
    if depth == 0 {
        return reachable;
    }

    // Unweighted BFS over the undirected view.
    let mut visited: HashSet<NodeIndex> = HashSet::from([start]);
    let mut frontier: VecDeque<(NodeIndex, usize)> = VecDeque::from([(start, 0)]);

    while let Some((idx, dist)) = frontier.pop_front() {
        if dist == depth {
            continue;
        }
        for neighbor in graph.neighbors_undirected(idx) {
            if visited.insert(neighbor) {
                reachable.insert(graph[neighbor].id.clone());
                frontier.push_back((neighbor, dist + 1));
            }
        }
    }

    reachable
}

/// Serializable snapshot of the whole graph, placeholder vertices
/// included.
pub fn snapshot(graph: &KnowledgeGraph) -> GraphSnapshot {
    let nodes = graph
        .node_weights()
        .map(|vertex| Node {
            id: vertex.id.clone(),
            text: vertex.text.clone(),
            metadata: vertex.metadata.clone(),
        })
        .collect();

    let links = graph
        .edge_references()
        .map(|e| Edge {
            source: graph[e.source()].id.clone(),
            target: graph[e.target()].id.clone(),
            edge_type: e.weight().edge_type.clone(),
            weight: e.weight().weight,
        })
        .collect();

    GraphSnapshot { nodes, links }
}
