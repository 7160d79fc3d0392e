//! Node and edge records for the relation graph.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Open-ended metadata attached to a node.
pub type Metadata = HashMap<String, serde_json::Value>;

/// An entity record. The `id` is the globally unique lookup and display key;
/// re-upserting the same id replaces `text` and `metadata` wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier (also the display/lookup key).
    pub id: String,
    /// Free-form content associated with the entity.
    #[serde(default)]
    pub text: String,
    /// Additional properties.
    #[serde(default)]
    pub metadata: Metadata,
}

impl Node {
    /// Create a new node with empty metadata.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            metadata: Metadata::new(),
        }
    }

    /// Set metadata.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// A directed, typed, weighted relation between two node ids.
/// The triple `(source, target, type)` is the uniqueness key; re-upserting
/// the same triple replaces the weight. Endpoints need not exist as nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Source node id.
    pub source: String,
    /// Target node id.
    pub target: String,
    /// Relation label.
    #[serde(rename = "type")]
    pub edge_type: String,
    /// Edge weight.
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

impl Edge {
    /// Create a new edge with the default weight of 1.0.
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        edge_type: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            edge_type: edge_type.into(),
            weight: default_weight(),
        }
    }

    /// Set edge weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

/// Serializable full-graph snapshot for visualization consumers.
///
/// The edge collection is named `links` (never `edges`) — downstream
/// node-link renderers depend on that key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// All node records, placeholder endpoints included.
    pub nodes: Vec<Node>,
    /// All edge records.
    pub links: Vec<Edge>,
}
