//! trellis-graph-stores - Graph store implementations for trellis.
//!
//! Provides the embedded petgraph + SQLite store used as the default
//! durable relation graph.

pub mod embedded;

pub use embedded::EmbeddedGraphStore;

// Re-export core types
pub use trellis_core::traits::{GraphStore, GraphStoreConfig};
pub use trellis_core::types::{Edge, GraphSnapshot, Node};
