//! Configuration for trellis.

use serde::{Deserialize, Serialize};

use crate::retrieval::RetrievalConfig;
use crate::traits::GraphStoreConfig;

/// Top-level configuration, deserializable from JSON or TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrellisConfig {
    /// Graph store configuration.
    pub graph_store: GraphStoreConfig,
    /// Retrieval configuration.
    pub retrieval: RetrievalConfig,
}
