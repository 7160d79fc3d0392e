//! Extraction collaborator trait.

use async_trait::async_trait;

use crate::error::TrellisResult;
use crate::types::{Edge, Node};

/// Node and edge records produced from one piece of raw text.
#[derive(Debug, Clone, Default)]
pub struct ExtractedRecords {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// Converts raw text into node/edge records. The core treats the output as
/// opaque — how entities and relations are recognized is entirely the
/// collaborator's concern.
#[async_trait]
pub trait GraphExtractor: Send + Sync {
    /// Extract structured records from raw text.
    async fn extract(&self, text: &str) -> TrellisResult<ExtractedRecords>;
}
