//! Search and retrieval result types.

use serde::{Deserialize, Serialize};

use super::Metadata;

/// A candidate returned by the similarity collaborator, used as a fusion
/// anchor and traversal seed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityHit {
    /// Node id.
    pub id: String,
    /// Node content.
    #[serde(default)]
    pub text: String,
    /// Similarity score in [0, 1].
    pub score: f32,
    /// Node metadata.
    #[serde(default)]
    pub metadata: Metadata,
}

impl SimilarityHit {
    /// Create a new similarity hit.
    pub fn new(id: impl Into<String>, score: f32) -> Self {
        Self {
            id: id.into(),
            text: String::new(),
            score,
            metadata: Metadata::new(),
        }
    }
}

/// A fused retrieval result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedResult {
    /// Node id.
    pub id: String,
    /// Final fused score.
    pub score: f32,
    /// Human-readable breakdown of the non-zero score parts,
    /// e.g. `"Vector(0.45) + GraphNeighbor(0.14)"`.
    pub reason: String,
    /// Node metadata, when the candidate was an anchor.
    #[serde(default)]
    pub metadata: Metadata,
}

/// Search mode for the query boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Pure similarity ranking, no fusion.
    Vector,
    /// Fusion with weights (0, 1) — anchors still seed the expansion.
    Graph,
    /// Fusion with the configured weights (default 0.5/0.5).
    #[default]
    Hybrid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&SearchMode::Hybrid).unwrap(),
            "\"hybrid\""
        );
        let mode: SearchMode = serde_json::from_str("\"graph\"").unwrap();
        assert_eq!(mode, SearchMode::Graph);
    }

    #[test]
    fn test_default_mode_is_hybrid() {
        assert_eq!(SearchMode::default(), SearchMode::Hybrid);
    }
}
