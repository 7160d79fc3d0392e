//! Similarity collaborator trait.

use async_trait::async_trait;

use crate::error::TrellisResult;
use crate::types::{Node, SimilarityHit};

/// Opaque ranked candidate source, typically embedding + nearest-neighbor
/// search. The core never generates embeddings or builds the index; it only
/// consumes the ranking. Assumed stateless and thread-safe; callers impose
/// their own timeouts at this boundary.
#[async_trait]
pub trait SimilaritySource: Send + Sync {
    /// Make nodes available for future searches.
    async fn index(&self, nodes: &[Node]) -> TrellisResult<()>;

    /// Return up to `limit` candidates ranked by similarity to `query`,
    /// scores in [0, 1], best first.
    async fn search(&self, query: &str, limit: usize) -> TrellisResult<Vec<SimilarityHit>>;
}
