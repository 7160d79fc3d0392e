//! Hybrid fusion retrieval.
//!
//! Merges an externally supplied similarity ranking with graph-neighborhood
//! boosts into a single ranked list. The math lives in [`fusion`]; the
//! collaborator orchestration lives in [`engine`].

pub mod engine;
pub mod fusion;

pub use engine::{HybridRetriever, RetrievalConfig};
pub use fusion::{FusionWeights, NEIGHBOR_BOOST};
