//! Core types shared across trellis crates.

mod graph;
mod search;

pub use graph::{Edge, GraphSnapshot, Metadata, Node};
pub use search::{RankedResult, SearchMode, SimilarityHit};
