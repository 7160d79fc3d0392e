//! Collaborator traits at the seams of the core.

mod extractor;
mod graph_store;
mod similarity;

pub use extractor::{ExtractedRecords, GraphExtractor};
pub use graph_store::{GraphStore, GraphStoreConfig};
pub use similarity::SimilaritySource;
