//! trellis-core - Core library for trellis.
//!
//! Trellis is a hybrid retrieval store: it persists entities and typed
//! relations extracted from text, and answers queries by fusing a
//! semantic-similarity ranking with a structural-proximity boost derived
//! from the relation graph.
//!
//! This crate provides the shared types, the collaborator traits
//! ([`traits::GraphStore`], [`traits::SimilaritySource`],
//! [`traits::GraphExtractor`]), the [`retrieval::HybridRetriever`] fusion
//! engine, and the [`db::HybridDb`] facade.
//!
//! # Example
//!
//! ```ignore
//! use trellis_core::{HybridDb, SearchMode, TrellisConfig};
//!
//! let db = HybridDb::new(extractor, similarity, graph, TrellisConfig::default());
//! db.ingest("Python was created by Guido van Rossum.", None).await?;
//! let results = db.search("Who made Python?", SearchMode::Hybrid, 5).await?;
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod retrieval;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use config::TrellisConfig;
pub use db::{HybridDb, IngestReport};
pub use error::{TrellisError, TrellisResult};
pub use retrieval::{FusionWeights, HybridRetriever, RetrievalConfig};
pub use traits::{
    ExtractedRecords, GraphExtractor, GraphStore, GraphStoreConfig, SimilaritySource,
};
pub use types::{Edge, GraphSnapshot, Metadata, Node, RankedResult, SearchMode, SimilarityHit};
