//! trellis-extractors - Extraction collaborator for trellis.
//!
//! Converts raw text into node/edge records for the graph store. Input
//! first runs through an ordered chain of format handlers (HTML, JSON,
//! plain text cleanup); the first applicable handler wins. The
//! [`PatternExtractor`] then harvests entities and relations with plain
//! pattern heuristics — it is a fallback for deployments without a real
//! NLP collaborator, not a substitute for one.

pub mod handlers;
pub mod pattern;

pub use handlers::{ExtractorCapabilities, FormatHandler, HandlerRegistry};
pub use pattern::PatternExtractor;

// Re-export core types
pub use trellis_core::traits::{ExtractedRecords, GraphExtractor};
