//! Pattern-based fallback extractor.
//!
//! Harvests capitalized phrases as entity nodes and links entities that
//! co-occur in a sentence, labeling the relation with the first
//! content word between them. Deliberately shallow: deployments wanting
//! real entity recognition plug their own [`GraphExtractor`] in.

use std::collections::HashSet;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use trellis_core::error::TrellisResult;
use trellis_core::traits::{ExtractedRecords, GraphExtractor};
use trellis_core::types::{Edge, Metadata, Node};

use crate::handlers::HandlerRegistry;

static SENTENCE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+\s*").expect("valid regex"));

/// Capitalized phrases, allowing common lowercase name particles in the
/// middle ("Guido van Rossum").
static ENTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"[A-Z][A-Za-z0-9-]*(?:\s+(?:van|von|de|del|der|da|di|la|le)\s+[A-Z][A-Za-z0-9-]*|\s+[A-Z][A-Za-z0-9-]*)*",
    )
    .expect("valid regex")
});

static DETERMINER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(the|a|an)\s+").expect("valid regex"));

/// Pronouns and generic words that make useless graph nodes.
const STOP_ENTITIES: &[&str] = &[
    "it", "he", "she", "they", "we", "you", "i", "this", "that", "these", "those", "one", "who",
    "which", "its", "his", "her", "their",
];

/// Function words skipped when deriving a relation label from the text
/// between two entities.
const STOP_RELATIONS: &[&str] = &[
    "a", "an", "the", "is", "are", "am", "was", "were", "be", "been", "being", "has", "have",
    "had", "will", "would", "can", "could", "may", "might", "must", "shall", "should", "do",
    "does", "did", "by", "of", "to", "in", "on", "at", "for", "with", "from", "and", "or", "as",
    "its", "their", "his", "her", "also", "first", "later", "then", "not",
];

/// Relation label used when nothing usable connects two entities.
const DEFAULT_RELATION: &str = "related_to";

/// Lightweight extraction collaborator built on format handlers and
/// capitalization/co-occurrence heuristics.
pub struct PatternExtractor {
    registry: HandlerRegistry,
}

impl PatternExtractor {
    /// Create an extractor with the default handler chain.
    pub fn new() -> Self {
        Self {
            registry: HandlerRegistry::default(),
        }
    }

    /// Create an extractor with a custom handler chain.
    pub fn with_registry(registry: HandlerRegistry) -> Self {
        Self { registry }
    }

    fn extract_records(&self, text: &str) -> ExtractedRecords {
        let cleaned = self.registry.preprocess(text);

        let mut records = ExtractedRecords::default();
        let mut seen_nodes: HashSet<String> = HashSet::new();
        let mut seen_edges: HashSet<(String, String, String)> = HashSet::new();

        for sentence in SENTENCE_RE.split(&cleaned) {
            // Entity mentions with their spans, so the connecting text
            // between two mentions can label the relation.
            let mentions: Vec<(String, usize, usize)> = ENTITY_RE
                .find_iter(sentence)
                .filter_map(|m| {
                    let name = DETERMINER_RE.replace(m.as_str(), "").trim().to_string();
                    if name.len() < 2 || STOP_ENTITIES.contains(&name.to_lowercase().as_str()) {
                        return None;
                    }
                    Some((name, m.start(), m.end()))
                })
                .collect();

            for (name, _, _) in &mentions {
                if seen_nodes.insert(name.clone()) {
                    let mut metadata = Metadata::new();
                    metadata.insert("label".to_string(), serde_json::json!("CONCEPT"));
                    records
                        .nodes
                        .push(Node::new(name.clone(), name.clone()).with_metadata(metadata));
                }
            }

            for pair in mentions.windows(2) {
                let (source, _, source_end) = &pair[0];
                let (target, target_start, _) = &pair[1];
                if source == target {
                    continue;
                }

                let connecting = &sentence[*source_end..*target_start];
                let relation = relation_label(connecting);

                let key = (source.clone(), target.clone(), relation.clone());
                if seen_edges.insert(key) {
                    records
                        .edges
                        .push(Edge::new(source.clone(), target.clone(), relation));
                }
            }
        }

        records
    }
}

impl Default for PatternExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// First content word between two entity mentions, lowercased;
/// `related_to` when only function words connect them.
fn relation_label(connecting: &str) -> String {
    connecting
        .split_whitespace()
        .map(|token| {
            token
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .find(|token| token.len() >= 2 && !STOP_RELATIONS.contains(&token.as_str()))
        .unwrap_or_else(|| DEFAULT_RELATION.to_string())
}

#[async_trait]
impl GraphExtractor for PatternExtractor {
    async fn extract(&self, text: &str) -> TrellisResult<ExtractedRecords> {
        let records = self.extract_records(text);
        debug!(
            nodes = records.nodes.len(),
            edges = records.edges.len(),
            "pattern extraction complete"
        );
        Ok(records)
    }
}
