//! Retrieval engine orchestrating the similarity and graph collaborators.
//!
//! Anchor stage: oversampled similarity search. Expansion stage: depth-1
//! neighbor boosts per anchor. Fusion and ranking live in
//! [`super::fusion`].

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TrellisResult;
use crate::traits::{GraphStore, SimilaritySource};
use crate::types::{RankedResult, SearchMode};

use super::fusion::{self, FusionWeights};

/// Configuration for retrieval operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Fusion weights used in hybrid mode.
    pub weights: FusionWeights,
    /// Anchor oversampling: the anchor stage requests
    /// `oversample_factor × top_k` candidates so graph connections can
    /// bubble up past the cut.
    pub oversample_factor: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            weights: FusionWeights::default(),
            oversample_factor: 2,
        }
    }
}

/// Combines the similarity collaborator and the graph store into one
/// ranked result list per query.
pub struct HybridRetriever {
    similarity: Arc<dyn SimilaritySource>,
    graph: Arc<dyn GraphStore>,
    config: RetrievalConfig,
}

impl HybridRetriever {
    /// Create a retriever with the default configuration.
    pub fn new(similarity: Arc<dyn SimilaritySource>, graph: Arc<dyn GraphStore>) -> Self {
        Self {
            similarity,
            graph,
            config: RetrievalConfig::default(),
        }
    }

    /// Override the retrieval configuration.
    pub fn with_config(mut self, config: RetrievalConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the full fusion pipeline with explicit weights.
    ///
    /// An empty similarity result yields an empty fused result; an anchor
    /// with no neighbors simply contributes no boosts.
    pub async fn fuse(
        &self,
        query: &str,
        weights: FusionWeights,
        top_k: usize,
    ) -> TrellisResult<Vec<RankedResult>> {
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let anchor_limit = top_k * self.config.oversample_factor.max(1);
        let anchors = self.similarity.search(query, anchor_limit).await?;
        if anchors.is_empty() {
            debug!(query, "similarity returned no anchors");
            return Ok(Vec::new());
        }

        let mut boosts: HashMap<String, f32> = HashMap::new();
        for anchor in &anchors {
            let neighbors = self.graph.neighbors(&anchor.id, 1).await?;
            for neighbor in neighbors {
                fusion::accumulate_boost(&mut boosts, neighbor, anchor.score);
            }
        }
        debug!(
            anchors = anchors.len(),
            boosted = boosts.len(),
            "fusing candidates"
        );

        Ok(fusion::fuse(&anchors, &boosts, weights, top_k))
    }

    /// Query boundary dispatch: `vector` bypasses fusion entirely,
    /// `graph` fuses with weights (0, 1), `hybrid` uses the configured
    /// weights.
    pub async fn search(
        &self,
        query: &str,
        mode: SearchMode,
        top_k: usize,
    ) -> TrellisResult<Vec<RankedResult>> {
        match mode {
            SearchMode::Vector => {
                let hits = self.similarity.search(query, top_k).await?;
                Ok(hits
                    .into_iter()
                    .map(|hit| RankedResult {
                        id: hit.id,
                        score: hit.score,
                        reason: format!("Vector({:.2})", hit.score),
                        metadata: hit.metadata,
                    })
                    .collect())
            }
            SearchMode::Graph => self.fuse(query, FusionWeights::graph_only(), top_k).await,
            SearchMode::Hybrid => self.fuse(query, self.config.weights, top_k).await,
        }
    }
}
