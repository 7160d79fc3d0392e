//! Score fusion for hybrid retrieval.
//!
//! Combines anchor similarity scores with accumulated graph-proximity
//! boosts into a deterministic ranking.

use std::collections::HashMap;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::types::{RankedResult, SimilarityHit};

/// Boost contributed to a neighbor per anchor: `0.3 × anchor similarity`.
pub const NEIGHBOR_BOOST: f32 = 0.3;

/// Per-candidate cap applied to the summed boost, before weighting.
/// Accumulation is uncapped, so fan-in degree saturates quickly on purpose.
pub const BOOST_CAP: f32 = 1.0;

/// Weights for the two fusion signals.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FusionWeights {
    /// Weight for the similarity score.
    pub vector: f32,
    /// Weight for the capped graph boost.
    pub graph: f32,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            vector: 0.5,
            graph: 0.5,
        }
    }
}

impl FusionWeights {
    /// Create custom weights.
    pub fn new(vector: f32, graph: f32) -> Self {
        Self { vector, graph }
    }

    /// Pure similarity ranking; graph-only candidates cannot surface.
    pub fn vector_only() -> Self {
        Self {
            vector: 1.0,
            graph: 0.0,
        }
    }

    /// Graph proximity only. Anchors still run — their similarity scores
    /// feed the boost formula even though the vector part is excluded.
    pub fn graph_only() -> Self {
        Self {
            vector: 0.0,
            graph: 1.0,
        }
    }

    /// Validate that both weights are non-negative.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.vector < 0.0 || self.graph < 0.0 {
            return Err("Fusion weights must be non-negative");
        }
        Ok(())
    }
}

/// Accumulate the boost a neighbor earns from one anchor.
///
/// Additive across anchors: an id that neighbors several anchors collects
/// every contribution before the cap is applied in [`fuse`].
pub fn accumulate_boost(boosts: &mut HashMap<String, f32>, neighbor: String, anchor_score: f32) {
    *boosts.entry(neighbor).or_insert(0.0) += NEIGHBOR_BOOST * anchor_score;
}

/// Fuse anchors and accumulated boosts into a ranked list of at most
/// `top_k` results.
///
/// For each candidate (union of anchor ids and boosted ids):
/// `score = similarity × vector_weight + min(boost, 1.0) × graph_weight`.
/// Sorted by score descending; ties broken by ascending id so the ordering
/// is reproducible.
pub fn fuse(
    anchors: &[SimilarityHit],
    boosts: &HashMap<String, f32>,
    weights: FusionWeights,
    top_k: usize,
) -> Vec<RankedResult> {
    let mut anchor_index: HashMap<&str, &SimilarityHit> = HashMap::new();
    for hit in anchors {
        anchor_index.insert(hit.id.as_str(), hit);
    }

    let mut candidates: Vec<&str> = anchor_index.keys().copied().collect();
    for id in boosts.keys() {
        if !anchor_index.contains_key(id.as_str()) {
            candidates.push(id.as_str());
        }
    }

    let mut results: Vec<RankedResult> = candidates
        .into_iter()
        .map(|id| {
            let anchor = anchor_index.get(id);
            let vector_part = anchor.map_or(0.0, |hit| hit.score * weights.vector);
            let graph_part =
                boosts.get(id).map_or(0.0, |raw| raw.min(BOOST_CAP)) * weights.graph;

            let mut reason = Vec::new();
            if vector_part > 0.0 {
                reason.push(format!("Vector({vector_part:.2})"));
            }
            if graph_part > 0.0 {
                reason.push(format!("GraphNeighbor({graph_part:.2})"));
            }

            RankedResult {
                id: id.to_string(),
                score: vector_part + graph_part,
                reason: reason.join(" + "),
                metadata: anchor.map(|hit| hit.metadata.clone()).unwrap_or_default(),
            }
        })
        .collect();

    results.sort_by(|a, b| {
        OrderedFloat(b.score)
            .cmp(&OrderedFloat(a.score))
            .then_with(|| a.id.cmp(&b.id))
    });
    results.truncate(top_k);
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(id: &str, score: f32) -> SimilarityHit {
        SimilarityHit::new(id, score)
    }

    #[test]
    fn test_fuse_worked_example() {
        // Graph has edge A->B; anchors are A (0.9) and B (0.4). With
        // symmetric depth-1 neighbors each anchor boosts the other.
        let anchors = vec![hit("A", 0.9), hit("B", 0.4)];
        let mut boosts = HashMap::new();
        accumulate_boost(&mut boosts, "B".to_string(), 0.9);
        accumulate_boost(&mut boosts, "A".to_string(), 0.4);

        let results = fuse(&anchors, &boosts, FusionWeights::default(), 2);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "A");
        // 0.9*0.5 + min(0.3*0.4, 1)*0.5 = 0.45 + 0.06
        assert!((results[0].score - 0.51).abs() < 1e-4);
        assert_eq!(results[1].id, "B");
        // 0.4*0.5 + min(0.3*0.9, 1)*0.5 = 0.2 + 0.135
        assert!((results[1].score - 0.335).abs() < 1e-4);
    }

    #[test]
    fn test_vector_only_reduces_to_similarity_order() {
        let anchors = vec![hit("c", 0.9), hit("a", 0.7), hit("b", 0.5)];
        let mut boosts = HashMap::new();
        // A graph-only candidate must not surface with graph weight 0.
        boosts.insert("z".to_string(), 0.8);

        let results = fuse(&anchors, &boosts, FusionWeights::vector_only(), 3);

        let ids: Vec<_> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_boost_capped_after_summation() {
        let anchors = vec![hit("a", 1.0)];
        let mut boosts = HashMap::new();
        // Neighbor of many high-similarity anchors: raw sum far above 1.
        for _ in 0..20 {
            accumulate_boost(&mut boosts, "n".to_string(), 1.0);
        }
        assert!(boosts["n"] > BOOST_CAP);

        let results = fuse(&anchors, &boosts, FusionWeights::new(0.0, 1.0), 2);
        let n = results.iter().find(|r| r.id == "n").unwrap();
        assert!((n.score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_ties_break_lexically() {
        let anchors = vec![hit("delta", 0.5), hit("alpha", 0.5), hit("bravo", 0.5)];
        let results = fuse(&anchors, &HashMap::new(), FusionWeights::vector_only(), 3);

        let ids: Vec<_> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["alpha", "bravo", "delta"]);
    }

    #[test]
    fn test_reason_omits_zero_parts() {
        let anchors = vec![hit("a", 0.8)];
        let mut boosts = HashMap::new();
        boosts.insert("n".to_string(), 0.24);

        let results = fuse(&anchors, &boosts, FusionWeights::default(), 10);

        let a = results.iter().find(|r| r.id == "a").unwrap();
        assert_eq!(a.reason, "Vector(0.40)");
        let n = results.iter().find(|r| r.id == "n").unwrap();
        assert_eq!(n.reason, "GraphNeighbor(0.12)");
    }

    #[test]
    fn test_anchor_that_is_also_neighbor_gets_both_parts() {
        let anchors = vec![hit("a", 0.6)];
        let mut boosts = HashMap::new();
        boosts.insert("a".to_string(), 0.3);

        let results = fuse(&anchors, &boosts, FusionWeights::default(), 1);
        assert!((results[0].score - (0.3 + 0.15)).abs() < 1e-6);
        assert_eq!(results[0].reason, "Vector(0.30) + GraphNeighbor(0.15)");
    }

    #[test]
    fn test_truncates_to_top_k() {
        let anchors: Vec<_> = (0..10)
            .map(|i| hit(&format!("n{i}"), 1.0 - i as f32 * 0.05))
            .collect();
        let results = fuse(&anchors, &HashMap::new(), FusionWeights::default(), 3);
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_weight_validation() {
        assert!(FusionWeights::new(0.5, 0.5).validate().is_ok());
        assert!(FusionWeights::new(-0.1, 0.5).validate().is_err());
    }
}
