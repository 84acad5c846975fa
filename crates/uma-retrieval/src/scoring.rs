// SPDX-FileCopyrightText: 2026 Uma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-backend score normalization and the merged ordering.

use std::cmp::Ordering;

use uma_core::DocumentMatch;

/// Min-max normalize a batch of scores into [0, 1].
///
/// A batch whose scores are all equal (a single hit included) maps to 1.0:
/// every hit is the best the backend had to offer.
pub fn min_max_normalize(scores: &[f64]) -> Vec<f64> {
    let Some(min) = scores.iter().copied().reduce(f64::min) else {
        return Vec::new();
    };
    let max = scores.iter().copied().fold(min, f64::max);
    let range = max - min;
    if range <= f64::EPSILON {
        return vec![1.0; scores.len()];
    }
    scores.iter().map(|s| (s - min) / range).collect()
}

/// Merged ordering: fused normalized score descending, then primary backend first,
/// then the backend's own rank.
pub fn rank_order(a: &DocumentMatch, b: &DocumentMatch) -> Ordering {
    b.normalized_score
        .total_cmp(&a.normalized_score)
        .then(a.backend_index.cmp(&b.backend_index))
        .then(a.backend_rank.cmp(&b.backend_rank))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uma_core::Metadata;

    fn doc(weighted: f64, index: usize, rank: usize) -> DocumentMatch {
        DocumentMatch {
            content: format!("{index}-{rank}"),
            source_backend: format!("b{index}"),
            backend_index: index,
            backend_rank: rank,
            raw_score: weighted,
            batch_score: weighted,
            normalized_score: weighted,
            metadata: Metadata::new(),
        }
    }

    #[test]
    fn normalizes_to_unit_interval() {
        let normalized = min_max_normalize(&[2.0, 4.0, 3.0]);
        assert_eq!(normalized, vec![0.0, 1.0, 0.5]);
    }

    #[test]
    fn negative_scores_normalize() {
        let normalized = min_max_normalize(&[-1.5, -0.5]);
        assert_eq!(normalized, vec![0.0, 1.0]);
    }

    #[test]
    fn equal_scores_become_one() {
        assert_eq!(min_max_normalize(&[0.3, 0.3]), vec![1.0, 1.0]);
        assert_eq!(min_max_normalize(&[7.0]), vec![1.0]);
        assert!(min_max_normalize(&[]).is_empty());
    }

    #[test]
    fn ties_prefer_primary_then_rank() {
        let mut docs = vec![doc(0.5, 1, 0), doc(0.5, 0, 2), doc(0.9, 1, 1), doc(0.5, 0, 1)];
        docs.sort_by(rank_order);
        let order: Vec<_> = docs.iter().map(|d| d.content.as_str()).collect();
        assert_eq!(order, vec!["1-1", "0-1", "0-2", "1-0"]);
    }
}
