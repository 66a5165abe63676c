//! One pass over the reference table: weighted distances, similarities, and the
//! distance ranking shared by the k-NN estimator and confidence scoring.

use super::{DEPTH_WEIGHT, MAGNITUDE_WEIGHT, RECENCY_WEIGHT};
use crate::features::{FeatureVector, ReferenceTable};
use crate::risk::RiskLevel;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Position in the reference table
    pub index: usize,
    pub distance: f64,
    /// 1 / (1 + distance), in (0, 1]
    pub similarity: f64,
    pub risk: RiskLevel,
}

#[derive(Debug, Clone)]
pub struct Neighborhood {
    ranked: Vec<Neighbor>,
    total_similarity: f64,
    weighted_risk: f64,
}

/// Weighted Euclidean distance between two feature vectors.
pub fn weighted_distance(a: &FeatureVector, b: &FeatureVector) -> f64 {
    let dd = (a.depth - b.depth) * DEPTH_WEIGHT;
    let dm = (a.magnitude - b.magnitude) * MAGNITUDE_WEIGHT;
    let dr = (a.recency - b.recency) * RECENCY_WEIGHT;
    (dd * dd + dm * dm + dr * dr).sqrt()
}

impl Neighborhood {
    /// Score `query` against every sample in `table`.
    pub fn scan(query: &FeatureVector, table: &ReferenceTable) -> Self {
        let mut ranked = Vec::with_capacity(table.len());
        let mut total_similarity = 0.0;
        let mut weighted_risk = 0.0;

        for (index, (sample, features)) in table.iter().enumerate() {
            let distance = weighted_distance(query, features);
            let similarity = 1.0 / (1.0 + distance);
            total_similarity += similarity;
            weighted_risk += similarity * sample.risk.ordinal() as f64;
            ranked.push(Neighbor {
                index,
                distance,
                similarity,
                risk: sample.risk,
            });
        }

        // Stable: equal distances keep table order.
        ranked.sort_by(|a, b| a.distance.total_cmp(&b.distance));

        Self {
            ranked,
            total_similarity,
            weighted_risk,
        }
    }

    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }

    /// Sum of similarities over the whole table.
    pub fn total_similarity(&self) -> f64 {
        self.total_similarity
    }

    /// Similarity-weighted mean risk ordinal over the whole table.
    pub fn weighted_average_risk(&self) -> f64 {
        self.weighted_risk / self.total_similarity
    }

    /// Up to `k` samples, closest first.
    pub fn nearest(&self, k: usize) -> &[Neighbor] {
        &self.ranked[..k.min(self.ranked.len())]
    }

    /// Mean risk ordinal of the `k` nearest samples (all of them if fewer than `k`).
    pub fn knn_risk(&self, k: usize) -> f64 {
        let nearest = self.nearest(k);
        if nearest.is_empty() {
            return 0.0;
        }
        let sum: f64 = nearest.iter().map(|n| n.risk.ordinal() as f64).sum();
        sum / nearest.len() as f64
    }
}
