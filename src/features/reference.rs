//! Fixed labeled samples every prediction is scored against.
//! Order matters: k-NN ties are broken by table position.

use super::{normalize, FeatureVector};
use crate::risk::{PredictError, RiskLevel};
use std::sync::{Arc, OnceLock};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceSample {
    /// km
    pub depth: f64,
    pub magnitude: f64,
    pub days_since_last: u32,
    pub risk: RiskLevel,
}

impl ReferenceSample {
    pub const fn new(depth: f64, magnitude: f64, days_since_last: u32, risk: RiskLevel) -> Self {
        Self {
            depth,
            magnitude,
            days_since_last,
            risk,
        }
    }

    pub fn features(&self) -> FeatureVector {
        normalize(self.depth, self.magnitude, self.days_since_last as f64)
    }
}

use crate::risk::RiskLevel::{High, Low, Medium};

const BUILTIN_SAMPLES: [ReferenceSample; 35] = [
    // Observed cities
    ReferenceSample::new(55.3, 4.8, 5, Medium), // Sapporo
    ReferenceSample::new(60.1, 5.2, 2, High),   // Sendai
    ReferenceSample::new(80.4, 5.0, 1, High),   // Tokyo
    ReferenceSample::new(78.6, 4.9, 1, Medium), // Yokohama
    ReferenceSample::new(50.7, 4.6, 3, Medium), // Nagoya
    ReferenceSample::new(45.2, 4.5, 4, Medium), // Osaka
    ReferenceSample::new(48.0, 4.4, 6, Low),    // Kyoto
    ReferenceSample::new(70.2, 5.3, 2, High),   // Kobe
    ReferenceSample::new(42.8, 4.2, 10, Low),   // Hiroshima
    ReferenceSample::new(38.7, 4.3, 12, Low),   // Fukuoka
    ReferenceSample::new(60.9, 4.7, 7, Low),    // Kagoshima
    ReferenceSample::new(45.5, 4.1, 8, Low),    // Naha
    ReferenceSample::new(65.0, 4.9, 5, Medium), // Aomori
    ReferenceSample::new(63.3, 4.8, 6, Medium), // Akita
    ReferenceSample::new(67.2, 5.0, 3, Medium), // Niigata
    ReferenceSample::new(72.6, 5.1, 1, High),   // Toyama
    ReferenceSample::new(68.4, 4.6, 4, Medium), // Nagano
    ReferenceSample::new(52.7, 4.7, 3, Medium), // Shizuoka
    ReferenceSample::new(41.3, 4.3, 7, Low),    // Matsue
    ReferenceSample::new(60.5, 4.9, 0, High),   // Obihiro
    // High-risk patterns
    ReferenceSample::new(75.0, 5.4, 1, High),
    ReferenceSample::new(82.1, 5.6, 0, High),
    ReferenceSample::new(85.0, 5.5, 0, High),
    ReferenceSample::new(78.0, 5.3, 1, High),
    ReferenceSample::new(90.0, 5.7, 0, High),
    // Low-risk patterns
    ReferenceSample::new(35.0, 3.8, 15, Low),
    ReferenceSample::new(40.5, 4.0, 14, Low),
    ReferenceSample::new(30.0, 3.5, 20, Low),
    ReferenceSample::new(35.5, 3.9, 18, Low),
    ReferenceSample::new(43.2, 4.0, 15, Low),
    ReferenceSample::new(39.8, 4.1, 16, Low),
    // Medium-risk patterns
    ReferenceSample::new(58.3, 4.5, 5, Medium),
    ReferenceSample::new(62.7, 4.7, 4, Medium),
    ReferenceSample::new(55.0, 4.6, 6, Medium),
    ReferenceSample::new(64.0, 4.8, 5, Medium),
];

static BUILTIN: OnceLock<Arc<ReferenceTable>> = OnceLock::new();

/// Immutable, non-empty sample set with each sample's feature vector precomputed.
#[derive(Debug, Clone)]
pub struct ReferenceTable {
    samples: Vec<ReferenceSample>,
    features: Vec<FeatureVector>,
}

impl ReferenceTable {
    /// Build a table from arbitrary samples. Rejects an empty set.
    pub fn new(samples: Vec<ReferenceSample>) -> Result<Self, PredictError> {
        if samples.is_empty() {
            return Err(PredictError::EmptyReferenceTable);
        }
        Ok(Self::from_samples(samples))
    }

    /// The embedded table, built on first use and shared by every engine.
    pub fn builtin() -> Arc<ReferenceTable> {
        BUILTIN
            .get_or_init(|| Arc::new(Self::from_samples(BUILTIN_SAMPLES.to_vec())))
            .clone()
    }

    fn from_samples(samples: Vec<ReferenceSample>) -> Self {
        let features = samples.iter().map(ReferenceSample::features).collect();
        Self { samples, features }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false for a constructed table; kept for the `len` convention.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[ReferenceSample] {
        &self.samples
    }

    /// Samples paired with their normalized vectors, in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&ReferenceSample, &FeatureVector)> {
        self.samples.iter().zip(self.features.iter())
    }
}
