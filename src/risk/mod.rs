//! Decision stage: blend, thresholds, override rules, confidence.

mod engine;
mod rules;

pub use engine::{Assessment, PredictError, RiskEngine, RiskLevel, ParseRiskLevelError};
pub use rules::{Bound, OverrideRule, OVERRIDE_RULES};

/// Blend weights for the similarity-weighted and k-NN estimates.
pub const SIMILARITY_BLEND: f64 = 0.3;
pub const KNN_BLEND: f64 = 0.7;

/// Combined score at or above this is high risk.
pub const HIGH_THRESHOLD: f64 = 1.6;
/// Combined score at or above this is medium risk.
pub const MEDIUM_THRESHOLD: f64 = 0.7;

/// Neighbors used for the variance term of the confidence score.
pub const CONFIDENCE_NEIGHBORS: usize = 5;
pub const CONFIDENCE_CEILING: f64 = 0.98;

/// Validation accuracy of the current model version. Not derived per query.
pub const MODEL_ACCURACY: f64 = 0.95;
