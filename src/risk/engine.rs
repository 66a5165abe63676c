//! Runs normalizer → neighborhood → decision for one query and produces a risk level
//! with its confidence.

use super::rules::{first_match, OVERRIDE_RULES};
use super::{
    CONFIDENCE_CEILING, CONFIDENCE_NEIGHBORS, HIGH_THRESHOLD, KNN_BLEND, MEDIUM_THRESHOLD,
    MODEL_ACCURACY, SIMILARITY_BLEND,
};
use crate::features::{normalize, FeatureVector, ReferenceTable};
use crate::model::{Neighborhood, K_NEAREST};
use crate::query::Query;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= HIGH_THRESHOLD {
            RiskLevel::High
        } else if score >= MEDIUM_THRESHOLD {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    /// 0 = low, 1 = medium, 2 = high
    pub fn ordinal(self) -> u8 {
        match self {
            RiskLevel::Low => 0,
            RiskLevel::Medium => 1,
            RiskLevel::High => 2,
        }
    }

    /// Values above 2 clamp to high.
    pub fn from_ordinal(ordinal: u8) -> Self {
        match ordinal {
            0 => RiskLevel::Low,
            1 => RiskLevel::Medium,
            _ => RiskLevel::High,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown risk level: {0:?}")]
pub struct ParseRiskLevelError(pub String);

impl FromStr for RiskLevel {
    type Err = ParseRiskLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            _ => Err(ParseRiskLevelError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictError {
    #[error("reference table must contain at least one sample")]
    EmptyReferenceTable,
    #[error("non-finite value in {stage}")]
    NonFinite { stage: &'static str },
}

/// Every intermediate of one assessment, for logging and explanation.
#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
    pub features: FeatureVector,
    pub weighted_risk: f64,
    pub knn_risk: f64,
    pub combined_risk: f64,
    /// Level from thresholds alone, before overrides
    pub threshold_level: RiskLevel,
    /// Name of the override rule that fired, if any
    pub override_rule: Option<&'static str>,
    pub level: RiskLevel,
    /// 0.0–0.98
    pub confidence: f64,
    pub accuracy: f64,
    pub reference_size: usize,
}

impl Assessment {
    pub fn confidence_percent(&self) -> u8 {
        to_percent(self.confidence)
    }

    pub fn accuracy_percent(&self) -> u8 {
        to_percent(self.accuracy)
    }
}

fn to_percent(fraction: f64) -> u8 {
    (fraction * 100.0).round().clamp(0.0, 100.0) as u8
}

#[derive(Debug, Clone)]
pub struct RiskEngine {
    table: Arc<ReferenceTable>,
}

impl Default for RiskEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RiskEngine {
    /// Engine over the embedded reference table.
    pub fn new() -> Self {
        Self {
            table: ReferenceTable::builtin(),
        }
    }

    pub fn with_table(table: ReferenceTable) -> Self {
        Self {
            table: Arc::new(table),
        }
    }

    pub fn table(&self) -> &ReferenceTable {
        &self.table
    }

    /// Latitude and longitude are carried on the query but do not enter the math.
    pub fn assess(&self, query: &Query) -> Result<Assessment, PredictError> {
        let features = normalize(query.depth, query.magnitude, query.days_since_last_eq as f64);
        self.assess_features(&features)
    }

    pub fn assess_features(&self, features: &FeatureVector) -> Result<Assessment, PredictError> {
        if !features.is_finite() {
            return Err(PredictError::NonFinite { stage: "normalize" });
        }
        debug!(
            depth = features.depth,
            magnitude = features.magnitude,
            recency = features.recency,
            "normalized features"
        );

        let hood = Neighborhood::scan(features, &self.table);
        let weighted_risk = hood.weighted_average_risk();
        let knn_risk = hood.knn_risk(K_NEAREST);
        let combined_risk = weighted_risk * SIMILARITY_BLEND + knn_risk * KNN_BLEND;
        if !combined_risk.is_finite() {
            return Err(PredictError::NonFinite { stage: "blend" });
        }

        let threshold_level = RiskLevel::from_score(combined_risk);
        let rule = first_match(&OVERRIDE_RULES, features);
        let level = rule.map_or(threshold_level, |r| r.bound.apply(threshold_level));
        debug!(
            weighted_risk,
            knn_risk,
            combined_risk,
            threshold = %threshold_level,
            override_rule = rule.map(|r| r.name),
            level = %level,
            "risk decision"
        );

        let confidence = confidence_score(&hood, level, self.table.len());
        if !confidence.is_finite() {
            return Err(PredictError::NonFinite { stage: "confidence" });
        }

        Ok(Assessment {
            features: *features,
            weighted_risk,
            knn_risk,
            combined_risk,
            threshold_level,
            override_rule: rule.map(|r| r.name),
            level,
            confidence,
            accuracy: MODEL_ACCURACY,
            reference_size: self.table.len(),
        })
    }
}

/// Base term rises with mean similarity to the table; the adjustment shrinks as the
/// nearest neighbors disagree with the chosen level.
fn confidence_score(hood: &Neighborhood, level: RiskLevel, table_size: usize) -> f64 {
    let nearest = hood.nearest(CONFIDENCE_NEIGHBORS);
    let target = level.ordinal() as f64;
    let variance = nearest
        .iter()
        .map(|n| (n.risk.ordinal() as f64 - target).powi(2))
        .sum::<f64>()
        / nearest.len().max(1) as f64;
    let base = 0.85 + (hood.total_similarity() / table_size as f64) * 0.10;
    let adjustment = (0.12 - variance * 0.06).max(0.0);
    (base + adjustment).min(CONFIDENCE_CEILING)
}
