//! Feature normalization and the embedded reference table.

mod reference;

pub use reference::{ReferenceSample, ReferenceTable};

use serde::{Deserialize, Serialize};

/// Depth normalization span: 0..100 km.
pub const DEPTH_SPAN_KM: f64 = 100.0;
/// Magnitude normalization range: 3..8.
pub const MAGNITUDE_FLOOR: f64 = 3.0;
pub const MAGNITUDE_SPAN: f64 = 5.0;
/// Recency window in days; activity older than this scores zero.
pub const RECENCY_WINDOW_DAYS: f64 = 30.0;

/// Normalized (depth, magnitude, recency) triple, each component in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub depth: f64,
    pub magnitude: f64,
    pub recency: f64,
}

impl FeatureVector {
    pub fn as_array(&self) -> [f64; 3] {
        [self.depth, self.magnitude, self.recency]
    }

    pub fn is_finite(&self) -> bool {
        self.as_array().iter().all(|v| v.is_finite())
    }
}

/// Map raw measurements into [0, 1]. Out-of-range input is clamped, never rejected.
/// More recent activity (fewer days) yields a higher recency value.
pub fn normalize(depth: f64, magnitude: f64, days_since_last: f64) -> FeatureVector {
    FeatureVector {
        depth: unit_clamp(depth / DEPTH_SPAN_KM),
        magnitude: unit_clamp((magnitude - MAGNITUDE_FLOOR) / MAGNITUDE_SPAN),
        recency: unit_clamp((RECENCY_WINDOW_DAYS - days_since_last) / RECENCY_WINDOW_DAYS),
    }
}

// NaN passes through so the engine can detect it downstream.
fn unit_clamp(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}
