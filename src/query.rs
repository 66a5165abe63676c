//! Prediction input, caller-side validation, and the built-in sample locations.

use crate::features::{normalize, FeatureVector};
use serde::{Deserialize, Serialize};

/// Japan bounding box used by callers before invoking the engine.
pub const JAPAN_LAT_RANGE: (f64, f64) = (24.0, 46.0);
pub const JAPAN_LNG_RANGE: (f64, f64) = (129.0, 146.0);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    /// Context only; not used by the classification
    pub latitude: f64,
    /// Context only; not used by the classification
    pub longitude: f64,
    /// km
    pub depth: f64,
    pub magnitude: f64,
    pub days_since_last_eq: i64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },
    #[error("days since last earthquake cannot be negative (got {0})")]
    NegativeDays(i64),
    #[error("coordinates ({latitude}, {longitude}) are outside Japan")]
    OutsideJapan { latitude: f64, longitude: f64 },
}

impl Query {
    pub fn features(&self) -> FeatureVector {
        normalize(self.depth, self.magnitude, self.days_since_last_eq as f64)
    }

    /// Range checks the engine itself never performs (it clamps instead).
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("latitude", self.latitude),
            ("longitude", self.longitude),
            ("depth", self.depth),
            ("magnitude", self.magnitude),
        ] {
            if !value.is_finite() {
                return Err(ValidationError::NonFinite { field });
            }
        }
        if self.days_since_last_eq < 0 {
            return Err(ValidationError::NegativeDays(self.days_since_last_eq));
        }
        if !within_japan(self.latitude, self.longitude) {
            return Err(ValidationError::OutsideJapan {
                latitude: self.latitude,
                longitude: self.longitude,
            });
        }
        Ok(())
    }
}

pub fn within_japan(latitude: f64, longitude: f64) -> bool {
    (JAPAN_LAT_RANGE.0..=JAPAN_LAT_RANGE.1).contains(&latitude)
        && (JAPAN_LNG_RANGE.0..=JAPAN_LNG_RANGE.1).contains(&longitude)
}

/// Preset inputs offered to users who want to try the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SampleLocation {
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
    pub depth: f64,
    pub magnitude: f64,
    pub days_since_last_eq: i64,
}

const SAMPLE_LOCATIONS: [SampleLocation; 3] = [
    SampleLocation {
        name: "tokyo",
        latitude: 35.6895,
        longitude: 139.6917,
        depth: 80.4,
        magnitude: 6.2,
        days_since_last_eq: 1,
    },
    SampleLocation {
        name: "sapporo",
        latitude: 43.0618,
        longitude: 141.3545,
        depth: 55.3,
        magnitude: 4.8,
        days_since_last_eq: 5,
    },
    SampleLocation {
        name: "hiroshima",
        latitude: 34.3853,
        longitude: 132.4553,
        depth: 42.8,
        magnitude: 4.2,
        days_since_last_eq: 10,
    },
];

impl SampleLocation {
    pub fn all() -> &'static [SampleLocation] {
        &SAMPLE_LOCATIONS
    }

    /// Case-insensitive lookup by name.
    pub fn find(name: &str) -> Option<&'static SampleLocation> {
        SAMPLE_LOCATIONS
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn to_query(&self) -> Query {
        Query {
            latitude: self.latitude,
            longitude: self.longitude,
            depth: self.depth,
            magnitude: self.magnitude,
            days_since_last_eq: self.days_since_last_eq,
        }
    }
}
