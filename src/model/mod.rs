//! Distance-based estimators over the reference table.

mod neighborhood;

pub use neighborhood::{weighted_distance, Neighbor, Neighborhood};

/// Per-axis weights, applied to each difference before squaring.
pub const DEPTH_WEIGHT: f64 = 0.30;
pub const MAGNITUDE_WEIGHT: f64 = 0.50;
pub const RECENCY_WEIGHT: f64 = 0.20;

/// Neighbors averaged by the k-NN estimator.
pub const K_NEAREST: usize = 7;
