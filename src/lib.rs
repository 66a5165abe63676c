//! Quake Risk — earthquake risk classification from four seismic measurements.
//!
//! Modular structure:
//! - [`features`] — Normalization and the embedded reference table
//! - [`model`] — Weighted-distance scan, similarity average, k-NN
//! - [`risk`] — Blend, thresholds, override rules, confidence
//! - [`predictor`] — Async entry point with simulated latency and fallback
//! - [`query`] — Input record, caller-side validation, sample locations
//! - [`history`] — Local SQLite prediction log
//! - [`logging`] — Structured logging

pub mod config;
pub mod features;
pub mod model;
pub mod risk;
pub mod predictor;
pub mod query;
pub mod history;
pub mod logging;

pub use config::EngineConfig;
pub use features::{normalize, FeatureVector, ReferenceSample, ReferenceTable};
pub use model::Neighborhood;
pub use risk::{Assessment, PredictError, RiskEngine, RiskLevel};
pub use predictor::{PredictionResult, Predictor};
pub use query::{Query, SampleLocation, ValidationError};
pub use history::PredictionLog;
pub use logging::StructuredLogger;
