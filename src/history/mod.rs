//! Local log of past predictions.

mod store;

pub use store::{HistoryRecord, PredictionLog};
