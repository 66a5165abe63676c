//! Async entry point: simulated latency, timing, result assembly, and the fallback
//! that keeps every failure inside the engine.

use crate::config::{EngineConfig, LatencyConfig};
use crate::model::K_NEAREST;
use crate::query::Query;
use crate::risk::{Assessment, RiskEngine, RiskLevel};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

pub const FALLBACK_CONFIDENCE: u8 = 85;
pub const FALLBACK_ACCURACY: u8 = 90;
pub const FALLBACK_DETAILS: &str = "Risk model temporarily unavailable, using fallback prediction.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub risk: RiskLevel,
    /// 0–98
    pub confidence: u8,
    pub accuracy: u8,
    pub details: String,
    pub processing_time_ms: u64,
}

impl PredictionResult {
    pub fn fallback(processing_time_ms: u64) -> Self {
        Self {
            risk: RiskLevel::Medium,
            confidence: FALLBACK_CONFIDENCE,
            accuracy: FALLBACK_ACCURACY,
            details: FALLBACK_DETAILS.to_string(),
            processing_time_ms,
        }
    }

    fn from_assessment(a: &Assessment, processing_time_ms: u64) -> Self {
        Self {
            risk: a.level,
            confidence: a.confidence_percent(),
            accuracy: a.accuracy_percent(),
            details: explain(a),
            processing_time_ms,
        }
    }
}

/// Human-readable summary. Contains no timing so it is stable for a given input.
pub fn explain(a: &Assessment) -> String {
    format!(
        "Weighted similarity + k-NN blend (k={}) over {} reference samples. \
         Depth impact ({:.1}%), Magnitude factor ({:.1}%), Temporal pattern ({:.1}%).",
        K_NEAREST,
        a.reference_size,
        a.features.depth * 100.0,
        a.features.magnitude * 100.0,
        a.features.recency * 100.0,
    )
}

#[derive(Debug, Clone)]
pub struct Predictor {
    engine: Arc<RiskEngine>,
    latency: LatencyConfig,
}

impl Predictor {
    pub fn new(engine: RiskEngine, latency: LatencyConfig) -> Self {
        Self {
            engine: Arc::new(engine),
            latency,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(RiskEngine::new(), config.latency.clone())
    }

    pub fn engine(&self) -> &RiskEngine {
        &self.engine
    }

    /// Never fails: computation faults produce [`PredictionResult::fallback`].
    pub async fn predict(&self, query: &Query) -> PredictionResult {
        let started = Instant::now();

        if let Some(delay) = self.next_delay() {
            tokio::time::sleep(delay).await;
        }

        match self.engine.assess(query) {
            Ok(assessment) => {
                let result = PredictionResult::from_assessment(&assessment, elapsed_ms(started));
                info!(
                    latitude = query.latitude,
                    longitude = query.longitude,
                    risk = %result.risk,
                    confidence = result.confidence,
                    accuracy = result.accuracy,
                    override_rule = assessment.override_rule,
                    processing_time_ms = result.processing_time_ms,
                    "prediction"
                );
                result
            }
            Err(e) => {
                warn!(error = %e, ?query, "prediction failed; returning fallback");
                PredictionResult::fallback(elapsed_ms(started))
            }
        }
    }

    /// Evaluate queries concurrently; results come back in input order.
    pub async fn predict_many(&self, queries: Vec<Query>) -> Vec<PredictionResult> {
        let started = Instant::now();
        let handles: Vec<_> = queries
            .into_iter()
            .map(|q| {
                let predictor = self.clone();
                tokio::spawn(async move { predictor.predict(&q).await })
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(r) => results.push(r),
                Err(e) => {
                    warn!(error = %e, "prediction task failed; returning fallback");
                    results.push(PredictionResult::fallback(elapsed_ms(started)));
                }
            }
        }
        results
    }

    fn next_delay(&self) -> Option<Duration> {
        if !self.latency.enabled {
            return None;
        }
        let (min_ms, max_ms) = (self.latency.min_ms, self.latency.max_ms);
        let ms = if max_ms > min_ms {
            rand::thread_rng().gen_range(min_ms..max_ms)
        } else {
            min_ms
        };
        Some(Duration::from_millis(ms))
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
