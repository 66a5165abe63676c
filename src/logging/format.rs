//! JSON log lines: one JSON object per line (ndjson) for ingestion and audit.

use crate::predictor::PredictionResult;
use crate::query::Query;
use chrono::Utc;
use serde::Serialize;
use std::io::{self, Write};
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Serialize)]
pub struct LogEvent<'a> {
    pub ts: String,
    pub level: &'a str,
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<&'a str>,
    pub query: &'a Query,
    pub risk: &'a str,
    pub confidence: u8,
    pub accuracy: u8,
    pub processing_time_ms: u64,
    pub details: &'a str,
}

impl<'a> LogEvent<'a> {
    /// Record for a finished prediction; `id` is set when it was saved to history.
    pub fn prediction(query: &'a Query, result: &'a PredictionResult, id: Option<&'a str>) -> Self {
        Self {
            ts: Utc::now().to_rfc3339(),
            level: "INFO",
            message: "prediction",
            id,
            query,
            risk: result.risk.as_str(),
            confidence: result.confidence,
            accuracy: result.accuracy,
            processing_time_ms: result.processing_time_ms,
            details: &result.details,
        }
    }
}

/// Process-wide tracing setup plus direct ndjson output for command results.
pub struct StructuredLogger;

impl StructuredLogger {
    /// Install the global subscriber on stderr, keeping stdout for command output.
    /// `RUST_LOG` overrides `default_level`.
    pub fn init(json: bool, default_level: &str) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
        let json_layer = json.then(|| fmt::layer().json().with_writer(io::stderr));
        let text_layer = (!json).then(|| fmt::layer().with_target(false).with_writer(io::stderr));
        tracing_subscriber::registry()
            .with(filter)
            .with(json_layer)
            .with(text_layer)
            .init();
    }

    /// Write `event` as one JSON line.
    pub fn emit_json(event: &impl Serialize, w: &mut impl Write) -> io::Result<()> {
        serde_json::to_writer(&mut *w, event)?;
        w.write_all(b"\n")
    }
}
