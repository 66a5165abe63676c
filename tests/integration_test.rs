//! Integration test: config load, sample locations, validation, history store.

use quake_risk::{
    config::{ConfigError, EngineConfig},
    history::PredictionLog,
    logging::{LogEvent, StructuredLogger},
    predictor::PredictionResult,
    query::{Query, SampleLocation, ValidationError},
    RiskLevel,
};
use std::io::Write;
use std::path::Path;

#[test]
fn config_load_default() {
    let c = EngineConfig::load(Path::new("nonexistent.json"));
    assert!(c.latency.enabled);
    assert_eq!(c.latency.min_ms, 25);
    assert_eq!(c.latency.max_ms, 75);
    assert!(!c.history.enabled);
    assert_eq!(c.log.level, "info");
}

#[test]
fn config_load_partial_json() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"latency": {{"enabled": false}}, "history": {{"enabled": true, "path": "h.db"}}}}"#).unwrap();
    let c = EngineConfig::load(file.path());
    assert!(!c.latency.enabled);
    assert_eq!(c.latency.min_ms, 25);
    assert!(c.history.enabled);
    assert_eq!(c.history.path, Path::new("h.db"));
    assert!(!c.log.json);
}

#[test]
fn config_load_garbage_falls_back() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "not json").unwrap();
    let c = EngineConfig::load(file.path());
    assert!(c.latency.enabled);
}

#[test]
fn config_malformed_is_reported() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "not json").unwrap();
    let err = EngineConfig::try_load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains(&file.path().display().to_string()));
}

#[test]
fn config_missing_file_is_not_an_error() {
    let c = EngineConfig::try_load(Path::new("nonexistent.json")).unwrap();
    assert_eq!(c.latency.max_ms, 75);
}

#[test]
fn emit_json_writes_one_line() {
    let q = SampleLocation::find("tokyo").unwrap().to_query();
    let r = PredictionResult::fallback(3);
    let mut out = Vec::new();
    StructuredLogger::emit_json(&LogEvent::prediction(&q, &r, Some("id-1")), &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.ends_with('\n'));
    assert_eq!(text.lines().count(), 1);
    let v: serde_json::Value = serde_json::from_str(text.trim_end()).unwrap();
    assert_eq!(v["risk"], "medium");
    assert_eq!(v["id"], "id-1");
    assert_eq!(v["query"]["daysSinceLastEq"], 1);
}

struct ClosedPipe;

impl Write for ClosedPipe {
    fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
        Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn emit_json_propagates_write_errors() {
    let r = PredictionResult::fallback(0);
    let err = StructuredLogger::emit_json(&r, &mut ClosedPipe).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::BrokenPipe);
}

#[test]
fn sample_locations() {
    assert_eq!(SampleLocation::all().len(), 3);
    let tokyo = SampleLocation::find("Tokyo").unwrap();
    assert_eq!(tokyo.depth, 80.4);
    assert_eq!(tokyo.magnitude, 6.2);
    assert_eq!(tokyo.days_since_last_eq, 1);
    assert!(SampleLocation::find("osaka").is_none());
    for s in SampleLocation::all() {
        assert_eq!(s.to_query().validate(), Ok(()));
    }
}

#[test]
fn query_json_field_names() {
    let q: Query = serde_json::from_str(
        r#"{"latitude": 35.0, "longitude": 139.0, "depth": 10.0, "magnitude": 5.0, "daysSinceLastEq": 3}"#,
    )
    .unwrap();
    assert_eq!(q.days_since_last_eq, 3);
}

#[test]
fn validation_rejects_out_of_domain() {
    let base = SampleLocation::find("hiroshima").unwrap().to_query();

    let outside = Query { latitude: 0.0, longitude: 0.0, ..base };
    assert!(matches!(outside.validate(), Err(ValidationError::OutsideJapan { .. })));

    let negative = Query { days_since_last_eq: -1, ..base };
    assert_eq!(negative.validate(), Err(ValidationError::NegativeDays(-1)));

    let nan = Query { depth: f64::NAN, ..base };
    assert_eq!(nan.validate(), Err(ValidationError::NonFinite { field: "depth" }));

    let edge = Query { latitude: 24.0, longitude: 146.0, ..base };
    assert_eq!(edge.validate(), Ok(()));
}

#[test]
fn history_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let log = PredictionLog::open(&dir.path().join("history.db")).unwrap();
    let tokyo = SampleLocation::find("tokyo").unwrap().to_query();
    let hiroshima = SampleLocation::find("hiroshima").unwrap().to_query();
    let high = PredictionResult {
        risk: RiskLevel::High,
        confidence: 98,
        accuracy: 95,
        details: "high".into(),
        processing_time_ms: 40,
    };
    let low = PredictionResult {
        risk: RiskLevel::Low,
        details: "low".into(),
        ..high.clone()
    };

    let first = log.insert(&tokyo, &high).unwrap();
    let second = log.insert(&hiroshima, &low).unwrap();
    assert_ne!(first, second);

    let recent = log.recent(10).unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].id, second);
    assert_eq!(recent[0].risk, RiskLevel::Low);
    assert_eq!(recent[0].query, hiroshima);
    assert_eq!(recent[1].confidence, 98);
    assert_eq!(log.recent(1).unwrap().len(), 1);

    assert_eq!(log.prune_before(i64::MAX).unwrap(), 2);
    assert!(log.recent(10).unwrap().is_empty());
}
