//! Classification properties of the engine over the embedded reference table.

use quake_risk::features::{normalize, ReferenceSample, ReferenceTable};
use quake_risk::model::{weighted_distance, Neighborhood, K_NEAREST};
use quake_risk::risk::{Bound, PredictError, RiskEngine, RiskLevel, OVERRIDE_RULES};
use quake_risk::{Query, SampleLocation};

fn query(depth: f64, magnitude: f64, days: i64) -> Query {
    Query {
        latitude: 35.0,
        longitude: 139.0,
        depth,
        magnitude,
        days_since_last_eq: days,
    }
}

#[test]
fn normalize_clamps_high() {
    let f = normalize(1000.0, 100.0, -50.0);
    assert_eq!(f.as_array(), [1.0, 1.0, 1.0]);
}

#[test]
fn normalize_clamps_low() {
    let f = normalize(-10.0, -10.0, 1000.0);
    assert_eq!(f.as_array(), [0.0, 0.0, 0.0]);
}

#[test]
fn normalize_mid_range() {
    let f = normalize(50.0, 5.5, 15.0);
    assert!((f.depth - 0.5).abs() < 1e-12);
    assert!((f.magnitude - 0.5).abs() < 1e-12);
    assert!((f.recency - 0.5).abs() < 1e-12);
}

#[test]
fn builtin_table_is_fixed() {
    let table = ReferenceTable::builtin();
    assert_eq!(table.len(), 35);
    let first = table.samples()[0];
    assert_eq!(first.depth, 55.3);
    assert_eq!(first.risk, RiskLevel::Medium);
}

#[test]
fn tokyo_is_high() {
    let engine = RiskEngine::new();
    let a = engine.assess(&SampleLocation::find("tokyo").unwrap().to_query()).unwrap();
    assert_eq!(a.level, RiskLevel::High);
    assert_eq!(a.threshold_level, RiskLevel::High);
    assert_eq!(a.override_rule, Some("moderate_recent_and_deep"));
}

#[test]
fn hiroshima_is_low() {
    let engine = RiskEngine::new();
    let a = engine.assess(&query(42.8, 4.2, 10)).unwrap();
    assert_eq!(a.level, RiskLevel::Low);
    assert_eq!(a.override_rule, None);
    assert_eq!(a.confidence_percent(), 98);
}

#[test]
fn sapporo_is_medium() {
    let engine = RiskEngine::new();
    let a = engine.assess(&query(55.3, 4.8, 5)).unwrap();
    assert_eq!(a.level, RiskLevel::Medium);
}

#[test]
fn exact_match_is_nearest_neighbor() {
    let table = ReferenceTable::builtin();
    let hood = Neighborhood::scan(&normalize(42.8, 4.2, 10.0), &table);
    let nearest = hood.nearest(1)[0];
    assert_eq!(nearest.index, 8);
    assert_eq!(nearest.distance, 0.0);
    assert_eq!(nearest.similarity, 1.0);
}

#[test]
fn strong_recent_shallow_forced_high() {
    // Blend alone lands on medium for a shallow event.
    let engine = RiskEngine::new();
    let a = engine.assess(&query(10.0, 7.0, 0)).unwrap();
    assert_eq!(a.threshold_level, RiskLevel::Medium);
    assert_eq!(a.override_rule, Some("strong_and_very_recent"));
    assert_eq!(a.level, RiskLevel::High);
}

#[test]
fn strong_very_recent_always_high() {
    let engine = RiskEngine::new();
    for depth in [0.0, 10.0, 25.0, 50.0, 75.0, 100.0] {
        for magnitude in [7.0, 7.5, 8.0, 9.0] {
            let a = engine.assess(&query(depth, magnitude, 0)).unwrap();
            assert_eq!(a.level, RiskLevel::High, "depth={depth} magnitude={magnitude}");
        }
    }
}

#[test]
fn weak_and_stale_rule_matches() {
    let engine = RiskEngine::new();
    let a = engine.assess(&query(50.0, 3.5, 25)).unwrap();
    assert_eq!(a.override_rule, Some("weak_and_stale"));
    assert_eq!(a.level, RiskLevel::Low);
}

#[test]
fn weak_and_stale_caps_medium_to_low() {
    let engine = RiskEngine::new();
    let a = engine.assess(&query(92.0, 4.0, 21)).unwrap();
    assert_eq!(a.threshold_level, RiskLevel::Medium);
    assert_eq!(a.override_rule, Some("weak_and_stale"));
    assert_eq!(a.level, RiskLevel::Low);
}

#[test]
fn custom_table_matches_builtin_construction() {
    let builtin = RiskEngine::new();
    let rebuilt = RiskEngine::with_table(
        ReferenceTable::new(ReferenceTable::builtin().samples().to_vec()).unwrap(),
    );
    for q in [query(80.4, 6.2, 1), query(42.8, 4.2, 10), query(92.0, 4.0, 21)] {
        let a = builtin.assess(&q).unwrap();
        let b = rebuilt.assess(&q).unwrap();
        assert_eq!(a.level, b.level);
        assert_eq!(a.combined_risk, b.combined_risk);
        assert_eq!(a.confidence, b.confidence);
    }
}

#[test]
fn override_rule_order() {
    let names: Vec<_> = OVERRIDE_RULES.iter().map(|r| r.name).collect();
    assert_eq!(
        names,
        ["strong_and_very_recent", "moderate_recent_and_deep", "weak_and_stale"]
    );
    assert_eq!(Bound::AtMost(RiskLevel::Low).apply(RiskLevel::High), RiskLevel::Low);
    assert_eq!(Bound::AtLeast(RiskLevel::High).apply(RiskLevel::Low), RiskLevel::High);
    assert_eq!(Bound::AtLeast(RiskLevel::Medium).apply(RiskLevel::High), RiskLevel::High);
}

#[test]
fn thresholds() {
    assert_eq!(RiskLevel::from_score(1.6), RiskLevel::High);
    assert_eq!(RiskLevel::from_score(1.59), RiskLevel::Medium);
    assert_eq!(RiskLevel::from_score(0.7), RiskLevel::Medium);
    assert_eq!(RiskLevel::from_score(0.69), RiskLevel::Low);
    assert_eq!(RiskLevel::from_ordinal(7), RiskLevel::High);
}

#[test]
fn deterministic() {
    let engine = RiskEngine::new();
    let q = query(63.1, 5.05, 3);
    let a = engine.assess(&q).unwrap();
    let b = engine.assess(&q).unwrap();
    assert_eq!(a.level, b.level);
    assert_eq!(a.combined_risk, b.combined_risk);
    assert_eq!(a.confidence, b.confidence);
}

#[test]
fn coordinates_do_not_influence() {
    let engine = RiskEngine::new();
    let mut q = query(60.0, 5.0, 4);
    let a = engine.assess(&q).unwrap();
    q.latitude = -80.0;
    q.longitude = 10.0;
    let b = engine.assess(&q).unwrap();
    assert_eq!(a.level, b.level);
    assert_eq!(a.combined_risk, b.combined_risk);
    assert_eq!(a.confidence, b.confidence);
}

#[test]
fn ranges_hold_over_grid() {
    let engine = RiskEngine::new();
    for depth in (0..=120).step_by(10) {
        for tenths in (20..=90).step_by(5) {
            for days in [0, 1, 3, 7, 14, 30, 60] {
                let a = engine.assess(&query(depth as f64, tenths as f64 / 10.0, days)).unwrap();
                assert!(a.confidence <= 0.98);
                assert!(a.confidence_percent() <= 98);
                assert_eq!(a.accuracy_percent(), 95);
                for v in a.features.as_array() {
                    assert!((0.0..=1.0).contains(&v));
                }
            }
        }
    }
}

#[test]
fn magnitude_monotone_along_fixed_lines() {
    let engine = RiskEngine::new();
    for (depth, days) in [(42.8, 10), (60.0, 5), (30.0, 20), (80.0, 1)] {
        let mut prev = RiskLevel::Low;
        for i in 0..=50 {
            let magnitude = 3.0 + i as f64 * 0.1;
            let level = engine.assess(&query(depth, magnitude, days)).unwrap().level;
            assert!(level >= prev, "depth={depth} days={days} magnitude={magnitude}");
            prev = level;
        }
    }
}

#[test]
fn small_table_uses_all_neighbors() {
    let samples = ReferenceTable::builtin().samples()[..3].to_vec();
    let engine = RiskEngine::with_table(ReferenceTable::new(samples).unwrap());
    let a = engine.assess(&query(50.0, 5.0, 5)).unwrap();
    assert!(engine.table().len() < K_NEAREST);
    assert!((a.knn_risk - 5.0 / 3.0).abs() < 1e-12);
    assert!(a.confidence.is_finite());
    assert_eq!(a.level, RiskLevel::High);
}

#[test]
fn empty_table_rejected() {
    let err = ReferenceTable::new(Vec::new()).unwrap_err();
    assert_eq!(err, PredictError::EmptyReferenceTable);
}

#[test]
fn nan_input_is_a_computation_fault() {
    let engine = RiskEngine::new();
    let err = engine.assess(&query(f64::NAN, 5.0, 3)).unwrap_err();
    assert!(matches!(err, PredictError::NonFinite { .. }));
}

#[test]
fn distance_weights_scale_axes() {
    let a = normalize(0.0, 3.0, 30.0);
    let b = normalize(100.0, 3.0, 30.0);
    assert!((weighted_distance(&a, &b) - 0.30).abs() < 1e-12);
    let c = normalize(0.0, 8.0, 30.0);
    assert!((weighted_distance(&a, &c) - 0.50).abs() < 1e-12);
    let d = normalize(0.0, 3.0, 0.0);
    assert!((weighted_distance(&a, &d) - 0.20).abs() < 1e-12);
}

#[test]
fn ties_keep_table_order() {
    let s = ReferenceSample::new(50.0, 5.0, 5, RiskLevel::Low);
    let t = ReferenceSample::new(50.0, 5.0, 5, RiskLevel::High);
    let table = ReferenceTable::new(vec![s, t, s]).unwrap();
    let hood = Neighborhood::scan(&normalize(50.0, 5.0, 5.0), &table);
    let order: Vec<_> = hood.nearest(3).iter().map(|n| n.index).collect();
    assert_eq!(order, [0, 1, 2]);
}
