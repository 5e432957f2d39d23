//! Chart pattern tests on synthetic series.
//!
//! Each series is a steady uptrend (close = 50 + 0.5 * i) with a few sharp
//! spikes or dips placed inside the cleaned region, so the extrema and the
//! resulting patterns are known exactly.

use yatas::prelude::*;

/// First bar that survives cleaning with default parameters
const CLEAN_START: usize = 199;

#[derive(Debug, Clone, Copy)]
struct TestBar {
    c: f64,
}

impl OHLCV for TestBar {
    fn open(&self) -> f64 {
        self.c
    }

    fn high(&self) -> f64 {
        self.c + 1.0
    }

    fn low(&self) -> f64 {
        self.c - 1.0
    }

    fn close(&self) -> f64 {
        self.c
    }

    fn volume(&self) -> f64 {
        1000.0
    }
}

/// Uptrend of `n` bars with closes overridden at cleaned positions.
fn ramp_with(n: usize, overrides: &[(usize, f64)]) -> Vec<TestBar> {
    let mut bars: Vec<TestBar> = (0..n).map(|i| TestBar { c: 50.0 + 0.5 * i as f64 }).collect();
    for &(k, price) in overrides {
        bars[CLEAN_START + k].c = price;
    }
    bars
}

#[test]
fn test_double_top_alone() {
    let bars = ramp_with(300, &[(30, 250.0), (70, 253.0)]);
    let engine = AssessmentEngine::default();
    let analysis = engine.analyze("DT", &bars).unwrap();

    assert_eq!(analysis.record.identified_patterns, vec![ChartPattern::DoubleTop]);
    assert_eq!(analysis.record.resistance_levels, vec![250.0, 253.0]);
    // the bars right after each spike are the only troughs, 12% apart
    assert_eq!(analysis.record.support_levels, vec![165.0, 185.0]);

    let m = &analysis.patterns[0];
    assert_eq!(m.direction, Direction::Bearish);
    assert_eq!((m.start_index, m.end_index), (30, 70));
}

#[test]
fn test_double_top_outside_tolerance() {
    let bars = ramp_with(300, &[(30, 250.0), (70, 260.0)]);
    let record = AssessmentEngine::default().assess("X", &bars).unwrap();
    assert!(record.identified_patterns.is_empty());
}

#[test]
fn test_head_and_shoulders_alone() {
    let bars = ramp_with(300, &[(20, 250.0), (50, 270.0), (80, 251.0)]);
    let record = AssessmentEngine::default().assess("HS", &bars).unwrap();

    assert_eq!(record.identified_patterns, vec![ChartPattern::HeadAndShoulders]);
    assert_eq!(record.resistance_levels, vec![250.0, 270.0, 251.0]);
}

#[test]
fn test_head_and_shoulders_with_double_top() {
    let bars = ramp_with(300, &[(20, 250.0), (50, 270.0), (80, 265.0)]);
    let record = AssessmentEngine::default().assess("HS", &bars).unwrap();

    assert_eq!(
        record.identified_patterns,
        vec![ChartPattern::HeadAndShoulders, ChartPattern::DoubleTop]
    );
}

#[test]
fn test_double_bottom_alone() {
    let bars = ramp_with(300, &[(30, 100.0), (70, 101.0)]);
    let analysis = AssessmentEngine::default().analyze("DB", &bars).unwrap();

    assert_eq!(analysis.record.identified_patterns, vec![ChartPattern::DoubleBottom]);
    assert_eq!(analysis.record.support_levels, vec![100.0, 101.0]);
    // the bars right before each dip are peaks, too far apart for a double top
    assert_eq!(analysis.record.resistance_levels, vec![164.0, 184.0]);
    assert_eq!(analysis.patterns[0].direction, Direction::Bullish);
}

#[test]
fn test_close_spikes_are_thinned() {
    // second spike is only 10 bars after the first and gets dropped
    let bars = ramp_with(300, &[(30, 250.0), (40, 251.0), (70, 252.0)]);
    let analysis = AssessmentEngine::default().analyze("X", &bars).unwrap();

    let indices: Vec<usize> = analysis.extrema.peaks.iter().map(|e| e.index).collect();
    assert_eq!(indices, vec![30, 70]);
    assert_eq!(analysis.record.identified_patterns, vec![ChartPattern::DoubleTop]);
}

#[test]
fn test_tallest_first_keeps_dominant_spike() {
    let params = AssessmentParams {
        spacing_rule: SpacingRule::TallestFirst,
        ..Default::default()
    };
    let engine = EngineBuilder::new().with_all_defaults().params(params).build().unwrap();

    let bars = ramp_with(300, &[(30, 250.0), (40, 280.0), (70, 252.0)]);
    let analysis = engine.analyze("X", &bars).unwrap();

    let indices: Vec<usize> = analysis.extrema.peaks.iter().map(|e| e.index).collect();
    assert_eq!(indices, vec![40, 70]);
    assert!(!analysis.record.has_pattern(ChartPattern::DoubleTop));
}

#[test]
fn test_pattern_filter_and_detector_subset() {
    let bars = ramp_with(300, &[(20, 250.0), (50, 270.0), (80, 265.0)]);

    let only_double_top = EngineBuilder::new()
        .with_all_defaults()
        .only_patterns([ChartPattern::DoubleTop])
        .build()
        .unwrap();
    let record = only_double_top.assess("X", &bars).unwrap();
    assert_eq!(record.identified_patterns, vec![ChartPattern::DoubleTop]);

    let hs_only = EngineBuilder::new()
        .add(BuiltinDetector::HeadAndShoulders(HeadAndShouldersDetector::with_defaults()))
        .build()
        .unwrap();
    let record = hs_only.assess("X", &bars).unwrap();
    assert_eq!(record.identified_patterns, vec![ChartPattern::HeadAndShoulders]);
}

#[test]
fn test_custom_tolerance() {
    let bars = ramp_with(300, &[(30, 250.0), (70, 260.0)]);

    let wide = DoubleTopDetector {
        tolerance: Ratio::new(0.05).unwrap(),
    };
    let engine = EngineBuilder::new()
        .add_checked(BuiltinDetector::DoubleTop(wide))
        .unwrap()
        .build()
        .unwrap();

    let record = engine.assess("X", &bars).unwrap();
    assert_eq!(record.identified_patterns, vec![ChartPattern::DoubleTop]);
}

#[test]
fn test_pattern_names_in_json() {
    let bars = ramp_with(300, &[(20, 250.0), (50, 270.0), (80, 265.0)]);
    let record = AssessmentEngine::default().assess("X", &bars).unwrap();
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(
        json["identified_patterns"],
        serde_json::json!(["Head and Shoulders", "Double Top"])
    );
}
