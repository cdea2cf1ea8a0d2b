//! Unit tests for batch signal evaluation

use chrono::{Duration, TimeZone, Utc};
use tickscope::indicators::IndicatorParams;
use tickscope::models::{IndicatorField, Observation, SignalType};
use tickscope::signals::{SignalEngine, SignalGenerator, Strategy, StrengthScaling, MIN_OBSERVATIONS};

fn falling(count: usize) -> Vec<Observation> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (0..count)
        .map(|i| Observation::from_close(start + Duration::hours(i as i64), 1000.0 - i as f64 * 10.0, 5.0))
        .collect()
}

#[test]
fn test_evaluate_requires_minimum_observations() {
    let engine = SignalEngine::default();
    assert!(engine.evaluate(&falling(MIN_OBSERVATIONS - 1)).unwrap().is_none());
    assert!(engine.evaluate(&falling(MIN_OBSERVATIONS)).unwrap().is_some());
}

#[test]
fn test_evaluate_falling_series_is_oversold() {
    let engine = SignalEngine::new(
        IndicatorParams::default(),
        SignalGenerator::with_strategies(vec![Strategy::Rsi], StrengthScaling::default()),
    );
    let evaluation = engine.evaluate(&falling(30)).unwrap().unwrap();

    assert_eq!(evaluation.frame.len(), 30);
    assert_eq!(evaluation.snapshot.get(IndicatorField::Rsi), Some(0.0));
    assert_eq!(evaluation.signals.len(), 1);
    assert_eq!(evaluation.signals[0].signal_type, SignalType::Buy);
    assert_eq!(evaluation.signals[0].strength, 1.0);
}

#[test]
fn test_evaluate_propagates_indicator_errors() {
    let params = IndicatorParams {
        macd_fast: 30,
        ..IndicatorParams::default()
    };
    let engine = SignalEngine::new(params, SignalGenerator::new());
    assert!(engine.evaluate(&falling(30)).is_err());
}
