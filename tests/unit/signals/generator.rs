//! Unit tests for rule-based signal generation

use chrono::{Duration, TimeZone, Utc};
use tickscope::indicators::momentum::calculate_rsi;
use tickscope::models::{IndicatorField, IndicatorSnapshot, Observation, SignalType};
use tickscope::signals::{SignalGenerator, Strategy, StrengthScaling};

fn snapshot() -> IndicatorSnapshot {
    IndicatorSnapshot::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap())
}

#[test]
fn test_rsi_overbought_emits_strong_sell() {
    let signals = SignalGenerator::new().generate(&snapshot().with(IndicatorField::Rsi, 85.0));
    assert_eq!(signals.len(), 1);
    assert_eq!(signals[0].signal_type, SignalType::Sell);
    assert_eq!(signals[0].indicator, "RSI");
    assert!(signals[0].strength > 0.8);
    assert!(signals[0].message.contains("85.00"));
}

#[test]
fn test_rsi_computed_near_85_emits_full_strength_sell() {
    // ten gains of 1.7 and four losses of 0.75: RS = 17 / 3, RSI = 85
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let mut close = 100.0;
    let mut observations = vec![Observation::from_close(start, close, 1000.0)];
    for i in 1..=14 {
        close += if i % 3 == 0 { -0.75 } else { 1.7 };
        observations.push(Observation::from_close(start + Duration::hours(i), close, 1000.0));
    }

    let rsi = *calculate_rsi(&observations, 14).unwrap().last().unwrap();
    assert!((rsi - 85.0).abs() < 1e-6, "rsi = {}", rsi);

    let at = observations.last().unwrap().timestamp;
    let signals = SignalGenerator::new().generate(&IndicatorSnapshot::new(at).with(IndicatorField::Rsi, rsi));
    assert_eq!(signals.len(), 1);
    assert_eq!(signals[0].signal_type, SignalType::Sell);
    assert_eq!(signals[0].indicator, "RSI");
    assert!(signals[0].strength > 0.99);
}

#[test]
fn test_rsi_oversold_emits_buy() {
    let signals = SignalGenerator::new().generate(&snapshot().with(IndicatorField::Rsi, 25.0));
    assert_eq!(signals.len(), 1);
    assert_eq!(signals[0].signal_type, SignalType::Buy);
    assert!((signals[0].strength - 5.0 / 15.0).abs() < 1e-9);
}

#[test]
fn test_rsi_in_band_is_silent() {
    assert!(SignalGenerator::new()
        .generate(&snapshot().with(IndicatorField::Rsi, 50.0))
        .is_empty());
}

#[test]
fn test_close_below_lower_band_emits_buy() {
    let snap = snapshot()
        .with(IndicatorField::Close, 47500.0)
        .with(IndicatorField::BbUpper, 52000.0)
        .with(IndicatorField::BbLower, 48000.0);
    let signals = SignalGenerator::new().generate(&snap);
    assert_eq!(signals.len(), 1);
    assert_eq!(signals[0].indicator, "BB");
    assert_eq!(signals[0].signal_type, SignalType::Buy);
    assert!(signals[0].strength > 0.0 && signals[0].strength <= 1.0);
}

#[test]
fn test_close_above_upper_band_emits_sell() {
    let snap = snapshot()
        .with(IndicatorField::Close, 53000.0)
        .with(IndicatorField::BbUpper, 52000.0)
        .with(IndicatorField::BbLower, 48000.0);
    let signals = SignalGenerator::new().generate(&snap);
    assert_eq!(signals.len(), 1);
    assert_eq!(signals[0].signal_type, SignalType::Sell);
}

#[test]
fn test_macd_crossover_direction() {
    let bullish = snapshot()
        .with(IndicatorField::Macd, 12.0)
        .with(IndicatorField::MacdSignal, 10.0)
        .with(IndicatorField::Close, 1000.0);
    let signals = SignalGenerator::new().generate(&bullish);
    assert_eq!(signals.len(), 1);
    assert_eq!(signals[0].indicator, "MACD");
    assert_eq!(signals[0].signal_type, SignalType::Buy);
    // |12 - 10| against 0.1% of 1000
    assert_eq!(signals[0].strength, 1.0);

    let equal = snapshot()
        .with(IndicatorField::Macd, 10.0)
        .with(IndicatorField::MacdSignal, 10.0)
        .with(IndicatorField::Close, 1000.0);
    assert!(SignalGenerator::new().generate(&equal).is_empty());
}

#[test]
fn test_stochastic_needs_both_lines_past_threshold() {
    let oversold = snapshot()
        .with(IndicatorField::StochK, 10.0)
        .with(IndicatorField::StochD, 15.0);
    let signals = SignalGenerator::new().generate(&oversold);
    assert_eq!(signals.len(), 1);
    assert_eq!(signals[0].signal_type, SignalType::Buy);
    assert_eq!(signals[0].indicator, "STOCH");

    let mixed = snapshot()
        .with(IndicatorField::StochK, 10.0)
        .with(IndicatorField::StochD, 25.0);
    assert!(SignalGenerator::new().generate(&mixed).is_empty());
}

#[test]
fn test_strategies_skip_missing_inputs() {
    // MACD without a close price cannot be scored
    let snap = snapshot()
        .with(IndicatorField::Macd, 12.0)
        .with(IndicatorField::MacdSignal, 10.0);
    assert!(SignalGenerator::new().generate(&snap).is_empty());
    assert!(SignalGenerator::new().generate(&snapshot()).is_empty());
}

#[test]
fn test_signals_carry_snapshot_timestamp() {
    let snap = snapshot().with(IndicatorField::Rsi, 90.0);
    let signals = SignalGenerator::new().generate(&snap);
    assert_eq!(signals[0].timestamp, snap.timestamp);
}

#[test]
fn test_custom_strategy_set_and_scaling() {
    let scaling = StrengthScaling {
        rsi_overbought: 60.0,
        ..StrengthScaling::default()
    };
    let generator = SignalGenerator::with_strategies(vec![Strategy::Rsi], scaling);
    let snap = snapshot()
        .with(IndicatorField::Rsi, 65.0)
        .with(IndicatorField::StochK, 95.0)
        .with(IndicatorField::StochD, 95.0);
    let signals = generator.generate(&snap);
    assert_eq!(signals.len(), 1);
    assert_eq!(signals[0].indicator, "RSI");
    assert_eq!(signals[0].signal_type, SignalType::Sell);
}

#[test]
fn test_strategy_from_name() {
    assert_eq!(Strategy::from_name("rsi"), Some(Strategy::Rsi));
    assert_eq!(Strategy::from_name(" bb "), Some(Strategy::Bollinger));
    assert_eq!(Strategy::from_name("adx"), None);
}
