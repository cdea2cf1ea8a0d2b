//! Unit tests for return and aggregate statistics

use chrono::{Duration, TimeZone, Utc};
use tickscope::models::{SignalOutcome, SignalResult, SignalType};
use tickscope::performance::{calculate_return, compute_metrics};

fn result(indicator: &str, signal_type: SignalType, outcome: SignalOutcome, return_pct: Option<f64>) -> SignalResult {
    let entry_time = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    SignalResult {
        signal_id: format!("{}-{:?}", indicator, return_pct),
        signal_type,
        indicator: indicator.to_string(),
        entry_price: 100.0,
        entry_time,
        exit_price: return_pct.map(|r| 100.0 + r),
        exit_time: Some(entry_time + Duration::minutes(30)),
        outcome,
        return_pct,
        stop_loss: None,
        take_profit: None,
        exit_reason: None,
    }
}

#[test]
fn test_calculate_return_by_direction() {
    assert!((calculate_return(SignalType::Buy, 100.0, 110.0) - 10.0).abs() < 1e-9);
    assert!((calculate_return(SignalType::Sell, 100.0, 110.0) + 10.0).abs() < 1e-9);
    assert_eq!(calculate_return(SignalType::Buy, 0.0, 110.0), 0.0);
}

#[test]
fn test_empty_metrics() {
    let metrics = compute_metrics(&Vec::<SignalResult>::new());
    assert_eq!(metrics.total_signals, 0);
    assert_eq!(metrics.win_rate, 0.0);
    assert_eq!(metrics.profit_factor, 0.0);
}

#[test]
fn test_profit_factor_without_losses_is_infinite() {
    let results = vec![result("RSI", SignalType::Buy, SignalOutcome::Success, Some(2.0))];
    assert!(compute_metrics(&results).profit_factor.is_infinite());
}

#[test]
fn test_avg_return_skips_swept_signals() {
    let results = vec![
        result("RSI", SignalType::Buy, SignalOutcome::Success, Some(3.0)),
        result("RSI", SignalType::Buy, SignalOutcome::Expired, None),
    ];
    let metrics = compute_metrics(&results);
    assert_eq!(metrics.total_signals, 2);
    assert_eq!(metrics.expired_count, 1);
    assert_eq!(metrics.avg_return, 3.0);
    // expired signals don't count against the win rate
    assert_eq!(metrics.win_rate, 1.0);
    assert_eq!(metrics.avg_holding_time_secs, 1800.0);
}

#[test]
fn test_accuracy_breakdowns() {
    let results = vec![
        result("RSI", SignalType::Buy, SignalOutcome::Success, Some(1.0)),
        result("RSI", SignalType::Sell, SignalOutcome::Failure, Some(-2.0)),
        result("MACD", SignalType::Buy, SignalOutcome::Success, Some(0.7)),
    ];
    let metrics = compute_metrics(&results);
    assert_eq!(metrics.accuracy_by_indicator["RSI"], 0.5);
    assert_eq!(metrics.accuracy_by_indicator["MACD"], 1.0);
    assert_eq!(metrics.accuracy_by_type["BUY"], 1.0);
    assert_eq!(metrics.accuracy_by_type["SELL"], 0.0);
    assert!((metrics.profit_factor - 0.85).abs() < 1e-9);
}
