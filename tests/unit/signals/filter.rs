//! Unit tests for the signal filter

use chrono::{DateTime, Duration, TimeZone, Utc};
use tickscope::models::{Signal, SignalType};
use tickscope::signals::{FilterConfig, FilterDecision, RejectReason, SignalFilter};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

fn signal(indicator: &str, signal_type: SignalType, strength: f64, at: DateTime<Utc>) -> Signal {
    Signal::new(signal_type, indicator, strength, format!("{} test", indicator), at)
}

fn config(min_strength: f64) -> FilterConfig {
    FilterConfig {
        min_strength,
        ..FilterConfig::default()
    }
}

#[test]
fn test_strength_threshold() {
    let mut filter = SignalFilter::new(config(0.7));
    assert_eq!(filter.apply(&signal("RSI", SignalType::Buy, 0.8, t0())), FilterDecision::Accepted);
    assert_eq!(
        filter.apply(&signal("MACD", SignalType::Buy, 0.3, t0())),
        FilterDecision::Rejected(RejectReason::Strength)
    );
}

#[test]
fn test_strength_equal_to_minimum_passes() {
    let filter = SignalFilter::new(config(0.5));
    assert!(filter.accept(&signal("RSI", SignalType::Buy, 0.5, t0())));
}

#[test]
fn test_cooldown_per_indicator_and_direction() {
    let mut filter = SignalFilter::new(FilterConfig {
        min_strength: 0.0,
        cooldown_period: Duration::seconds(300),
        ..FilterConfig::default()
    });

    assert!(filter.apply(&signal("RSI", SignalType::Buy, 0.9, t0())).is_accepted());
    assert_eq!(
        filter.apply(&signal("RSI", SignalType::Buy, 0.9, t0() + Duration::seconds(1))),
        FilterDecision::Rejected(RejectReason::Cooldown)
    );
    // other direction and other indicators have their own cooldown
    assert!(filter
        .apply(&signal("RSI", SignalType::Sell, 0.9, t0() + Duration::seconds(1)))
        .is_accepted());
    assert!(filter
        .apply(&signal("MACD", SignalType::Buy, 0.9, t0() + Duration::seconds(1)))
        .is_accepted());

    assert!(filter
        .apply(&signal("RSI", SignalType::Buy, 0.9, t0() + Duration::seconds(301)))
        .is_accepted());
}

#[test]
fn test_rejected_signal_does_not_start_cooldown() {
    let mut filter = SignalFilter::new(config(0.5));
    filter.apply(&signal("RSI", SignalType::Buy, 0.1, t0()));
    assert!(filter
        .apply(&signal("RSI", SignalType::Buy, 0.9, t0() + Duration::seconds(1)))
        .is_accepted());
}

#[test]
fn test_check_is_side_effect_free() {
    let filter = SignalFilter::new(config(0.3));
    let s = signal("RSI", SignalType::Buy, 0.9, t0());
    assert!(filter.accept(&s));
    assert!(filter.accept(&s));
}

#[test]
fn test_allowed_indicators() {
    let mut filter = SignalFilter::new(config(0.0).with_allowed_indicators(["RSI", "MACD"]));
    assert!(filter.apply(&signal("RSI", SignalType::Buy, 0.5, t0())).is_accepted());
    assert_eq!(
        filter.apply(&signal("BB", SignalType::Buy, 0.5, t0())),
        FilterDecision::Rejected(RejectReason::NotAllowed)
    );
}

#[test]
fn test_required_confirmations() {
    let mut filter = SignalFilter::new(FilterConfig {
        min_strength: 0.3,
        required_confirmations: 2,
        ..FilterConfig::default()
    });

    // nothing to confirm the first one
    assert_eq!(
        filter.apply(&signal("RSI", SignalType::Buy, 0.9, t0())),
        FilterDecision::Rejected(RejectReason::Confirmations)
    );
    // RSI BUY above is a candidate confirming this one
    assert!(filter
        .apply(&signal("STOCH", SignalType::Buy, 0.9, t0() + Duration::seconds(10)))
        .is_accepted());
}

#[test]
fn test_confirmations_require_same_direction() {
    let mut filter = SignalFilter::new(FilterConfig {
        min_strength: 0.3,
        required_confirmations: 2,
        ..FilterConfig::default()
    });
    filter.apply(&signal("RSI", SignalType::Sell, 0.9, t0()));
    assert_eq!(
        filter.apply(&signal("STOCH", SignalType::Buy, 0.9, t0())),
        FilterDecision::Rejected(RejectReason::Confirmations)
    );
}

#[test]
fn test_confirmations_expire_outside_window() {
    let mut filter = SignalFilter::new(FilterConfig {
        min_strength: 0.3,
        required_confirmations: 2,
        confirmation_window: Duration::seconds(60),
        ..FilterConfig::default()
    });
    filter.apply(&signal("RSI", SignalType::Buy, 0.9, t0()));
    assert_eq!(
        filter.apply(&signal("STOCH", SignalType::Buy, 0.9, t0() + Duration::seconds(120))),
        FilterDecision::Rejected(RejectReason::Confirmations)
    );
}

#[test]
fn test_weak_signals_never_confirm() {
    let mut filter = SignalFilter::new(FilterConfig {
        min_strength: 0.5,
        required_confirmations: 2,
        ..FilterConfig::default()
    });
    filter.apply(&signal("RSI", SignalType::Buy, 0.1, t0()));
    assert_eq!(
        filter.apply(&signal("STOCH", SignalType::Buy, 0.9, t0())),
        FilterDecision::Rejected(RejectReason::Confirmations)
    );
}
