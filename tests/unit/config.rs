//! Unit tests for environment configuration

use std::collections::HashMap;
use std::time::Duration;
use tickscope::config::{AnalyzerConfig, Config, DEFAULT_BINANCE_WS_URL};
use tickscope::models::Timeframe;
use tickscope::ConfigError;

fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
    let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    Config::from_lookup(|key| map.get(key).cloned())
}

#[test]
fn test_defaults() {
    let config = load(&[]).unwrap();
    assert_eq!(config.symbols, vec!["BTCUSDT".to_string()]);
    assert_eq!(config.analyzer.buffer_capacity, 100);
    assert_eq!(config.analyzer.warmup_period, 14);
    assert_eq!(config.analyzer.timeframe, Timeframe::H1);
    assert_eq!(config.analyzer.filter.min_strength, 0.3);
    assert_eq!(config.analyzer.filter.required_confirmations, 1);
    assert_eq!(config.analyzer.tracker.signal_timeout, chrono::Duration::hours(24));
    assert_eq!(config.binance_ws_url, DEFAULT_BINANCE_WS_URL);
}

#[test]
fn test_overrides() {
    let config = load(&[
        ("SYMBOLS", "btcusdt, ethusdt"),
        ("TIMEFRAME", "4h"),
        ("MIN_SIGNAL_STRENGTH", "0.6"),
        ("SIGNAL_COOLDOWN_SECONDS", "60"),
        ("ALLOWED_INDICATORS", "rsi,macd"),
        ("STOP_LOSS_PCT", "2.5"),
        ("BUFFER_CAPACITY", "200"),
        ("RECONNECT_DELAY_MS", "250"),
    ])
    .unwrap();

    assert_eq!(config.symbols, vec!["BTCUSDT".to_string(), "ETHUSDT".to_string()]);
    assert_eq!(config.analyzer.timeframe, Timeframe::H4);
    assert_eq!(config.analyzer.indicators.periods_per_year, Timeframe::H4.periods_per_year());
    assert_eq!(config.analyzer.filter.min_strength, 0.6);
    assert_eq!(config.analyzer.filter.cooldown_period, chrono::Duration::seconds(60));
    let allowed = config.analyzer.filter.allowed_indicators.as_ref().unwrap();
    assert!(allowed.contains("RSI") && allowed.contains("MACD"));
    assert_eq!(config.analyzer.tracker.stop_loss_pct, Some(2.5));
    assert_eq!(config.analyzer.tracker.take_profit_pct, None);
    assert_eq!(config.analyzer.buffer_capacity, 200);
    assert_eq!(config.analyzer.reconnect_delay, Duration::from_millis(250));

    let per_symbol = config.analyzer_configs();
    assert_eq!(per_symbol.len(), 2);
    assert_eq!(per_symbol[1].symbol, "ETHUSDT");
    assert_eq!(per_symbol[1].buffer_capacity, 200);
}

#[test]
fn test_unparseable_value_names_the_key() {
    match load(&[("MIN_SIGNAL_STRENGTH", "strong")]) {
        Err(ConfigError::InvalidValue { key, value, .. }) => {
            assert_eq!(key, "MIN_SIGNAL_STRENGTH");
            assert_eq!(value, "strong");
        }
        other => panic!("expected InvalidValue, got {:?}", other),
    }
}

#[test]
fn test_rejects_invalid_combinations() {
    assert!(load(&[("TIMEFRAME", "7m")]).is_err());
    assert!(load(&[("REQUIRED_CONFIRMATIONS", "0")]).is_err());
    assert!(load(&[("MIN_SIGNAL_STRENGTH", "1.5")]).is_err());
    assert!(load(&[("WARMUP_PERIOD", "500")]).is_err());
    assert!(load(&[("MIN_PROFIT_THRESHOLD", "-2"), ("MAX_LOSS_THRESHOLD", "-1")]).is_err());
}

#[test]
fn test_analyzer_config_validation() {
    assert!(AnalyzerConfig::default().validate().is_ok());
    assert!(AnalyzerConfig::for_symbol("").validate().is_err());

    let zero_capacity = AnalyzerConfig {
        buffer_capacity: 0,
        ..AnalyzerConfig::default()
    };
    assert!(zero_capacity.validate().is_err());

    // shorter than the longest lookback is allowed
    let small = AnalyzerConfig {
        buffer_capacity: 30,
        ..AnalyzerConfig::default()
    };
    assert!(small.validate().is_ok());
}

#[test]
fn test_out_of_range_durations_are_errors() {
    for (key, value) in [
        ("SIGNAL_COOLDOWN_SECONDS", "9223372036854775807"),
        ("SIGNAL_TIMEOUT_HOURS", "9223372036854775"),
    ] {
        match load(&[(key, value)]) {
            Err(ConfigError::InvalidValue { key: reported, .. }) => assert_eq!(reported, key),
            other => panic!("expected InvalidValue for {}, got {:?}", key, other),
        }
    }
}

#[test]
fn test_negative_durations_are_errors() {
    for key in ["SIGNAL_COOLDOWN_SECONDS", "SIGNAL_TIMEOUT_HOURS"] {
        match load(&[(key, "-5")]) {
            Err(ConfigError::InvalidValue { key: reported, value, .. }) => {
                assert_eq!(reported, key);
                assert_eq!(value, "-5");
            }
            other => panic!("expected InvalidValue for {}, got {:?}", key, other),
        }
    }
}

#[test]
fn test_non_finite_numbers_are_rejected() {
    assert!(load(&[("MIN_SIGNAL_STRENGTH", "NaN")]).is_err());
    assert!(load(&[("MIN_PROFIT_THRESHOLD", "inf")]).is_err());
    assert!(load(&[("MAX_LOSS_THRESHOLD", "NaN")]).is_err());
    assert!(load(&[("STOP_LOSS_PCT", "NaN")]).is_err());
    assert!(load(&[("TAKE_PROFIT_PCT", "-3")]).is_err());
}

#[test]
fn test_zero_timeout_rejected_by_validation() {
    let mut config = AnalyzerConfig::default();
    config.tracker.signal_timeout = chrono::Duration::zero();
    assert!(config.validate().is_err());

    let mut config = AnalyzerConfig::default();
    config.filter.cooldown_period = chrono::Duration::seconds(-1);
    assert!(config.validate().is_err());

    let mut config = AnalyzerConfig::default();
    config.filter.cooldown_period = chrono::Duration::zero();
    assert!(config.validate().is_ok());
}
