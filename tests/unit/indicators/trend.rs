//! Unit tests for trend indicators: SMA, EMA, Ichimoku

use chrono::{Duration, TimeZone, Utc};
use tickscope::indicators::trend::{
    calculate_ema, calculate_emas, calculate_ichimoku, calculate_ichimoku_default, calculate_sma, check_ema_cross,
};
use tickscope::models::Observation;

fn create_test_observations(count: usize, base_price: f64, step: f64) -> Vec<Observation> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (0..count)
        .map(|i| Observation::from_close(start + Duration::hours(i as i64), base_price + i as f64 * step, 1000.0))
        .collect()
}

#[test]
fn test_sma_undefined_until_window_fills() {
    let obs = create_test_observations(5, 1.0, 1.0);
    let sma = calculate_sma(&obs, 3).unwrap();
    assert_eq!(sma, vec![None, None, Some(2.0), Some(3.0), Some(4.0)]);
}

#[test]
fn test_ema_defined_at_every_index() {
    let obs = create_test_observations(30, 100.0, 0.1);
    let ema = calculate_ema(&obs, 20).unwrap();
    assert_eq!(ema.len(), 30);
    assert_eq!(ema[0], 100.0);
    // lags a rising series
    assert!(ema[29] < obs[29].close);
    assert!(ema[29] > obs[0].close);
}

#[test]
fn test_calculate_multiple_emas() {
    let obs = create_test_observations(50, 100.0, 0.1);
    let emas = calculate_emas(&obs, &[12, 26]).unwrap();
    assert_eq!(emas.len(), 2);
    assert_eq!(emas[0].0, 12);
    assert_eq!(emas[1].0, 26);
}

#[test]
fn test_ema_cross_direction() {
    let up = create_test_observations(50, 100.0, 1.0);
    assert_eq!(check_ema_cross(&up, 12, 26).unwrap(), Some(1));

    let down = create_test_observations(50, 200.0, -1.0);
    assert_eq!(check_ema_cross(&down, 12, 26).unwrap(), Some(-1));

    let flat = create_test_observations(50, 100.0, 0.0);
    assert_eq!(check_ema_cross(&flat, 12, 26).unwrap(), Some(0));

    assert_eq!(check_ema_cross(&[], 12, 26).unwrap(), None);
}

#[test]
fn test_ichimoku_lines_on_rising_series() {
    let obs = create_test_observations(100, 100.0, 1.0);
    let ichimoku = calculate_ichimoku_default(&obs).unwrap();

    assert_eq!(ichimoku.tenkan[7], None);
    // midpoint of closes 92..=100 offsets
    assert_eq!(ichimoku.tenkan[8], Some(104.0));
    assert_eq!(ichimoku.kijun[24], None);
    assert_eq!(ichimoku.kijun[25], Some(112.5));
}

#[test]
fn test_ichimoku_spans_are_shifted() {
    let obs = create_test_observations(100, 100.0, 1.0);
    let ichimoku = calculate_ichimoku(&obs, 9, 26, 52).unwrap();

    assert_eq!(ichimoku.senkou_a[50], None);
    assert!(ichimoku.senkou_a[51].is_some());
    assert_eq!(ichimoku.senkou_b[76], None);
    assert!(ichimoku.senkou_b[77].is_some());

    assert_eq!(ichimoku.chikou[0], Some(obs[26].close));
    assert_eq!(ichimoku.chikou[73], Some(obs[99].close));
    assert_eq!(ichimoku.chikou[74], None);
}

#[test]
fn test_ichimoku_zero_period_rejected() {
    let obs = create_test_observations(10, 100.0, 1.0);
    assert!(calculate_ichimoku(&obs, 0, 26, 52).is_err());
}
