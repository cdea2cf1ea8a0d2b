//! EMA (Exponential Moving Average) indicator

use crate::common::math;
use crate::indicators::error::{ensure_period, IndicatorError};
use crate::models::Observation;

/// Calculate EMA of closes with `alpha = 2 / (period + 1)`, seeded by the
/// first close.
pub fn calculate_ema(observations: &[Observation], period: u32) -> Result<Vec<f64>, IndicatorError> {
    let period = ensure_period("ema", period)?;
    let closes: Vec<f64> = observations.iter().map(|o| o.close).collect();
    Ok(math::ema_series(&closes, period))
}

/// Calculate multiple EMAs at once
pub fn calculate_emas(observations: &[Observation], periods: &[u32]) -> Result<Vec<(u32, Vec<f64>)>, IndicatorError> {
    periods
        .iter()
        .map(|&period| calculate_ema(observations, period).map(|series| (period, series)))
        .collect()
}

/// Check for EMA cross (e.g., EMA 12 above/below EMA 26) at the latest point
pub fn check_ema_cross(observations: &[Observation], fast_period: u32, slow_period: u32) -> Result<Option<i32>, IndicatorError> {
    let fast = calculate_ema(observations, fast_period)?;
    let slow = calculate_ema(observations, slow_period)?;

    Ok(match (fast.last(), slow.last()) {
        (Some(f), Some(s)) if f > s => Some(1),
        (Some(f), Some(s)) if f < s => Some(-1),
        (Some(_), Some(_)) => Some(0),
        _ => None,
    })
}
