//! ATR (Average True Range) indicator

use crate::common::math;
use crate::indicators::error::{ensure_period, IndicatorError};
use crate::models::Observation;

/// Calculate ATR (Average True Range)
///
/// True range = max(high - low, |high - prev close|, |low - prev close|); the
/// first point has no previous close and uses `high - low`. ATR is the
/// rolling mean of true range over `period`. Points before the window fills
/// carry their raw true range. Never negative.
pub fn calculate_atr(observations: &[Observation], period: u32) -> Result<Vec<f64>, IndicatorError> {
    let period = ensure_period("atr", period)?;
    let tr = true_ranges(observations);
    let rolling = math::rolling_mean(&tr, period);

    Ok(rolling
        .into_iter()
        .zip(tr.iter())
        .map(|(avg, raw)| avg.unwrap_or(*raw).max(0.0))
        .collect())
}

/// Calculate ATR with default period (14)
pub fn calculate_atr_default(observations: &[Observation]) -> Result<Vec<f64>, IndicatorError> {
    calculate_atr(observations, 14)
}

pub fn true_ranges(observations: &[Observation]) -> Vec<f64> {
    observations
        .iter()
        .enumerate()
        .map(|(i, obs)| match i.checked_sub(1) {
            Some(prev) => math::true_range(obs.high, obs.low, observations[prev].close),
            None => (obs.high - obs.low).abs(),
        })
        .collect()
}
