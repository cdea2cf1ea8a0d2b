//! SMA (Simple Moving Average) indicator

use crate::common::math;
use crate::indicators::error::{ensure_period, IndicatorError};
use crate::models::Observation;

/// Calculate SMA of closes; undefined for the first `period - 1` points.
pub fn calculate_sma(observations: &[Observation], period: u32) -> Result<Vec<Option<f64>>, IndicatorError> {
    let period = ensure_period("sma", period)?;
    let closes: Vec<f64> = observations.iter().map(|o| o.close).collect();
    Ok(math::rolling_mean(&closes, period))
}

/// Calculate SMA with default period (20)
pub fn calculate_sma_default(observations: &[Observation]) -> Result<Vec<Option<f64>>, IndicatorError> {
    calculate_sma(observations, 20)
}
