//! Historical (realized) volatility

use crate::common::math;
use crate::indicators::error::{ensure_period, IndicatorError};
use crate::models::Observation;

/// Hourly bars over 252 trading days.
pub const HOURLY_PERIODS_PER_YEAR: f64 = 252.0 * 24.0;

/// Calculate historical volatility
///
/// Sample standard deviation of log returns over `period`, annualized by
/// `sqrt(periods_per_year)`. Undefined points (and returns involving a
/// non-positive price) read 0. Never negative.
pub fn calculate_historical_volatility(
    observations: &[Observation],
    period: u32,
    periods_per_year: f64,
) -> Result<Vec<f64>, IndicatorError> {
    let period = ensure_period("volatility", period)?;
    if !periods_per_year.is_finite() || periods_per_year <= 0.0 {
        return Err(IndicatorError::InvalidParameter(format!(
            "periods_per_year must be positive, got {}",
            periods_per_year
        )));
    }
    if observations.is_empty() {
        return Ok(Vec::new());
    }

    let log_returns: Vec<f64> = observations
        .windows(2)
        .map(|w| {
            let r = (w[1].close / w[0].close).ln();
            if r.is_finite() {
                r
            } else {
                0.0
            }
        })
        .collect();

    let scale = periods_per_year.sqrt();
    let mut out = vec![0.0; observations.len()];
    for (i, std) in math::rolling_std(&log_returns, period).into_iter().enumerate() {
        // return i describes the move into observation i + 1
        out[i + 1] = std.filter(|v| v.is_finite()).map(|v| (v * scale).max(0.0)).unwrap_or(0.0);
    }
    Ok(out)
}

/// Calculate historical volatility with default period (20) on hourly bars
pub fn calculate_historical_volatility_default(observations: &[Observation]) -> Result<Vec<f64>, IndicatorError> {
    calculate_historical_volatility(observations, 20, HOURLY_PERIODS_PER_YEAR)
}
