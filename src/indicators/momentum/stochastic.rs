//! Stochastic oscillator (%K / %D)

use crate::common::math;
use crate::indicators::error::{ensure_period, IndicatorError};
use crate::models::{Observation, StochasticSeries};

pub const STOCH_NEUTRAL: f64 = 50.0;

/// Calculate the stochastic oscillator
///
/// raw %K = 100 * (close - lowest low) / (highest high - lowest low)
/// %K = SMA(raw %K, smooth_k), %D = SMA(%K, smooth_d)
///
/// A window with zero high-low range reads 50. Values are undefined until
/// each smoothing window is full.
pub fn calculate_stochastic(
    observations: &[Observation],
    period: u32,
    smooth_k: u32,
    smooth_d: u32,
) -> Result<StochasticSeries, IndicatorError> {
    let lookback = ensure_period("stochastic", period)?;
    let smooth_k = ensure_period("stochastic_smooth_k", smooth_k)?;
    let smooth_d = ensure_period("stochastic_smooth_d", smooth_d)?;

    let highs: Vec<f64> = observations.iter().map(|o| o.high).collect();
    let lows: Vec<f64> = observations.iter().map(|o| o.low).collect();
    let highest = math::rolling_max(&highs, lookback);
    let lowest = math::rolling_min(&lows, lookback);

    let raw_k: Vec<Option<f64>> = observations
        .iter()
        .enumerate()
        .map(|(i, obs)| {
            let (hh, ll) = (highest[i]?, lowest[i]?);
            let range = hh - ll;
            if range <= 0.0 || !range.is_finite() {
                return Some(STOCH_NEUTRAL);
            }
            Some(math::clamp_percent(100.0 * (obs.close - ll) / range))
        })
        .collect();

    let k: Vec<Option<f64>> = math::rolling_mean_opt(&raw_k, smooth_k)
        .into_iter()
        .map(|v| v.map(math::clamp_percent))
        .collect();
    let d = math::rolling_mean_opt(&k, smooth_d)
        .into_iter()
        .map(|v| v.map(math::clamp_percent))
        .collect();

    Ok(StochasticSeries { k, d, period })
}

/// Calculate stochastic with default parameters (14, 3, 3)
pub fn calculate_stochastic_default(observations: &[Observation]) -> Result<StochasticSeries, IndicatorError> {
    calculate_stochastic(observations, 14, 3, 3)
}
