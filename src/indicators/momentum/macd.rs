//! MACD (Moving Average Convergence Divergence) indicator

use crate::common::math;
use crate::indicators::error::{ensure_period, IndicatorError};
use crate::models::{MacdSeries, Observation};

/// Calculate MACD indicator
///
/// MACD = EMA(fast) - EMA(slow)
/// Signal = EMA(signal) of MACD
/// Histogram = MACD - Signal
///
/// Every EMA is seeded with its first input, so the series has no undefined
/// prefix.
pub fn calculate_macd(
    observations: &[Observation],
    fast_period: u32,
    slow_period: u32,
    signal_period: u32,
) -> Result<MacdSeries, IndicatorError> {
    let fast = ensure_period("macd_fast", fast_period)?;
    let slow = ensure_period("macd_slow", slow_period)?;
    let signal = ensure_period("macd_signal", signal_period)?;
    if fast >= slow {
        return Err(IndicatorError::InvalidParameter(format!(
            "macd fast period ({}) must be shorter than slow period ({})",
            fast, slow
        )));
    }

    let closes: Vec<f64> = observations.iter().map(|o| o.close).collect();
    let fast_ema = math::ema_series(&closes, fast);
    let slow_ema = math::ema_series(&closes, slow);

    let macd: Vec<f64> = fast_ema
        .iter()
        .zip(slow_ema.iter())
        .map(|(f, s)| f - s)
        .collect();
    let signal_line = math::ema_series(&macd, signal);
    let histogram = macd
        .iter()
        .zip(signal_line.iter())
        .map(|(m, s)| m - s)
        .collect();

    Ok(MacdSeries {
        macd,
        signal: signal_line,
        histogram,
        period: (fast_period, slow_period, signal_period),
    })
}

/// Calculate MACD with default periods (12, 26, 9)
pub fn calculate_macd_default(observations: &[Observation]) -> Result<MacdSeries, IndicatorError> {
    calculate_macd(observations, 12, 26, 9)
}
