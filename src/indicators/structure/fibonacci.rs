//! Fibonacci retracement levels

use crate::indicators::error::{ensure_period, IndicatorError};
use crate::models::{FibonacciLevel, FibonacciLevels, Observation};

pub const FIBONACCI_RATIOS: [f64; 6] = [0.0, 0.236, 0.382, 0.5, 0.618, 1.0];

/// Calculate retracement levels between the first and last close of the
/// trailing `period` observations.
///
/// Level for ratio `r` is `start + (end - start) * r`.
pub fn calculate_fibonacci_levels(observations: &[Observation], period: u32) -> Result<FibonacciLevels, IndicatorError> {
    let period = ensure_period("fibonacci", period)?;
    if observations.len() < period {
        return Err(IndicatorError::InsufficientData {
            required: period,
            available: observations.len(),
        });
    }

    let window = &observations[observations.len() - period..];
    let start = window[0].close;
    let end = window[window.len() - 1].close;
    let levels = FIBONACCI_RATIOS
        .iter()
        .map(|&ratio| FibonacciLevel {
            ratio,
            price: start + (end - start) * ratio,
        })
        .collect();

    Ok(FibonacciLevels { start, end, levels })
}
