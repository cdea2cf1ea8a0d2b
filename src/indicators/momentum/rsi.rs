//! RSI (Relative Strength Index) indicator

use crate::common::math;
use crate::indicators::error::{ensure_period, IndicatorError};
use crate::models::Observation;

/// Neutral RSI used before the first full period and for flat windows.
pub const RSI_NEUTRAL: f64 = 50.0;

/// Calculate RSI for every observation
///
/// RSI = 100 - (100 / (1 + RS))
/// RS = Average Gain / Average Loss, both smoothed with Wilder's method
/// (seeded by the simple mean of the first `period` changes).
///
/// Points before the first full period read 50. A window with no losses
/// reads 100 if it had gains and 50 if it was flat.
pub fn calculate_rsi(observations: &[Observation], period: u32) -> Result<Vec<f64>, IndicatorError> {
    let period = ensure_period("rsi", period)?;
    let closes: Vec<f64> = observations.iter().map(|o| o.close).collect();
    Ok(rsi_series(&closes, period))
}

/// Calculate RSI with default period (14)
pub fn calculate_rsi_default(observations: &[Observation]) -> Result<Vec<f64>, IndicatorError> {
    calculate_rsi(observations, 14)
}

pub(crate) fn rsi_series(closes: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![RSI_NEUTRAL; closes.len()];
    if closes.len() <= period {
        return out;
    }

    let mut gains = Vec::with_capacity(closes.len() - 1);
    let mut losses = Vec::with_capacity(closes.len() - 1);
    for i in 1..closes.len() {
        let change = closes[i] - closes[i - 1];
        if change > 0.0 {
            gains.push(change);
            losses.push(0.0);
        } else {
            gains.push(0.0);
            losses.push(-change);
        }
    }

    let mut avg_gain = math::mean(&gains[..period]).unwrap_or(0.0);
    let mut avg_loss = math::mean(&losses[..period]).unwrap_or(0.0);
    out[period] = rsi_from_averages(avg_gain, avg_loss);

    for i in period..gains.len() {
        avg_gain = (avg_gain * (period as f64 - 1.0) + gains[i]) / period as f64;
        avg_loss = (avg_loss * (period as f64 - 1.0) + losses[i]) / period as f64;
        out[i + 1] = rsi_from_averages(avg_gain, avg_loss);
    }

    out
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if !avg_gain.is_finite() || !avg_loss.is_finite() {
        return RSI_NEUTRAL;
    }
    if avg_loss == 0.0 {
        return if avg_gain > 0.0 { 100.0 } else { RSI_NEUTRAL };
    }
    let rs = avg_gain / avg_loss;
    math::clamp_percent(100.0 - (100.0 / (1.0 + rs)))
}
