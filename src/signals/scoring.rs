//! Strength scoring for the built-in strategies
//!
//! Every function maps an indicator reading to a strength in `[0, 1]`.

use serde::{Deserialize, Serialize};

use crate::common::math::clamp_unit;

/// Tunable constants behind the strategy strength formulas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrengthScaling {
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
    /// RSI points past the threshold that map to full strength.
    pub rsi_span: f64,
    /// Fraction of price a MACD/signal gap must reach for full strength.
    pub macd_price_fraction: f64,
    /// Fraction of the band a close must overshoot for full strength.
    pub bollinger_band_fraction: f64,
    pub stoch_overbought: f64,
    pub stoch_oversold: f64,
    /// Stochastic points past the threshold that map to full strength.
    pub stoch_span: f64,
}

impl Default for StrengthScaling {
    fn default() -> Self {
        Self {
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
            rsi_span: 15.0,
            macd_price_fraction: 0.001,
            bollinger_band_fraction: 0.02,
            stoch_overbought: 80.0,
            stoch_oversold: 20.0,
            stoch_span: 20.0,
        }
    }
}

/// Distance past a threshold scaled by `span`.
pub fn threshold_strength(distance: f64, span: f64) -> f64 {
    if span <= 0.0 {
        return if distance > 0.0 { 1.0 } else { 0.0 };
    }
    clamp_unit(distance / span)
}

/// `|macd - signal|` relative to a fraction of the current price.
pub fn macd_strength(macd: f64, signal: f64, price: f64, price_fraction: f64) -> f64 {
    let scale = (price * price_fraction).abs();
    if scale == 0.0 || !scale.is_finite() {
        return if macd != signal { 1.0 } else { 0.0 };
    }
    clamp_unit((macd - signal).abs() / scale)
}

/// Overshoot of `close` beyond `band` relative to a fraction of the band.
pub fn band_strength(close: f64, band: f64, band_fraction: f64) -> f64 {
    let scale = (band * band_fraction).abs();
    let overshoot = (close - band).abs();
    if scale == 0.0 || !scale.is_finite() {
        return if overshoot > 0.0 { 1.0 } else { 0.0 };
    }
    clamp_unit(overshoot / scale)
}
