//! Bollinger Bands indicator

use crate::common::math;
use crate::indicators::error::{ensure_period, IndicatorError};
use crate::models::{BollingerBands, Observation};

/// Calculate Bollinger Bands
///
/// Middle Band = SMA(period)
/// Upper Band = Middle + (std_dev * standard deviation)
/// Lower Band = Middle - (std_dev * standard deviation)
///
/// Before the window fills, the middle band is the close and the bands sit
/// `std_dev` away from it. `upper >= middle >= lower` holds at every index.
pub fn calculate_bollinger_bands(
    observations: &[Observation],
    period: u32,
    std_dev: f64,
) -> Result<BollingerBands, IndicatorError> {
    let window = ensure_period("bollinger", period)?;
    if !std_dev.is_finite() || std_dev < 0.0 {
        return Err(IndicatorError::InvalidParameter(format!(
            "bollinger std_dev must be a non-negative number, got {}",
            std_dev
        )));
    }

    let closes: Vec<f64> = observations.iter().map(|o| o.close).collect();
    let sma = math::rolling_mean(&closes, window);
    let std = math::rolling_std(&closes, window);

    let mut upper = Vec::with_capacity(closes.len());
    let mut middle = Vec::with_capacity(closes.len());
    let mut lower = Vec::with_capacity(closes.len());

    for i in 0..closes.len() {
        let mid = sma[i].unwrap_or(closes[i]);
        let (up, low) = match std[i] {
            Some(sd) if sd.is_finite() => (mid + std_dev * sd, mid - std_dev * sd),
            _ => (mid + std_dev, mid - std_dev),
        };
        upper.push(up.max(mid));
        middle.push(mid);
        lower.push(low.min(mid));
    }

    Ok(BollingerBands {
        upper,
        middle,
        lower,
        period,
        std_dev,
    })
}

/// Calculate Bollinger Bands with default parameters (20 SMA, 2σ)
pub fn calculate_bollinger_bands_default(observations: &[Observation]) -> Result<BollingerBands, IndicatorError> {
    calculate_bollinger_bands(observations, 20, 2.0)
}
