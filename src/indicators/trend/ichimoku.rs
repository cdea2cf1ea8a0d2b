//! Ichimoku cloud components

use crate::common::math;
use crate::indicators::error::{ensure_period, IndicatorError};
use crate::models::{IchimokuSeries, Observation};

/// Calculate Ichimoku
///
/// Tenkan / Kijun = midpoint of the period high and low
/// Senkou A = midpoint(Tenkan, Kijun), shifted forward by `kijun`
/// Senkou B = midpoint of the `senkou_b` high/low, shifted forward by `kijun`
/// Chikou = close shifted backward by `kijun`
///
/// Output is aligned to the input: index `i` of a forward-shifted span holds
/// the value computed at `i - kijun`; the last `kijun` chikou points are
/// undefined.
pub fn calculate_ichimoku(
    observations: &[Observation],
    tenkan_period: u32,
    kijun_period: u32,
    senkou_b_period: u32,
) -> Result<IchimokuSeries, IndicatorError> {
    let tenkan_len = ensure_period("ichimoku_tenkan", tenkan_period)?;
    let kijun_len = ensure_period("ichimoku_kijun", kijun_period)?;
    let senkou_b_len = ensure_period("ichimoku_senkou_b", senkou_b_period)?;

    let tenkan = midpoint_series(observations, tenkan_len);
    let kijun = midpoint_series(observations, kijun_len);
    let senkou_b_raw = midpoint_series(observations, senkou_b_len);

    let senkou_a_raw: Vec<Option<f64>> = tenkan
        .iter()
        .zip(kijun.iter())
        .map(|(t, k)| Some(((*t)? + (*k)?) / 2.0))
        .collect();

    let n = observations.len();
    let senkou_a = (0..n)
        .map(|i| i.checked_sub(kijun_len).and_then(|j| senkou_a_raw[j]))
        .collect();
    let senkou_b = (0..n)
        .map(|i| i.checked_sub(kijun_len).and_then(|j| senkou_b_raw[j]))
        .collect();
    let chikou = (0..n)
        .map(|i| observations.get(i + kijun_len).map(|o| o.close))
        .collect();

    Ok(IchimokuSeries {
        tenkan,
        kijun,
        senkou_a,
        senkou_b,
        chikou,
    })
}

/// Calculate Ichimoku with default periods (9, 26, 52)
pub fn calculate_ichimoku_default(observations: &[Observation]) -> Result<IchimokuSeries, IndicatorError> {
    calculate_ichimoku(observations, 9, 26, 52)
}

fn midpoint_series(observations: &[Observation], period: usize) -> Vec<Option<f64>> {
    let highs: Vec<f64> = observations.iter().map(|o| o.high).collect();
    let lows: Vec<f64> = observations.iter().map(|o| o.low).collect();
    math::rolling_max(&highs, period)
        .into_iter()
        .zip(math::rolling_min(&lows, period))
        .map(|(h, l)| Some((h? + l?) / 2.0))
        .collect()
}
