//! Full-window indicator computation over a buffer snapshot.
//!
//! The engine never mutates its input: it reads an immutable slice of
//! observations and returns freshly allocated series.

use serde::{Deserialize, Serialize};

use crate::indicators::error::IndicatorError;
use crate::indicators::momentum::{calculate_macd, calculate_rsi, calculate_stochastic};
use crate::indicators::structure::calculate_fibonacci_levels;
use crate::indicators::trend::{calculate_ema, calculate_ichimoku, calculate_sma};
use crate::indicators::volatility::{
    calculate_atr, calculate_bollinger_bands, calculate_historical_volatility, HOURLY_PERIODS_PER_YEAR,
};
use crate::indicators::volume::calculate_obv;
use crate::models::{
    BollingerBands, FibonacciLevels, IchimokuSeries, IndicatorField, IndicatorSnapshot, MacdSeries,
    Observation, StochasticSeries,
};

/// Periods and multipliers for every indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorParams {
    pub sma_period: u32,
    pub ema_period: u32,
    pub rsi_period: u32,
    pub macd_fast: u32,
    pub macd_slow: u32,
    pub macd_signal: u32,
    pub bollinger_period: u32,
    pub bollinger_std_dev: f64,
    pub atr_period: u32,
    pub volatility_period: u32,
    pub periods_per_year: f64,
    pub stoch_period: u32,
    pub stoch_smooth_k: u32,
    pub stoch_smooth_d: u32,
    pub ichimoku_tenkan: u32,
    pub ichimoku_kijun: u32,
    pub ichimoku_senkou_b: u32,
    pub fibonacci_period: u32,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            sma_period: 20,
            ema_period: 20,
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bollinger_period: 20,
            bollinger_std_dev: 2.0,
            atr_period: 14,
            volatility_period: 20,
            periods_per_year: HOURLY_PERIODS_PER_YEAR,
            stoch_period: 14,
            stoch_smooth_k: 3,
            stoch_smooth_d: 3,
            ichimoku_tenkan: 9,
            ichimoku_kijun: 26,
            ichimoku_senkou_b: 52,
            fibonacci_period: 20,
        }
    }
}

/// Every indicator series for one window, aligned index-for-index with the
/// observations it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorFrame {
    pub observations: Vec<Observation>,
    pub sma: Vec<Option<f64>>,
    pub ema: Vec<f64>,
    pub rsi: Vec<f64>,
    pub macd: MacdSeries,
    pub bollinger: BollingerBands,
    pub atr: Vec<f64>,
    pub volatility: Vec<f64>,
    pub stochastic: StochasticSeries,
    pub ichimoku: IchimokuSeries,
    pub obv: Vec<f64>,
    /// `None` while the window is shorter than the fibonacci period.
    pub fibonacci: Option<FibonacciLevels>,
}

impl IndicatorFrame {
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Snapshot of the last point, or `None` for an empty frame.
    pub fn latest(&self) -> Option<IndicatorSnapshot> {
        let i = self.observations.len().checked_sub(1)?;
        let last = &self.observations[i];

        let mut snapshot = IndicatorSnapshot::new(last.timestamp);
        snapshot.insert(IndicatorField::Close, last.close);
        snapshot.insert_opt(IndicatorField::Sma, self.sma[i]);
        snapshot.insert(IndicatorField::Ema, self.ema[i]);
        snapshot.insert(IndicatorField::Rsi, self.rsi[i]);
        snapshot.insert(IndicatorField::Macd, self.macd.macd[i]);
        snapshot.insert(IndicatorField::MacdSignal, self.macd.signal[i]);
        snapshot.insert(IndicatorField::MacdHistogram, self.macd.histogram[i]);
        snapshot.insert(IndicatorField::BbUpper, self.bollinger.upper[i]);
        snapshot.insert(IndicatorField::BbMiddle, self.bollinger.middle[i]);
        snapshot.insert(IndicatorField::BbLower, self.bollinger.lower[i]);
        snapshot.insert(IndicatorField::Atr, self.atr[i]);
        snapshot.insert(IndicatorField::Volatility, self.volatility[i]);
        snapshot.insert_opt(IndicatorField::StochK, self.stochastic.k[i]);
        snapshot.insert_opt(IndicatorField::StochD, self.stochastic.d[i]);
        snapshot.insert_opt(IndicatorField::IchimokuTenkan, self.ichimoku.tenkan[i]);
        snapshot.insert_opt(IndicatorField::IchimokuKijun, self.ichimoku.kijun[i]);
        snapshot.insert_opt(IndicatorField::IchimokuSenkouA, self.ichimoku.senkou_a[i]);
        snapshot.insert_opt(IndicatorField::IchimokuSenkouB, self.ichimoku.senkou_b[i]);
        snapshot.insert_opt(IndicatorField::IchimokuChikou, self.ichimoku.chikou[i]);
        snapshot.insert(IndicatorField::Obv, self.obv[i]);
        Some(snapshot)
    }
}

#[derive(Debug, Clone, Default)]
pub struct IndicatorEngine {
    params: IndicatorParams,
}

impl IndicatorEngine {
    pub fn new(params: IndicatorParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &IndicatorParams {
        &self.params
    }

    /// Compute every indicator over `observations`.
    pub fn compute(&self, observations: &[Observation]) -> Result<IndicatorFrame, IndicatorError> {
        let p = &self.params;

        let fibonacci = match calculate_fibonacci_levels(observations, p.fibonacci_period) {
            Ok(levels) => Some(levels),
            Err(IndicatorError::InsufficientData { .. }) => None,
            Err(e) => return Err(e),
        };

        Ok(IndicatorFrame {
            sma: calculate_sma(observations, p.sma_period)?,
            ema: calculate_ema(observations, p.ema_period)?,
            rsi: calculate_rsi(observations, p.rsi_period)?,
            macd: calculate_macd(observations, p.macd_fast, p.macd_slow, p.macd_signal)?,
            bollinger: calculate_bollinger_bands(observations, p.bollinger_period, p.bollinger_std_dev)?,
            atr: calculate_atr(observations, p.atr_period)?,
            volatility: calculate_historical_volatility(observations, p.volatility_period, p.periods_per_year)?,
            stochastic: calculate_stochastic(observations, p.stoch_period, p.stoch_smooth_k, p.stoch_smooth_d)?,
            ichimoku: calculate_ichimoku(observations, p.ichimoku_tenkan, p.ichimoku_kijun, p.ichimoku_senkou_b)?,
            obv: calculate_obv(observations),
            fibonacci,
            observations: observations.to_vec(),
        })
    }

    /// Latest-point snapshot over `observations`.
    pub fn snapshot(&self, observations: &[Observation]) -> Result<IndicatorSnapshot, IndicatorError> {
        self.compute(observations)?
            .latest()
            .ok_or(IndicatorError::InsufficientData {
                required: 1,
                available: 0,
            })
    }
}
