use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Named scalar fields that can appear in an [`IndicatorSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorField {
    Close,
    Sma,
    Ema,
    Rsi,
    Macd,
    MacdSignal,
    MacdHistogram,
    BbUpper,
    BbMiddle,
    BbLower,
    Atr,
    Volatility,
    StochK,
    StochD,
    IchimokuTenkan,
    IchimokuKijun,
    IchimokuSenkouA,
    IchimokuSenkouB,
    IchimokuChikou,
    Obv,
}

impl IndicatorField {
    pub const ALL: [IndicatorField; 20] = [
        IndicatorField::Close,
        IndicatorField::Sma,
        IndicatorField::Ema,
        IndicatorField::Rsi,
        IndicatorField::Macd,
        IndicatorField::MacdSignal,
        IndicatorField::MacdHistogram,
        IndicatorField::BbUpper,
        IndicatorField::BbMiddle,
        IndicatorField::BbLower,
        IndicatorField::Atr,
        IndicatorField::Volatility,
        IndicatorField::StochK,
        IndicatorField::StochD,
        IndicatorField::IchimokuTenkan,
        IndicatorField::IchimokuKijun,
        IndicatorField::IchimokuSenkouA,
        IndicatorField::IchimokuSenkouB,
        IndicatorField::IchimokuChikou,
        IndicatorField::Obv,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorField::Close => "close",
            IndicatorField::Sma => "sma",
            IndicatorField::Ema => "ema",
            IndicatorField::Rsi => "rsi",
            IndicatorField::Macd => "macd",
            IndicatorField::MacdSignal => "macd_signal",
            IndicatorField::MacdHistogram => "macd_histogram",
            IndicatorField::BbUpper => "bb_upper",
            IndicatorField::BbMiddle => "bb_middle",
            IndicatorField::BbLower => "bb_lower",
            IndicatorField::Atr => "atr",
            IndicatorField::Volatility => "volatility",
            IndicatorField::StochK => "stoch_k",
            IndicatorField::StochD => "stoch_d",
            IndicatorField::IchimokuTenkan => "ichimoku_tenkan",
            IndicatorField::IchimokuKijun => "ichimoku_kijun",
            IndicatorField::IchimokuSenkouA => "ichimoku_senkou_a",
            IndicatorField::IchimokuSenkouB => "ichimoku_senkou_b",
            IndicatorField::IchimokuChikou => "ichimoku_chikou",
            IndicatorField::Obv => "obv",
        }
    }
}

impl fmt::Display for IndicatorField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndicatorField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        IndicatorField::ALL
            .iter()
            .copied()
            .find(|field| field.as_str() == name)
            .ok_or_else(|| format!("unknown indicator field: {}", s))
    }
}

/// Latest value of every indicator that is available at a given point.
///
/// A field that has not warmed up yet is simply absent; non-finite values are
/// never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub timestamp: DateTime<Utc>,
    values: BTreeMap<IndicatorField, f64>,
}

impl IndicatorSnapshot {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            values: BTreeMap::new(),
        }
    }

    pub fn with(mut self, field: IndicatorField, value: f64) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: IndicatorField, value: f64) {
        if value.is_finite() {
            self.values.insert(field, value);
        }
    }

    pub fn insert_opt(&mut self, field: IndicatorField, value: Option<f64>) {
        if let Some(v) = value {
            self.insert(field, v);
        }
    }

    pub fn get(&self, field: IndicatorField) -> Option<f64> {
        self.values.get(&field).copied()
    }

    pub fn contains_all(&self, fields: &[IndicatorField]) -> bool {
        fields.iter().all(|f| self.values.contains_key(f))
    }

    pub fn iter(&self) -> impl Iterator<Item = (IndicatorField, f64)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
    pub period: (u32, u32, u32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BollingerBands {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
    pub period: u32,
    pub std_dev: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StochasticSeries {
    pub k: Vec<Option<f64>>,
    pub d: Vec<Option<f64>>,
    pub period: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IchimokuSeries {
    pub tenkan: Vec<Option<f64>>,
    pub kijun: Vec<Option<f64>>,
    pub senkou_a: Vec<Option<f64>>,
    pub senkou_b: Vec<Option<f64>>,
    pub chikou: Vec<Option<f64>>,
}

/// A single retracement level between the window's first and last close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FibonacciLevel {
    pub ratio: f64,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FibonacciLevels {
    pub start: f64,
    pub end: f64,
    pub levels: Vec<FibonacciLevel>,
}
