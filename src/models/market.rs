//! Market data primitives: live ticks, historical bars, and the observations
//! kept in the rolling buffer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single live price update as delivered by the exchange stream.
///
/// `high`/`low` are optional; when absent they default to `price`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub symbol: String,
    pub price: f64,
    pub volume: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl Tick {
    pub fn new(symbol: impl Into<String>, price: f64, volume: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            volume,
            high: None,
            low: None,
            timestamp,
        }
    }

    pub fn with_range(mut self, high: f64, low: f64) -> Self {
        self.high = Some(high);
        self.low = Some(low);
        self
    }

    pub fn high_or_price(&self) -> f64 {
        self.high.unwrap_or(self.price)
    }

    pub fn low_or_price(&self) -> f64 {
        self.low.unwrap_or(self.price)
    }
}

/// One OHLCV bar from the historical endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn new(open: f64, high: f64, low: f64, close: f64, volume: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// A point in the rolling window the indicator engine reads from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open: Option<f64>,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Observation {
    pub fn new(timestamp: DateTime<Utc>, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open: None,
            high,
            low,
            close,
            volume,
        }
    }

    /// Observation whose high and low collapse onto the close.
    pub fn from_close(timestamp: DateTime<Utc>, close: f64, volume: f64) -> Self {
        Self::new(timestamp, close, close, close, volume)
    }

    pub fn with_open(mut self, open: f64) -> Self {
        self.open = Some(open);
        self
    }
}

impl From<&Tick> for Observation {
    fn from(tick: &Tick) -> Self {
        Observation::new(
            tick.timestamp,
            tick.high_or_price(),
            tick.low_or_price(),
            tick.price,
            tick.volume,
        )
    }
}

impl From<&Bar> for Observation {
    fn from(bar: &Bar) -> Self {
        Observation::new(bar.timestamp, bar.high, bar.low, bar.close, bar.volume).with_open(bar.open)
    }
}

impl From<Bar> for Observation {
    fn from(bar: Bar) -> Self {
        Observation::from(&bar)
    }
}
