use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a trading signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalType {
    Buy,
    Sell,
}

impl SignalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalType::Buy => "BUY",
            SignalType::Sell => "SELL",
        }
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directional signal produced by one strategy for one observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    #[serde(rename = "type")]
    pub signal_type: SignalType,
    pub indicator: String,
    pub strength: f64,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Signal {
    /// Strength is clamped into `[0, 1]`; NaN collapses to 0.
    pub fn new(
        signal_type: SignalType,
        indicator: impl Into<String>,
        strength: f64,
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let strength = if strength.is_nan() {
            0.0
        } else {
            strength.clamp(0.0, 1.0)
        };
        Self {
            signal_type,
            indicator: indicator.into(),
            strength,
            message: message.into(),
            timestamp,
        }
    }

    pub fn is_buy(&self) -> bool {
        self.signal_type == SignalType::Buy
    }
}

/// Value pushed to indicator subscribers on every analysed tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorUpdate {
    pub indicator: String,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}
