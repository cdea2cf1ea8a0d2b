//! Wire formats for the Binance spot API

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

use crate::error::StreamError;
use crate::models::{Bar, Tick};

/// Binance error code for an unknown symbol.
pub const INVALID_SYMBOL_CODE: i64 = -1121;

/// 24h rolling ticker event from `<symbol>@ticker`.
///
/// Numeric fields arrive as strings:
/// ```json
/// {"e":"24hrTicker","E":1672515782136,"s":"BTCUSDT","c":"16600.10",
///  "h":"16700.00","l":"16500.00","v":"1234.5"}
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct TickerEvent {
    #[serde(rename = "e", default)]
    pub event_type: String,
    /// Event time (milliseconds)
    #[serde(rename = "E")]
    pub event_time: i64,
    #[serde(rename = "s")]
    pub symbol: String,
    /// Last price
    #[serde(rename = "c")]
    pub close: String,
    /// Base asset volume over 24h
    #[serde(rename = "v")]
    pub volume: String,
    #[serde(rename = "h")]
    pub high: String,
    #[serde(rename = "l")]
    pub low: String,
}

impl TickerEvent {
    pub fn to_tick(&self) -> Result<Tick, StreamError> {
        let timestamp = millis_to_utc(self.event_time)?;
        Ok(Tick {
            symbol: self.symbol.clone(),
            price: parse_number(&self.close, "c")?,
            volume: parse_number(&self.volume, "v")?,
            high: Some(parse_number(&self.high, "h")?),
            low: Some(parse_number(&self.low, "l")?),
            timestamp,
        })
    }
}

/// Body of a Binance REST error response.
#[derive(Debug, Clone, Deserialize)]
pub struct BinanceErrorBody {
    pub code: i64,
    pub msg: String,
}

fn parse_number(raw: &str, field: &str) -> Result<f64, StreamError> {
    raw.parse::<f64>()
        .map_err(|e| StreamError::Decode(format!("field {}: {:?} ({})", field, raw, e)))
}

fn millis_to_utc(ms: i64) -> Result<DateTime<Utc>, StreamError> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| StreamError::Decode(format!("invalid timestamp {}", ms)))
}

fn json_number(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::String(s) => s.parse().ok(),
        serde_json::Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Parse one kline row.
///
/// ```text
/// [open_time, "open", "high", "low", "close", "volume", close_time, ...]
/// ```
pub fn parse_kline(row: &[serde_json::Value]) -> Result<Bar, StreamError> {
    if row.len() < 6 {
        return Err(StreamError::Decode(format!("kline row has {} fields, expected at least 6", row.len())));
    }
    let open_time = row[0]
        .as_i64()
        .ok_or_else(|| StreamError::Decode("kline open time is not an integer".into()))?;
    let field = |i: usize| {
        json_number(&row[i]).ok_or_else(|| StreamError::Decode(format!("kline field {} is not numeric", i)))
    };

    Ok(Bar {
        timestamp: millis_to_utc(open_time)?,
        open: field(1)?,
        high: field(2)?,
        low: field(3)?,
        close: field(4)?,
        volume: field(5)?,
    })
}
