//! Price data validation for live ticks and historical bars

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::models::{Bar, Tick};

pub const MIN_PRICE: f64 = 1e-10;
pub const MAX_PRICE: f64 = 1e10;
pub const MAX_VOLUME: f64 = 1e14;

/// Quote assets recognized when splitting a concatenated symbol.
pub const QUOTE_SUFFIXES: [&str; 5] = ["USDT", "USDC", "TUSD", "BTC", "ETH"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorCode {
    MissingField,
    PriceRange,
    VolumeRange,
    TimestampFuture,
    SymbolFormat,
    TimeContinuity,
    DuplicateTimestamp,
    NullValues,
}

impl ValidationErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationErrorCode::MissingField => "missing_field",
            ValidationErrorCode::PriceRange => "price_range",
            ValidationErrorCode::VolumeRange => "volume_range",
            ValidationErrorCode::TimestampFuture => "timestamp_future",
            ValidationErrorCode::SymbolFormat => "symbol_format",
            ValidationErrorCode::TimeContinuity => "time_continuity",
            ValidationErrorCode::DuplicateTimestamp => "duplicate_timestamp",
            ValidationErrorCode::NullValues => "null_values",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub code: ValidationErrorCode,
    pub message: String,
}

impl ValidationError {
    fn new(code: ValidationErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Outcome of validating one tick or a batch of bars.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceValidationResult<T> {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<String>,
    /// The validated (and normalized) input; `None` when any error was found.
    pub validated: Option<T>,
}

impl<T> PriceValidationResult<T> {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_error(&self, code: ValidationErrorCode) -> bool {
        self.errors.iter().any(|e| e.code == code)
    }

    /// Convert into a `Result`, keeping the validated value on success.
    pub fn into_result(self) -> Result<T, Vec<ValidationError>> {
        match self.validated {
            Some(value) if self.errors.is_empty() => Ok(value),
            _ => Err(self.errors),
        }
    }
}

/// Normalize a symbol to `BASE/QUOTE`.
///
/// Symbols already containing `/` are returned unchanged. Returns `None` for
/// symbols too short to split.
pub fn normalize_symbol(symbol: &str) -> Option<String> {
    let symbol = symbol.trim();
    if symbol.contains('/') {
        return Some(symbol.to_string());
    }

    for suffix in QUOTE_SUFFIXES {
        if let Some(base) = symbol.strip_suffix(suffix) {
            if !base.is_empty() {
                return Some(format!("{}/{}", base, suffix));
            }
        }
    }

    let len = symbol.chars().count();
    if len > 4 {
        let mid = len / 2;
        let base: String = symbol.chars().take(mid).collect();
        let quote: String = symbol.chars().skip(mid).collect();
        Some(format!("{}/{}", base, quote))
    } else if len == 4 {
        let base: String = symbol.chars().take(1).collect();
        let quote: String = symbol.chars().skip(1).collect();
        Some(format!("{}/{}", base, quote))
    } else {
        None
    }
}

fn check_price(price: f64, label: &str, errors: &mut Vec<ValidationError>) {
    if !(MIN_PRICE..=MAX_PRICE).contains(&price) {
        errors.push(ValidationError::new(
            ValidationErrorCode::PriceRange,
            format!("{} {} outside valid range", label, price),
        ));
    }
}

fn check_volume(volume: f64, errors: &mut Vec<ValidationError>) {
    if !(0.0..=MAX_VOLUME).contains(&volume) {
        errors.push(ValidationError::new(
            ValidationErrorCode::VolumeRange,
            format!("Volume {} outside valid range", volume),
        ));
    }
}

/// Validate a single live tick against `now`.
///
/// On success the returned tick carries the normalized `BASE/QUOTE` symbol in
/// [`PriceValidationResult::validated`]; the input tick is not modified.
pub fn validate_tick(tick: &Tick, now: DateTime<Utc>) -> PriceValidationResult<Tick> {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if tick.symbol.trim().is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorCode::MissingField,
            "Missing required field: symbol",
        ));
        return PriceValidationResult {
            errors,
            warnings,
            validated: None,
        };
    }

    if !tick.price.is_finite() || !tick.volume.is_finite() {
        errors.push(ValidationError::new(
            ValidationErrorCode::NullValues,
            "price and volume must be finite",
        ));
    }

    check_price(tick.price, "Price", &mut errors);
    check_volume(tick.volume, &mut errors);

    if let (Some(high), Some(low)) = (tick.high, tick.low) {
        if high < low {
            warnings.push(format!("high {} below low {}", high, low));
        }
    }

    if tick.timestamp > now + Duration::minutes(1) {
        errors.push(ValidationError::new(
            ValidationErrorCode::TimestampFuture,
            "Timestamp cannot be in the future",
        ));
    }

    let normalized = normalize_symbol(&tick.symbol);
    if normalized.is_none() {
        errors.push(ValidationError::new(
            ValidationErrorCode::SymbolFormat,
            "Invalid symbol format. Expected format: BASE/QUOTE (e.g., BTC/USDT)",
        ));
    }

    let validated = match normalized {
        Some(symbol) if errors.is_empty() => Some(Tick {
            symbol,
            ..tick.clone()
        }),
        _ => None,
    };

    PriceValidationResult {
        errors,
        warnings,
        validated,
    }
}

/// Default maximum gap between consecutive historical bars.
pub fn default_max_gap() -> Duration {
    Duration::hours(1)
}

/// Validate an ordered batch of historical bars.
pub fn validate_bars(bars: &[Bar], max_gap: Duration) -> PriceValidationResult<Vec<Bar>> {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let non_finite = bars
        .iter()
        .filter(|b| {
            ![b.open, b.high, b.low, b.close, b.volume]
                .iter()
                .all(|v| v.is_finite())
        })
        .count();
    if non_finite > 0 {
        errors.push(ValidationError::new(
            ValidationErrorCode::NullValues,
            format!("Found {} bars with missing or non-finite values", non_finite),
        ));
    }

    if bars.windows(2).any(|w| w[1].timestamp - w[0].timestamp > max_gap) {
        errors.push(ValidationError::new(
            ValidationErrorCode::TimeContinuity,
            format!("Found gaps larger than {} minutes in time series", max_gap.num_minutes()),
        ));
    }

    let mut seen = HashSet::with_capacity(bars.len());
    if bars.iter().any(|b| !seen.insert(b.timestamp)) {
        errors.push(ValidationError::new(
            ValidationErrorCode::DuplicateTimestamp,
            "Found duplicate timestamps",
        ));
    }

    if bars.windows(2).any(|w| w[1].timestamp < w[0].timestamp) {
        warnings.push("bars are not in ascending time order".to_string());
    }

    for bar in bars {
        check_price(bar.close, "Close", &mut errors);
        check_volume(bar.volume, &mut errors);
        if bar.high < bar.low {
            warnings.push(format!("bar at {} has high below low", bar.timestamp));
        }
    }

    let validated = if errors.is_empty() {
        Some(bars.to_vec())
    } else {
        None
    };

    PriceValidationResult {
        errors,
        warnings,
        validated,
    }
}
