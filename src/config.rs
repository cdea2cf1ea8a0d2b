//! Configuration loaded from the process environment.
//!
//! Every value has a default; a `.env` file is read first when present.

use chrono::Duration as ChronoDuration;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

use crate::error::ConfigError;
use crate::indicators::{IndicatorParams, IndicatorRegistry};
use crate::models::Timeframe;
use crate::performance::TrackerConfig;
use crate::signals::{FilterConfig, StrengthScaling};

pub const DEFAULT_BINANCE_WS_URL: &str = "wss://stream.binance.com:9443/ws";
pub const DEFAULT_BINANCE_REST_URL: &str = "https://api.binance.com";

/// Get the current environment (production or sandbox).
///
/// Reads `APP_ENV`, defaulting to `sandbox`.
pub fn get_environment() -> String {
    env::var("APP_ENV")
        .map(|v| v.trim().to_lowercase())
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "sandbox".to_string())
}

pub fn is_production() -> bool {
    matches!(get_environment().as_str(), "production" | "prod")
}

/// Per-symbol settings for one realtime analyzer.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub symbol: String,
    pub buffer_capacity: usize,
    /// Observations required before indicators are computed.
    pub warmup_period: usize,
    /// Cadence of the tick stream, used to annualize volatility.
    pub timeframe: Timeframe,
    pub reconnect_delay: Duration,
    /// 0 retries forever.
    pub max_reconnect_attempts: usize,
    pub subscriber_timeout: Duration,
    pub indicators: IndicatorParams,
    pub scaling: StrengthScaling,
    pub filter: FilterConfig,
    pub tracker: TrackerConfig,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        let timeframe = Timeframe::H1;
        Self {
            symbol: "BTCUSDT".to_string(),
            buffer_capacity: 100,
            warmup_period: 14,
            timeframe,
            reconnect_delay: Duration::from_millis(5000),
            max_reconnect_attempts: 0,
            subscriber_timeout: Duration::from_millis(2000),
            indicators: IndicatorParams {
                periods_per_year: timeframe.periods_per_year(),
                ..IndicatorParams::default()
            },
            scaling: StrengthScaling::default(),
            filter: FilterConfig::default(),
            tracker: TrackerConfig::default(),
        }
    }
}

impl AnalyzerConfig {
    pub fn for_symbol(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Self::default()
        }
    }

    /// Copy of this config bound to another symbol.
    pub fn with_symbol(&self, symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..self.clone()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbol.trim().is_empty() {
            return Err(ConfigError::Invalid("symbol must not be empty".into()));
        }
        if self.buffer_capacity == 0 {
            return Err(ConfigError::Invalid("buffer capacity must be positive".into()));
        }
        if self.warmup_period == 0 || self.warmup_period > self.buffer_capacity {
            return Err(ConfigError::Invalid(format!(
                "warm-up period {} must be between 1 and the buffer capacity {}",
                self.warmup_period, self.buffer_capacity
            )));
        }
        if !(0.0..=1.0).contains(&self.filter.min_strength) {
            return Err(ConfigError::Invalid(format!(
                "minimum strength {} outside [0, 1]",
                self.filter.min_strength
            )));
        }
        if self.filter.cooldown_period < ChronoDuration::zero()
            || self.filter.confirmation_window < ChronoDuration::zero()
        {
            return Err(ConfigError::Invalid(
                "cooldown and confirmation window must not be negative".into(),
            ));
        }
        if self.tracker.signal_timeout <= ChronoDuration::zero() {
            return Err(ConfigError::Invalid(format!(
                "signal timeout {} must be positive",
                self.tracker.signal_timeout
            )));
        }
        if !self.tracker.min_profit_threshold.is_finite() || !self.tracker.max_loss_threshold.is_finite() {
            return Err(ConfigError::Invalid("outcome thresholds must be finite".into()));
        }
        for level in [self.tracker.stop_loss_pct, self.tracker.take_profit_pct].into_iter().flatten() {
            if !level.is_finite() || level <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "protective level {} must be a positive percentage",
                    level
                )));
            }
        }
        if self.tracker.min_profit_threshold <= self.tracker.max_loss_threshold {
            return Err(ConfigError::Invalid(format!(
                "profit threshold {} must exceed loss threshold {}",
                self.tracker.min_profit_threshold, self.tracker.max_loss_threshold
            )));
        }

        let lookback = IndicatorRegistry::max_lookback(&self.indicators);
        if self.buffer_capacity <= lookback {
            warn!(
                symbol = %self.symbol,
                capacity = self.buffer_capacity,
                lookback,
                "Buffer capacity does not exceed the longest indicator lookback; long-period indicators will stay undefined"
            );
        }
        Ok(())
    }
}

/// Process-level configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub symbols: Vec<String>,
    /// Template applied to every symbol.
    pub analyzer: AnalyzerConfig,
    pub binance_ws_url: String,
    pub binance_rest_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            symbols: vec!["BTCUSDT".to_string()],
            analyzer: AnalyzerConfig::default(),
            binance_ws_url: DEFAULT_BINANCE_WS_URL.to_string(),
            binance_rest_url: DEFAULT_BINANCE_REST_URL.to_string(),
        }
    }
}

impl Config {
    /// Load from the environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(&lookup);
        let defaults = AnalyzerConfig::default();

        let symbols = vars
            .list("SYMBOLS")
            .map(|list| list.into_iter().map(|s| s.to_uppercase()).collect::<Vec<_>>())
            .unwrap_or_else(|| vec!["BTCUSDT".to_string()]);
        if symbols.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "SYMBOLS",
                value: String::new(),
                reason: "at least one symbol is required".into(),
            });
        }

        let timeframe: Timeframe = vars.parse("TIMEFRAME", defaults.timeframe)?;

        let allowed = vars.list("ALLOWED_INDICATORS");
        let filter = FilterConfig {
            min_strength: vars.parse("MIN_SIGNAL_STRENGTH", defaults.filter.min_strength)?,
            required_confirmations: vars.parse("REQUIRED_CONFIRMATIONS", defaults.filter.required_confirmations)?,
            cooldown_period: vars.duration(
                "SIGNAL_COOLDOWN_SECONDS",
                defaults.filter.cooldown_period,
                ChronoDuration::try_seconds,
            )?,
            allowed_indicators: allowed.map(|list| list.into_iter().map(|s| s.to_uppercase()).collect()),
            confirmation_window: defaults.filter.confirmation_window,
        };
        if filter.required_confirmations == 0 {
            return Err(ConfigError::InvalidValue {
                key: "REQUIRED_CONFIRMATIONS",
                value: "0".into(),
                reason: "must be at least 1".into(),
            });
        }

        let tracker = TrackerConfig {
            signal_timeout: vars.duration(
                "SIGNAL_TIMEOUT_HOURS",
                defaults.tracker.signal_timeout,
                ChronoDuration::try_hours,
            )?,
            min_profit_threshold: vars.parse("MIN_PROFIT_THRESHOLD", defaults.tracker.min_profit_threshold)?,
            max_loss_threshold: vars.parse("MAX_LOSS_THRESHOLD", defaults.tracker.max_loss_threshold)?,
            stop_loss_pct: vars.parse_opt("STOP_LOSS_PCT")?,
            take_profit_pct: vars.parse_opt("TAKE_PROFIT_PCT")?,
        };

        let analyzer = AnalyzerConfig {
            symbol: symbols[0].clone(),
            buffer_capacity: vars.parse("BUFFER_CAPACITY", defaults.buffer_capacity)?,
            warmup_period: vars.parse("WARMUP_PERIOD", defaults.warmup_period)?,
            timeframe,
            reconnect_delay: Duration::from_millis(vars.parse("RECONNECT_DELAY_MS", 5000u64)?),
            max_reconnect_attempts: vars.parse("MAX_RECONNECT_ATTEMPTS", defaults.max_reconnect_attempts)?,
            subscriber_timeout: Duration::from_millis(vars.parse("SUBSCRIBER_TIMEOUT_MS", 2000u64)?),
            indicators: IndicatorParams {
                periods_per_year: timeframe.periods_per_year(),
                ..IndicatorParams::default()
            },
            scaling: StrengthScaling::default(),
            filter,
            tracker,
        };
        analyzer.validate()?;

        Ok(Self {
            symbols,
            analyzer,
            binance_ws_url: vars.string("BINANCE_WS_URL", DEFAULT_BINANCE_WS_URL),
            binance_rest_url: vars.string("BINANCE_REST_URL", DEFAULT_BINANCE_REST_URL),
        })
    }

    /// Analyzer configs for every configured symbol.
    pub fn analyzer_configs(&self) -> Vec<AnalyzerConfig> {
        self.symbols.iter().map(|s| self.analyzer.with_symbol(s.clone())).collect()
    }
}

struct Vars<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Vars<'_, F> {
    fn raw(&self, key: &str) -> Option<String> {
        (self.0)(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
    }

    fn string(&self, key: &str, default: &str) -> String {
        self.raw(key).unwrap_or_else(|| default.to_string())
    }

    fn list(&self, key: &str) -> Option<Vec<String>> {
        self.raw(key).map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
    }

    fn parse<T>(&self, key: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        Ok(self.parse_opt(key)?.unwrap_or(default))
    }

    /// Non-negative whole number of units, rejected when it overflows a duration.
    fn duration(
        &self,
        key: &'static str,
        default: ChronoDuration,
        from_units: impl Fn(i64) -> Option<ChronoDuration>,
    ) -> Result<ChronoDuration, ConfigError> {
        let Some(units) = self.parse_opt::<i64>(key)? else {
            return Ok(default);
        };
        let invalid = |reason: &str| ConfigError::InvalidValue {
            key,
            value: units.to_string(),
            reason: reason.to_string(),
        };
        if units < 0 {
            return Err(invalid("must not be negative"));
        }
        from_units(units).ok_or_else(|| invalid("out of range"))
    }

    fn parse_opt<T>(&self, key: &'static str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.raw(key) {
            None => Ok(None),
            Some(value) => value.parse().map(Some).map_err(|e: T::Err| ConfigError::InvalidValue {
                key,
                reason: e.to_string(),
                value,
            }),
        }
    }
}
