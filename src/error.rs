//! Error types for the streaming layers.
//!
//! Indicator and validation errors live next to the code that raises them;
//! everything the orchestrator can surface is collected in [`AnalyzerError`].

use thiserror::Error;

use crate::indicators::IndicatorError;
use crate::models::UnsupportedTimeframe;
use crate::validation::ValidationError;

/// Failures of a tick source or historical data provider.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("failed to decode message: {0}")]
    Decode(String),

    #[error("invalid symbol: {0}")]
    InvalidSymbol(String),

    #[error("exchange returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("stream not connected")]
    NotConnected,

    #[error("stream closed")]
    Closed,
}

impl From<serde_json::Error> for StreamError {
    fn from(e: serde_json::Error) -> Self {
        StreamError::Decode(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Raised by a subscriber callback. Logged and counted by the analyzer, never
/// propagated to the tick loop.
#[derive(Debug, Error)]
pub enum SubscriberError {
    #[error("{0}")]
    Failed(String),

    #[error("subscriber timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("subscriber panicked")]
    Panicked,
}

impl SubscriberError {
    pub fn failed(msg: impl Into<String>) -> Self {
        SubscriberError::Failed(msg.into())
    }
}

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error(transparent)]
    Indicator(#[from] IndicatorError),

    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    UnsupportedTimeframe(#[from] UnsupportedTimeframe),

    #[error("invalid tick: {0}")]
    InvalidTick(String),

    #[error("tick for {got} sent to analyzer for {expected}")]
    SymbolMismatch { expected: String, got: String },

    #[error("analyzer for {0} is already running")]
    AlreadyRunning(String),

    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl From<Vec<ValidationError>> for AnalyzerError {
    fn from(errors: Vec<ValidationError>) -> Self {
        let joined = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        AnalyzerError::InvalidTick(joined)
    }
}
