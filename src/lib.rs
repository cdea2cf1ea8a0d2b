//! Streaming technical analysis: rolling indicators, rule-based signals,
//! signal filtering and performance tracking over a live tick stream.

pub mod common;
pub mod config;
pub mod core;
pub mod error;
pub mod indicators;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod performance;
pub mod services;
pub mod signals;
pub mod validation;

pub use error::{AnalyzerError, ConfigError, StreamError, SubscriberError};
