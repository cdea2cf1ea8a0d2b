//! Performance tracking data models

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::signal::SignalType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalOutcome {
    Pending,
    Success,
    Failure,
    Expired,
}

impl SignalOutcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SignalOutcome::Pending)
    }
}

/// What caused a tracked signal to leave the active set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionReason {
    StopLoss,
    TakeProfit,
    Timeout,
    ProfitThreshold,
    LossThreshold,
    Manual,
    /// Swept by the stale-signal cleanup without an exit price.
    Expired,
}

/// A signal registered with the performance tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalResult {
    pub signal_id: String,
    #[serde(rename = "type")]
    pub signal_type: SignalType,
    pub indicator: String,
    pub entry_price: f64,
    pub entry_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_time: Option<DateTime<Utc>>,
    pub outcome: SignalOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_reason: Option<CompletionReason>,
}

impl SignalResult {
    pub fn holding_time(&self) -> Option<Duration> {
        self.exit_time.map(|exit| exit - self.entry_time)
    }
}

/// Aggregate statistics over completed signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_signals: usize,
    pub success_count: usize,
    pub failure_count: usize,
    pub expired_count: usize,
    pub win_rate: f64,
    pub avg_return: f64,
    /// Mean holding duration in seconds.
    pub avg_holding_time_secs: f64,
    /// `f64::INFINITY` when there are no losing signals.
    pub profit_factor: f64,
    pub accuracy_by_indicator: HashMap<String, f64>,
    pub accuracy_by_type: HashMap<String, f64>,
}

impl PerformanceMetrics {
    pub fn empty() -> Self {
        Self {
            total_signals: 0,
            success_count: 0,
            failure_count: 0,
            expired_count: 0,
            win_rate: 0.0,
            avg_return: 0.0,
            avg_holding_time_secs: 0.0,
            profit_factor: 0.0,
            accuracy_by_indicator: HashMap::new(),
            accuracy_by_type: HashMap::new(),
        }
    }

    pub fn avg_holding_time(&self) -> Duration {
        Duration::milliseconds((self.avg_holding_time_secs * 1000.0).round() as i64)
    }
}
