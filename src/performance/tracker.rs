//! Per-signal lifecycle: PENDING until a completion trigger fires, then one of
//! SUCCESS, FAILURE or EXPIRED. A signal lives in exactly one of the active map
//! or the completed list.

use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{CompletionReason, PerformanceMetrics, Signal, SignalOutcome, SignalResult, SignalType};
use crate::performance::stats::{calculate_return, compute_metrics};

#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    /// Max time a signal may stay active before it completes at market.
    pub signal_timeout: Duration,
    /// Return (in %) at or above which a signal counts as a success.
    pub min_profit_threshold: f64,
    /// Return (in %) at or below which a signal counts as a failure.
    pub max_loss_threshold: f64,
    /// Distance of the stop-loss from entry, in %, applied by [`PerformanceTracker::register`].
    pub stop_loss_pct: Option<f64>,
    /// Distance of the take-profit from entry, in %, applied by [`PerformanceTracker::register`].
    pub take_profit_pct: Option<f64>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            signal_timeout: Duration::hours(24),
            min_profit_threshold: 0.5,
            max_loss_threshold: -1.0,
            stop_loss_pct: None,
            take_profit_pct: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct PerformanceTracker {
    config: TrackerConfig,
    active: HashMap<String, SignalResult>,
    completed: Vec<SignalResult>,
    /// Every id ever added, active or completed.
    seen: HashSet<String>,
}

impl PerformanceTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            active: HashMap::new(),
            completed: Vec::new(),
            seen: HashSet::new(),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Start tracking a signal. Returns `None` if `signal_id` is already known.
    pub fn add_signal(
        &mut self,
        signal_id: impl Into<String>,
        signal_type: SignalType,
        indicator: impl Into<String>,
        entry_price: f64,
        entry_time: DateTime<Utc>,
        stop_loss: Option<f64>,
        take_profit: Option<f64>,
    ) -> Option<SignalResult> {
        let signal_id = signal_id.into();
        if !self.seen.insert(signal_id.clone()) {
            warn!(signal_id = %signal_id, "PerformanceTracker: duplicate signal id ignored");
            return None;
        }

        let result = SignalResult {
            signal_id: signal_id.clone(),
            signal_type,
            indicator: indicator.into(),
            entry_price,
            entry_time,
            exit_price: None,
            exit_time: None,
            outcome: SignalOutcome::Pending,
            return_pct: None,
            stop_loss,
            take_profit,
            exit_reason: None,
        };

        info!(
            signal_id = %signal_id,
            signal_type = %signal_type,
            indicator = %result.indicator,
            entry_price,
            "PerformanceTracker: signal added"
        );
        self.active.insert(signal_id, result.clone());
        Some(result)
    }

    /// Track an accepted signal under a fresh id, entering at `entry_price`.
    ///
    /// Stop-loss and take-profit levels are derived from the configured
    /// percentages, mirrored for SELL signals.
    pub fn register(&mut self, signal: &Signal, entry_price: f64) -> Option<SignalResult> {
        let (stop_loss, take_profit) = self.protective_levels(signal.signal_type, entry_price);
        self.add_signal(
            Uuid::new_v4().to_string(),
            signal.signal_type,
            signal.indicator.clone(),
            entry_price,
            signal.timestamp,
            stop_loss,
            take_profit,
        )
    }

    fn protective_levels(&self, signal_type: SignalType, entry_price: f64) -> (Option<f64>, Option<f64>) {
        let below = |pct: f64| entry_price * (1.0 - pct / 100.0);
        let above = |pct: f64| entry_price * (1.0 + pct / 100.0);
        match signal_type {
            SignalType::Buy => (
                self.config.stop_loss_pct.map(below),
                self.config.take_profit_pct.map(above),
            ),
            SignalType::Sell => (
                self.config.stop_loss_pct.map(above),
                self.config.take_profit_pct.map(below),
            ),
        }
    }

    /// Re-evaluate one active signal at `price`.
    ///
    /// Returns the record after the update (completed or still pending), or
    /// `None` when `signal_id` is not active.
    pub fn update_signal(&mut self, signal_id: &str, price: f64, now: DateTime<Utc>) -> Option<SignalResult> {
        let reason = self.completion_reason(self.active.get(signal_id)?, price, now);
        match reason {
            Some(reason) => self.finish(signal_id, Some(price), now, reason),
            None => self.active.get(signal_id).cloned(),
        }
    }

    /// Re-evaluate every active signal at `price`, returning those that completed.
    pub fn update_all(&mut self, price: f64, now: DateTime<Utc>) -> Vec<SignalResult> {
        let mut due: Vec<(String, DateTime<Utc>, CompletionReason)> = self
            .active
            .values()
            .filter_map(|s| {
                self.completion_reason(s, price, now)
                    .map(|reason| (s.signal_id.clone(), s.entry_time, reason))
            })
            .collect();
        due.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

        due.into_iter()
            .filter_map(|(id, _, reason)| self.finish(&id, Some(price), now, reason))
            .collect()
    }

    /// Complete an active signal at `exit_price` regardless of triggers.
    pub fn complete_signal(&mut self, signal_id: &str, exit_price: f64, now: DateTime<Utc>) -> Option<SignalResult> {
        self.finish(signal_id, Some(exit_price), now, CompletionReason::Manual)
    }

    /// Move every active signal older than the timeout to the completed set
    /// as EXPIRED, without an exit price.
    pub fn expire_stale(&mut self, now: DateTime<Utc>) -> Vec<SignalResult> {
        let timeout = self.config.signal_timeout;
        let mut stale: Vec<(String, DateTime<Utc>)> = self
            .active
            .values()
            .filter(|s| now - s.entry_time >= timeout)
            .map(|s| (s.signal_id.clone(), s.entry_time))
            .collect();
        stale.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

        stale
            .into_iter()
            .filter_map(|(id, _)| self.finish(&id, None, now, CompletionReason::Expired))
            .collect()
    }

    pub fn get(&self, signal_id: &str) -> Option<&SignalResult> {
        self.active
            .get(signal_id)
            .or_else(|| self.completed.iter().find(|s| s.signal_id == signal_id))
    }

    pub fn is_active(&self, signal_id: &str) -> bool {
        self.active.contains_key(signal_id)
    }

    /// Active signals ordered by entry time.
    pub fn active_signals(&self) -> Vec<&SignalResult> {
        let mut active: Vec<&SignalResult> = self.active.values().collect();
        active.sort_by(|a, b| a.entry_time.cmp(&b.entry_time));
        active
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Completed signals in completion order.
    pub fn completed_signals(&self) -> &[SignalResult] {
        &self.completed
    }

    /// Metrics over completed signals, limited to those entered within
    /// `window` before `as_of` when a window is given.
    pub fn performance_metrics(&self, window: Option<Duration>, as_of: DateTime<Utc>) -> PerformanceMetrics {
        match window {
            Some(window) => {
                let cutoff = as_of - window;
                compute_metrics(self.completed.iter().filter(|s| s.entry_time >= cutoff))
            }
            None => compute_metrics(&self.completed),
        }
    }

    fn completion_reason(&self, signal: &SignalResult, price: f64, now: DateTime<Utc>) -> Option<CompletionReason> {
        let is_buy = signal.signal_type == SignalType::Buy;

        if let Some(stop) = signal.stop_loss {
            let hit = if is_buy { price <= stop } else { price >= stop };
            if hit {
                return Some(CompletionReason::StopLoss);
            }
        }

        if let Some(target) = signal.take_profit {
            let hit = if is_buy { price >= target } else { price <= target };
            if hit {
                return Some(CompletionReason::TakeProfit);
            }
        }

        if now - signal.entry_time >= self.config.signal_timeout {
            return Some(CompletionReason::Timeout);
        }

        let return_pct = calculate_return(signal.signal_type, signal.entry_price, price);
        if return_pct >= self.config.min_profit_threshold {
            Some(CompletionReason::ProfitThreshold)
        } else if return_pct <= self.config.max_loss_threshold {
            Some(CompletionReason::LossThreshold)
        } else {
            None
        }
    }

    fn classify(&self, reason: CompletionReason, return_pct: Option<f64>) -> SignalOutcome {
        match return_pct {
            Some(r) if r >= self.config.min_profit_threshold => SignalOutcome::Success,
            Some(r) if r <= self.config.max_loss_threshold => SignalOutcome::Failure,
            _ => match reason {
                CompletionReason::StopLoss => SignalOutcome::Failure,
                CompletionReason::TakeProfit => SignalOutcome::Success,
                _ => SignalOutcome::Expired,
            },
        }
    }

    /// The only place a signal leaves the active map.
    fn finish(
        &mut self,
        signal_id: &str,
        exit_price: Option<f64>,
        now: DateTime<Utc>,
        reason: CompletionReason,
    ) -> Option<SignalResult> {
        let mut signal = self.active.remove(signal_id)?;

        signal.return_pct = exit_price.map(|p| calculate_return(signal.signal_type, signal.entry_price, p));
        signal.exit_price = exit_price;
        signal.exit_time = Some(now);
        signal.exit_reason = Some(reason);
        signal.outcome = if reason == CompletionReason::Expired {
            SignalOutcome::Expired
        } else {
            self.classify(reason, signal.return_pct)
        };

        match signal.return_pct {
            Some(r) => info!(
                signal_id = %signal.signal_id,
                outcome = ?signal.outcome,
                reason = ?reason,
                return_pct = r,
                "PerformanceTracker: signal completed with return {:.2}%",
                r
            ),
            None => debug!(signal_id = %signal.signal_id, "PerformanceTracker: signal expired"),
        }

        self.completed.push(signal.clone());
        Some(signal)
    }
}
