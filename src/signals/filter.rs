//! Stateful gate between the generator and the rest of the pipeline.
//!
//! Checks run in a fixed order: strength, allow-list, cooldown, cross-indicator
//! confirmation. All time arithmetic uses signal timestamps.

use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use tracing::debug;

use crate::models::{Signal, SignalType};

/// How many recent candidates are kept for confirmation counting.
pub const CONFIRMATION_HISTORY: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct FilterConfig {
    pub min_strength: f64,
    /// 1 disables the confirmation check.
    pub required_confirmations: u32,
    pub cooldown_period: Duration,
    pub allowed_indicators: Option<HashSet<String>>,
    /// Max age of another indicator's signal that still counts as a confirmation.
    pub confirmation_window: Duration,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_strength: 0.3,
            required_confirmations: 1,
            cooldown_period: Duration::seconds(300),
            allowed_indicators: None,
            confirmation_window: Duration::seconds(300),
        }
    }
}

impl FilterConfig {
    pub fn with_allowed_indicators<I, S>(mut self, indicators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_indicators = Some(indicators.into_iter().map(Into::into).collect());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Strength,
    NotAllowed,
    Cooldown,
    Confirmations,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RejectReason::Strength => "strength below minimum",
            RejectReason::NotAllowed => "indicator not allowed",
            RejectReason::Cooldown => "cooldown active",
            RejectReason::Confirmations => "insufficient confirmations",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDecision {
    Accepted,
    Rejected(RejectReason),
}

impl FilterDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, FilterDecision::Accepted)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Candidate {
    indicator: String,
    signal_type: SignalType,
    timestamp: DateTime<Utc>,
}

pub struct SignalFilter {
    config: FilterConfig,
    last_signal_time: HashMap<(String, SignalType), DateTime<Utc>>,
    recent: VecDeque<Candidate>,
}

impl SignalFilter {
    pub fn new(config: FilterConfig) -> Self {
        Self {
            config,
            last_signal_time: HashMap::new(),
            recent: VecDeque::with_capacity(CONFIRMATION_HISTORY),
        }
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Side-effect free verdict for `signal` against the current state.
    pub fn check(&self, signal: &Signal) -> FilterDecision {
        if !self.check_strength(signal) {
            return FilterDecision::Rejected(RejectReason::Strength);
        }
        if !self.check_indicator_allowed(signal) {
            return FilterDecision::Rejected(RejectReason::NotAllowed);
        }
        if !self.check_cooldown(signal) {
            return FilterDecision::Rejected(RejectReason::Cooldown);
        }
        if !self.check_confirmations(signal) {
            return FilterDecision::Rejected(RejectReason::Confirmations);
        }
        FilterDecision::Accepted
    }

    pub fn accept(&self, signal: &Signal) -> bool {
        self.check(signal).is_accepted()
    }

    /// Mark `signal` as accepted: starts its cooldown and makes it available
    /// as a confirmation for other indicators.
    pub fn record(&mut self, signal: &Signal) {
        self.last_signal_time.insert(
            (signal.indicator.clone(), signal.signal_type),
            signal.timestamp,
        );
        self.note_candidate(signal);
    }

    /// Add a signal that passed the strength and allow-list checks to the
    /// confirmation window. Recording the same signal twice is a no-op.
    pub fn note_candidate(&mut self, signal: &Signal) {
        let candidate = Candidate {
            indicator: signal.indicator.clone(),
            signal_type: signal.signal_type,
            timestamp: signal.timestamp,
        };
        if self.recent.contains(&candidate) {
            return;
        }
        self.recent.push_back(candidate);
        while self.recent.len() > CONFIRMATION_HISTORY {
            self.recent.pop_front();
        }
        let window = self.config.confirmation_window;
        let now = signal.timestamp;
        self.recent.retain(|c| now - c.timestamp <= window);
    }

    /// Full pipeline: check, feed the confirmation window, record on accept.
    pub fn apply(&mut self, signal: &Signal) -> FilterDecision {
        if self.check_strength(signal) && self.check_indicator_allowed(signal) {
            self.note_candidate(signal);
        }
        let decision = self.check(signal);
        match decision {
            FilterDecision::Accepted => self.record(signal),
            FilterDecision::Rejected(reason) => {
                debug!(
                    indicator = %signal.indicator,
                    signal_type = %signal.signal_type,
                    strength = signal.strength,
                    reason = %reason,
                    "SignalFilter: rejected"
                );
            }
        }
        decision
    }

    fn check_strength(&self, signal: &Signal) -> bool {
        signal.strength >= self.config.min_strength
    }

    fn check_indicator_allowed(&self, signal: &Signal) -> bool {
        match &self.config.allowed_indicators {
            Some(allowed) => allowed.contains(&signal.indicator),
            None => true,
        }
    }

    fn check_cooldown(&self, signal: &Signal) -> bool {
        let key = (signal.indicator.clone(), signal.signal_type);
        match self.last_signal_time.get(&key) {
            Some(last) => signal.timestamp - *last >= self.config.cooldown_period,
            None => true,
        }
    }

    fn check_confirmations(&self, signal: &Signal) -> bool {
        if self.config.required_confirmations <= 1 {
            return true;
        }
        let window = self.config.confirmation_window;
        let confirmations = self
            .recent
            .iter()
            .filter(|c| {
                let age = signal.timestamp - c.timestamp;
                c.signal_type == signal.signal_type
                    && c.indicator != signal.indicator
                    && age <= window
                    && age >= -window
            })
            .count();
        confirmations >= (self.config.required_confirmations - 1) as usize
    }
}
