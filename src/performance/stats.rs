//! Aggregate statistics over completed signals

use std::collections::HashMap;

use crate::models::{PerformanceMetrics, SignalOutcome, SignalResult, SignalType};

/// Percentage return of a position opened at `entry_price`.
///
/// A SELL profits on a price decline. Non-positive entry prices yield 0.
pub fn calculate_return(signal_type: SignalType, entry_price: f64, current_price: f64) -> f64 {
    if entry_price <= 0.0 || !entry_price.is_finite() {
        return 0.0;
    }
    match signal_type {
        SignalType::Buy => (current_price - entry_price) / entry_price * 100.0,
        SignalType::Sell => (entry_price - current_price) / entry_price * 100.0,
    }
}

/// Compute metrics over a set of completed signals.
pub fn compute_metrics<'a, I>(signals: I) -> PerformanceMetrics
where
    I: IntoIterator<Item = &'a SignalResult>,
{
    let signals: Vec<&SignalResult> = signals.into_iter().collect();
    if signals.is_empty() {
        return PerformanceMetrics::empty();
    }

    let count = |outcome: SignalOutcome| signals.iter().filter(|s| s.outcome == outcome).count();
    let success_count = count(SignalOutcome::Success);
    let failure_count = count(SignalOutcome::Failure);
    let expired_count = count(SignalOutcome::Expired);

    let decided = success_count + failure_count;
    let win_rate = if decided > 0 {
        success_count as f64 / decided as f64
    } else {
        0.0
    };

    let returns: Vec<f64> = signals.iter().filter_map(|s| s.return_pct).collect();
    let avg_return = if returns.is_empty() {
        0.0
    } else {
        returns.iter().sum::<f64>() / returns.len() as f64
    };

    let holding: Vec<f64> = signals
        .iter()
        .filter_map(|s| s.holding_time())
        .map(|d| d.num_milliseconds() as f64 / 1000.0)
        .collect();
    let avg_holding_time_secs = if holding.is_empty() {
        0.0
    } else {
        holding.iter().sum::<f64>() / holding.len() as f64
    };

    let gains: f64 = returns.iter().filter(|r| **r > 0.0).sum();
    let losses: f64 = returns.iter().filter(|r| **r < 0.0).sum::<f64>().abs();
    let profit_factor = if losses > 0.0 { gains / losses } else { f64::INFINITY };

    PerformanceMetrics {
        total_signals: signals.len(),
        success_count,
        failure_count,
        expired_count,
        win_rate,
        avg_return,
        avg_holding_time_secs,
        profit_factor,
        accuracy_by_indicator: accuracy_by(&signals, |s| s.indicator.clone()),
        accuracy_by_type: accuracy_by(&signals, |s| s.signal_type.as_str().to_string()),
    }
}

/// Success fraction grouped by `key`.
fn accuracy_by<F>(signals: &[&SignalResult], key: F) -> HashMap<String, f64>
where
    F: Fn(&SignalResult) -> String,
{
    let mut groups: HashMap<String, (usize, usize)> = HashMap::new();
    for signal in signals {
        let entry = groups.entry(key(signal)).or_insert((0, 0));
        if signal.outcome == SignalOutcome::Success {
            entry.0 += 1;
        }
        entry.1 += 1;
    }
    groups
        .into_iter()
        .map(|(k, (success, total))| (k, success as f64 / total as f64))
        .collect()
}
