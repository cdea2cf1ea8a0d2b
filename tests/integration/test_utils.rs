use chrono::{Duration, Utc};
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;
use tickscope::config::AnalyzerConfig;
use tickscope::core::FnSignalSubscriber;
use tickscope::models::{Signal, Tick};
use tickscope::SubscriberError;

/// Analyzer config with a short reconnect delay so exhausted sources end quickly.
pub fn fast_config(symbol: &str) -> AnalyzerConfig {
    AnalyzerConfig {
        reconnect_delay: StdDuration::from_millis(10),
        subscriber_timeout: StdDuration::from_millis(200),
        ..AnalyzerConfig::for_symbol(symbol)
    }
}

/// `count` ticks, each 2% below the previous, one minute apart and a day in
/// the past.
pub fn falling_ticks(symbol: &str, start_price: f64, count: usize) -> Vec<Tick> {
    let start = Utc::now() - Duration::days(1);
    (0..count)
        .map(|i| {
            Tick::new(
                symbol,
                start_price * 0.98f64.powi(i as i32),
                2.0,
                start + Duration::minutes(i as i64),
            )
        })
        .collect()
}

pub type SignalLog = Arc<Mutex<Vec<(String, Signal)>>>;

/// Subscriber that records every delivered signal.
#[allow(clippy::type_complexity)]
pub fn recording_subscriber() -> (
    SignalLog,
    FnSignalSubscriber<impl Fn(&str, &Signal) -> Result<(), SubscriberError> + Send + Sync>,
) {
    let log: SignalLog = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    let subscriber = FnSignalSubscriber(move |symbol: &str, signal: &Signal| -> Result<(), SubscriberError> {
        sink.lock().unwrap().push((symbol.to_string(), signal.clone()));
        Ok(())
    });
    (log, subscriber)
}
