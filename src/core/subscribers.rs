//! Subscriber callbacks for accepted signals, indicator values and full
//! per-tick analysis results.
//!
//! Every callback runs under a timeout and panic guard, concurrently with the
//! other callbacks for the same tick. A failing subscriber is logged and
//! counted; it never affects other subscribers or the tick loop.

use async_trait::async_trait;
use futures_util::future::{join3, join_all};
use futures_util::FutureExt;
use serde::Serialize;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::error::SubscriberError;
use crate::models::{IndicatorSnapshot, IndicatorUpdate, Signal, Tick};

#[async_trait]
pub trait SignalSubscriber: Send + Sync {
    async fn on_signal(&self, symbol: &str, signal: &Signal) -> Result<(), SubscriberError>;
}

#[async_trait]
pub trait IndicatorSubscriber: Send + Sync {
    async fn on_indicator(&self, symbol: &str, update: &IndicatorUpdate) -> Result<(), SubscriberError>;
}

/// Receives the complete result of every analysed tick.
#[async_trait]
pub trait UpdateSubscriber: Send + Sync {
    async fn on_update(&self, update: &AnalysisUpdate) -> Result<(), SubscriberError>;
}

/// Payload for [`UpdateSubscriber`]s.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisUpdate {
    pub symbol: String,
    pub tick: Tick,
    pub indicators: IndicatorSnapshot,
    /// Signals accepted by the filter on this tick.
    pub signals: Vec<Signal>,
}

/// Which indicator a subscription listens to. Names compare case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionScope {
    All,
    Indicator(String),
}

impl SubscriptionScope {
    pub fn indicator(name: impl Into<String>) -> Self {
        SubscriptionScope::Indicator(name.into())
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            SubscriptionScope::All => true,
            SubscriptionScope::Indicator(scope) => scope.eq_ignore_ascii_case(name),
        }
    }
}

/// Adapter turning a closure into a [`SignalSubscriber`].
pub struct FnSignalSubscriber<F>(pub F);

#[async_trait]
impl<F> SignalSubscriber for FnSignalSubscriber<F>
where
    F: Fn(&str, &Signal) -> Result<(), SubscriberError> + Send + Sync,
{
    async fn on_signal(&self, symbol: &str, signal: &Signal) -> Result<(), SubscriberError> {
        (self.0)(symbol, signal)
    }
}

/// Adapter turning a closure into an [`IndicatorSubscriber`].
pub struct FnIndicatorSubscriber<F>(pub F);

#[async_trait]
impl<F> IndicatorSubscriber for FnIndicatorSubscriber<F>
where
    F: Fn(&str, &IndicatorUpdate) -> Result<(), SubscriberError> + Send + Sync,
{
    async fn on_indicator(&self, symbol: &str, update: &IndicatorUpdate) -> Result<(), SubscriberError> {
        (self.0)(symbol, update)
    }
}

/// Adapter turning a closure into an [`UpdateSubscriber`].
pub struct FnUpdateSubscriber<F>(pub F);

#[async_trait]
impl<F> UpdateSubscriber for FnUpdateSubscriber<F>
where
    F: Fn(&AnalysisUpdate) -> Result<(), SubscriberError> + Send + Sync,
{
    async fn on_update(&self, update: &AnalysisUpdate) -> Result<(), SubscriberError> {
        (self.0)(update)
    }
}

#[derive(Clone, Default)]
pub struct SubscriberRegistry {
    signals: Vec<(SubscriptionScope, Arc<dyn SignalSubscriber>)>,
    indicators: Vec<(SubscriptionScope, Arc<dyn IndicatorSubscriber>)>,
    updates: Vec<Arc<dyn UpdateSubscriber>>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_signal(&mut self, scope: SubscriptionScope, subscriber: Arc<dyn SignalSubscriber>) {
        self.signals.push((scope, subscriber));
    }

    pub fn add_indicator(&mut self, scope: SubscriptionScope, subscriber: Arc<dyn IndicatorSubscriber>) {
        self.indicators.push((scope, subscriber));
    }

    pub fn add_update(&mut self, subscriber: Arc<dyn UpdateSubscriber>) {
        self.updates.push(subscriber);
    }

    pub fn len(&self) -> usize {
        self.signals.len() + self.indicators.len() + self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver `signal` to every matching subscriber concurrently. Returns the
    /// number of subscribers that failed.
    pub async fn notify_signal(&self, symbol: &str, signal: &Signal, timeout: Duration) -> usize {
        let deliveries = self
            .signals
            .iter()
            .filter(|(scope, _)| scope.matches(&signal.indicator))
            .map(|(_, subscriber)| async move {
                match guarded(timeout, subscriber.on_signal(symbol, signal)).await {
                    Ok(()) => 0,
                    Err(e) => {
                        warn!(symbol, indicator = %signal.indicator, error = %e, "Signal subscriber failed");
                        1
                    }
                }
            });
        join_all(deliveries).await.into_iter().sum()
    }

    pub async fn notify_indicator(&self, symbol: &str, update: &IndicatorUpdate, timeout: Duration) -> usize {
        let deliveries = self
            .indicators
            .iter()
            .filter(|(scope, _)| scope.matches(&update.indicator))
            .map(|(_, subscriber)| async move {
                match guarded(timeout, subscriber.on_indicator(symbol, update)).await {
                    Ok(()) => 0,
                    Err(e) => {
                        warn!(symbol, indicator = %update.indicator, error = %e, "Indicator subscriber failed");
                        1
                    }
                }
            });
        join_all(deliveries).await.into_iter().sum()
    }

    pub async fn notify_update(&self, update: &AnalysisUpdate, timeout: Duration) -> usize {
        let deliveries = self.updates.iter().map(|subscriber| async move {
            match guarded(timeout, subscriber.on_update(update)).await {
                Ok(()) => 0,
                Err(e) => {
                    warn!(symbol = %update.symbol, error = %e, "Update subscriber failed");
                    1
                }
            }
        });
        join_all(deliveries).await.into_iter().sum()
    }

    /// Fan out everything produced by one analysed tick: each indicator value,
    /// each accepted signal in `update.signals` and the full update. All
    /// callbacks run concurrently, so the whole fan-out finishes within
    /// `timeout` however many subscribers or values there are.
    pub async fn notify_tick(
        &self,
        symbol: &str,
        indicators: &[IndicatorUpdate],
        update: &AnalysisUpdate,
        timeout: Duration,
    ) -> usize {
        let indicator_failures = join_all(
            indicators
                .iter()
                .map(|value| self.notify_indicator(symbol, value, timeout)),
        );
        let signal_failures = join_all(
            update
                .signals
                .iter()
                .map(|signal| self.notify_signal(symbol, signal, timeout)),
        );
        let (indicator_failures, signal_failures, update_failures) =
            join3(indicator_failures, signal_failures, self.notify_update(update, timeout)).await;

        indicator_failures.into_iter().sum::<usize>() + signal_failures.into_iter().sum::<usize>() + update_failures
    }
}

/// Run one callback with a deadline, converting panics into errors.
async fn guarded<F>(timeout: Duration, fut: F) -> Result<(), SubscriberError>
where
    F: Future<Output = Result<(), SubscriberError>>,
{
    match tokio::time::timeout(timeout, AssertUnwindSafe(fut).catch_unwind()).await {
        Err(_) => Err(SubscriberError::Timeout(timeout)),
        Ok(Err(_)) => Err(SubscriberError::Panicked),
        Ok(Ok(result)) => result,
    }
}
