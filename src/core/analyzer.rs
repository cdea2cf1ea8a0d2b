//! Realtime analysis: tick stream → buffer → indicators → signals → filter →
//! performance tracker → subscribers.
//!
//! [`AnalysisPipeline`] holds all per-symbol state and is driven synchronously,
//! one tick at a time. [`RealtimeAnalyzer`] wraps it with the stream loop,
//! reconnects and subscriber fan-out.

use backon::{ConstantBuilder, RetryableWithContext};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::AnalyzerConfig;
use crate::core::buffer::ObservationBuffer;
use crate::core::subscribers::{
    AnalysisUpdate, IndicatorSubscriber, SignalSubscriber, SubscriberRegistry, SubscriptionScope, UpdateSubscriber,
};
use crate::error::{AnalyzerError, StreamError};
use crate::indicators::IndicatorEngine;
use crate::metrics::Metrics;
use crate::models::{IndicatorSnapshot, IndicatorUpdate, Observation, PerformanceMetrics, Signal, SignalResult, Tick};
use crate::performance::PerformanceTracker;
use crate::services::market_data::TickSource;
use crate::signals::{SignalFilter, SignalGenerator};
use crate::validation::{normalize_symbol, validate_tick};

/// Everything that happened while processing one tick.
#[derive(Debug, Clone, Default)]
pub struct TickOutcome {
    /// `None` until the buffer holds the warm-up number of observations.
    pub snapshot: Option<IndicatorSnapshot>,
    pub generated: Vec<Signal>,
    pub accepted: Vec<Signal>,
    /// Tracker records opened for the accepted signals.
    pub registered: Vec<SignalResult>,
    /// Tracked signals that reached a terminal outcome on this tick.
    pub completed: Vec<SignalResult>,
}

impl TickOutcome {
    /// One update per indicator value in the snapshot.
    pub fn indicator_updates(&self) -> Vec<IndicatorUpdate> {
        self.snapshot
            .as_ref()
            .map(|snapshot| {
                snapshot
                    .iter()
                    .map(|(field, value)| IndicatorUpdate {
                        indicator: field.as_str().to_string(),
                        value,
                        timestamp: snapshot.timestamp,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Per-symbol analysis state. Not thread-safe; callers serialize access.
pub struct AnalysisPipeline {
    symbol: String,
    normalized_symbol: Option<String>,
    warmup_period: usize,
    buffer: ObservationBuffer,
    engine: IndicatorEngine,
    generator: SignalGenerator,
    filter: SignalFilter,
    tracker: PerformanceTracker,
    latest: Option<IndicatorSnapshot>,
}

impl AnalysisPipeline {
    pub fn new(config: &AnalyzerConfig) -> Self {
        Self {
            symbol: config.symbol.clone(),
            normalized_symbol: normalize_symbol(&config.symbol),
            warmup_period: config.warmup_period,
            buffer: ObservationBuffer::new(config.buffer_capacity),
            engine: IndicatorEngine::new(config.indicators.clone()),
            generator: SignalGenerator::with_scaling(config.scaling.clone()),
            filter: SignalFilter::new(config.filter.clone()),
            tracker: PerformanceTracker::new(config.tracker.clone()),
            latest: None,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Validate and process one tick.
    ///
    /// The buffer append and tracker update happen before indicator
    /// computation, so an indicator error leaves both in a consistent state.
    pub fn process_tick(&mut self, tick: &Tick, now: DateTime<Utc>) -> Result<TickOutcome, AnalyzerError> {
        let validated = validate_tick(tick, now).into_result()?;
        if Some(&validated.symbol) != self.normalized_symbol.as_ref() {
            return Err(AnalyzerError::SymbolMismatch {
                expected: self.symbol.clone(),
                got: tick.symbol.clone(),
            });
        }

        self.buffer.append(Observation::from(tick));

        let mut outcome = TickOutcome {
            completed: self.tracker.update_all(tick.price, tick.timestamp),
            ..TickOutcome::default()
        };

        if self.buffer.len() < self.warmup_period {
            debug!(
                symbol = %self.symbol,
                buffered = self.buffer.len(),
                warmup = self.warmup_period,
                "AnalysisPipeline: warming up"
            );
            return Ok(outcome);
        }

        let snapshot = self.engine.snapshot(self.buffer.as_slice())?;
        outcome.generated = self.generator.generate(&snapshot);

        for signal in &outcome.generated {
            if !self.filter.apply(signal).is_accepted() {
                continue;
            }
            if let Some(record) = self.tracker.register(signal, tick.price) {
                outcome.registered.push(record);
            }
            outcome.accepted.push(signal.clone());
        }

        self.latest = Some(snapshot.clone());
        outcome.snapshot = Some(snapshot);
        Ok(outcome)
    }

    pub fn latest_indicators(&self) -> Option<&IndicatorSnapshot> {
        self.latest.as_ref()
    }

    pub fn buffer(&self) -> &ObservationBuffer {
        &self.buffer
    }

    pub fn tracker(&self) -> &PerformanceTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut PerformanceTracker {
        &mut self.tracker
    }
}

struct Inner {
    config: AnalyzerConfig,
    pipeline: Mutex<AnalysisPipeline>,
    subscribers: RwLock<SubscriberRegistry>,
    metrics: Option<Arc<Metrics>>,
    accepting: AtomicBool,
}

impl Inner {
    async fn handle_tick(&self, tick: &Tick) -> Result<Option<TickOutcome>, AnalyzerError> {
        let symbol = self.config.symbol.as_str();
        let timer = self
            .metrics
            .as_ref()
            .map(|m| m.tick_processing_seconds.with_label_values(&[symbol]).start_timer());

        let (outcome, active) = {
            let mut pipeline = self.pipeline.lock().await;
            if !self.accepting.load(Ordering::SeqCst) {
                debug!(symbol, "RealtimeAnalyzer: stopped, tick ignored");
                return Ok(None);
            }
            match pipeline.process_tick(tick, Utc::now()) {
                Ok(outcome) => (outcome, pipeline.tracker().active_count()),
                Err(e @ (AnalyzerError::InvalidTick(_) | AnalyzerError::SymbolMismatch { .. })) => {
                    warn!(symbol, error = %e, "RealtimeAnalyzer: tick rejected");
                    if let Some(m) = &self.metrics {
                        m.ticks_rejected_total.with_label_values(&[symbol]).inc();
                    }
                    return Ok(None);
                }
                Err(e) => return Err(e),
            }
        };
        drop(timer);

        if let Some(m) = &self.metrics {
            m.ticks_processed_total.with_label_values(&[symbol]).inc();
            m.signals_generated_total
                .with_label_values(&[symbol])
                .inc_by(outcome.generated.len() as u64);
            m.signals_accepted_total
                .with_label_values(&[symbol])
                .inc_by(outcome.accepted.len() as u64);
            m.signals_completed_total
                .with_label_values(&[symbol])
                .inc_by(outcome.completed.len() as u64);
            m.active_signals.with_label_values(&[symbol]).set(active as i64);
        }

        for signal in &outcome.accepted {
            info!(
                symbol,
                indicator = %signal.indicator,
                signal_type = %signal.signal_type,
                strength = signal.strength,
                "{}",
                signal.message
            );
        }

        self.notify(tick, &outcome).await;
        Ok(Some(outcome))
    }

    async fn notify(&self, tick: &Tick, outcome: &TickOutcome) {
        let Some(snapshot) = &outcome.snapshot else {
            return;
        };
        let subscribers = self.subscribers.read().await.clone();
        if subscribers.is_empty() {
            return;
        }

        let symbol = self.config.symbol.as_str();
        let update = AnalysisUpdate {
            symbol: symbol.to_string(),
            tick: tick.clone(),
            indicators: snapshot.clone(),
            signals: outcome.accepted.clone(),
        };
        let failures = subscribers
            .notify_tick(symbol, &outcome.indicator_updates(), &update, self.config.subscriber_timeout)
            .await;

        if failures > 0 {
            if let Some(m) = &self.metrics {
                m.subscriber_errors_total.inc_by(failures as u64);
            }
        }
    }

    fn set_connected(&self, connected: bool) {
        if let Some(m) = &self.metrics {
            m.stream_connected
                .with_label_values(&[self.config.symbol.as_str()])
                .set(i64::from(connected));
        }
    }
}

/// Realtime analyzer for one symbol.
pub struct RealtimeAnalyzer {
    inner: Arc<Inner>,
    shutdown: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<Result<(), AnalyzerError>>>>,
}

impl RealtimeAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Result<Self, AnalyzerError> {
        Self::build(config, None)
    }

    pub fn with_metrics(config: AnalyzerConfig, metrics: Arc<Metrics>) -> Result<Self, AnalyzerError> {
        Self::build(config, Some(metrics))
    }

    fn build(config: AnalyzerConfig, metrics: Option<Arc<Metrics>>) -> Result<Self, AnalyzerError> {
        config.validate()?;
        let (shutdown, _) = watch::channel(false);
        Ok(Self {
            inner: Arc::new(Inner {
                pipeline: Mutex::new(AnalysisPipeline::new(&config)),
                config,
                subscribers: RwLock::new(SubscriberRegistry::new()),
                metrics,
                accepting: AtomicBool::new(true),
            }),
            shutdown,
            task: Mutex::new(None),
        })
    }

    pub fn symbol(&self) -> &str {
        &self.inner.config.symbol
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.inner.config
    }

    pub async fn subscribe_to_signals(&self, scope: SubscriptionScope, subscriber: Arc<dyn SignalSubscriber>) {
        self.inner.subscribers.write().await.add_signal(scope, subscriber);
    }

    pub async fn subscribe_to_indicator(&self, scope: SubscriptionScope, subscriber: Arc<dyn IndicatorSubscriber>) {
        self.inner.subscribers.write().await.add_indicator(scope, subscriber);
    }

    pub async fn subscribe_to_updates(&self, subscriber: Arc<dyn UpdateSubscriber>) {
        self.inner.subscribers.write().await.add_update(subscriber);
    }

    /// Process one tick directly, outside the stream loop.
    ///
    /// Invalid ticks are logged, counted and skipped (`Ok(None)`); ticks
    /// arriving after [`stop`](Self::stop) are ignored the same way.
    pub async fn handle_tick(&self, tick: &Tick) -> Result<Option<TickOutcome>, AnalyzerError> {
        self.inner.handle_tick(tick).await
    }

    /// Connect `source` and process its ticks on a background task until
    /// [`stop`](Self::stop) is called or the source is exhausted.
    pub async fn start(&self, source: Box<dyn TickSource>) -> Result<(), AnalyzerError> {
        let mut task = self.task.lock().await;
        if task.as_ref().is_some_and(|h| !h.is_finished()) {
            return Err(AnalyzerError::AlreadyRunning(self.symbol().to_string()));
        }

        self.shutdown.send_replace(false);
        self.inner.accepting.store(true, Ordering::SeqCst);

        let inner = self.inner.clone();
        let shutdown = self.shutdown.subscribe();
        info!(symbol = %self.symbol(), "RealtimeAnalyzer: starting");
        *task = Some(tokio::spawn(run_stream(inner, source, shutdown)));
        Ok(())
    }

    /// Stop processing. After this returns no tick mutates the buffer or
    /// tracker. Returns the stream task's result, if one was running.
    pub async fn stop(&self) -> Result<(), AnalyzerError> {
        self.inner.accepting.store(false, Ordering::SeqCst);
        self.shutdown.send_replace(true);

        // Wait out any tick that is mid-processing.
        drop(self.inner.pipeline.lock().await);

        let handle = self.task.lock().await.take();
        let result = match handle {
            Some(handle) => match handle.await {
                Ok(result) => result,
                Err(e) => {
                    error!(symbol = %self.symbol(), error = %e, "RealtimeAnalyzer: stream task failed");
                    Ok(())
                }
            },
            None => Ok(()),
        };
        self.inner.set_connected(false);
        info!(symbol = %self.symbol(), "RealtimeAnalyzer: stopped");
        result
    }

    pub async fn is_running(&self) -> bool {
        self.task
            .lock()
            .await
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Wait for the stream task to finish on its own (source exhausted or
    /// failed) without requesting shutdown.
    pub async fn join(&self) -> Result<(), AnalyzerError> {
        let handle = self.task.lock().await.take();
        match handle {
            Some(handle) => handle.await.unwrap_or_else(|e| {
                error!(symbol = %self.symbol(), error = %e, "RealtimeAnalyzer: stream task failed");
                Ok(())
            }),
            None => Ok(()),
        }
    }

    pub async fn latest_indicators(&self) -> Option<IndicatorSnapshot> {
        self.inner.pipeline.lock().await.latest_indicators().cloned()
    }

    pub async fn active_signals(&self) -> Vec<SignalResult> {
        self.inner
            .pipeline
            .lock()
            .await
            .tracker()
            .active_signals()
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn completed_signals(&self) -> Vec<SignalResult> {
        self.inner.pipeline.lock().await.tracker().completed_signals().to_vec()
    }

    pub async fn buffer_len(&self) -> usize {
        self.inner.pipeline.lock().await.buffer().len()
    }

    /// Metrics over completed signals; see
    /// [`PerformanceTracker::performance_metrics`].
    pub async fn performance_metrics(
        &self,
        window: Option<chrono::Duration>,
        as_of: DateTime<Utc>,
    ) -> PerformanceMetrics {
        self.inner
            .pipeline
            .lock()
            .await
            .tracker()
            .performance_metrics(window, as_of)
    }

    /// Sweep signals older than the tracker timeout into EXPIRED.
    pub async fn expire_stale(&self, now: DateTime<Utc>) -> Vec<SignalResult> {
        self.inner.pipeline.lock().await.tracker_mut().expire_stale(now)
    }
}

async fn shutdown_requested(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            return;
        }
    }
}

/// Connect, retrying with a fixed delay. `Closed` and `InvalidSymbol` are
/// permanent and end the retries immediately.
async fn connect_with_retry(
    inner: &Inner,
    source: Box<dyn TickSource>,
) -> (Box<dyn TickSource>, Result<(), StreamError>) {
    let config = &inner.config;
    let max_times = match config.max_reconnect_attempts {
        0 => usize::MAX,
        n => n,
    };
    let backoff = ConstantBuilder::default()
        .with_delay(config.reconnect_delay)
        .with_max_times(max_times);
    let symbol = config.symbol.clone();

    (|mut source: Box<dyn TickSource>| {
        let symbol = symbol.clone();
        async move {
            let result = source.connect(&symbol).await;
            (source, result)
        }
    })
    .retry(backoff)
    .context(source)
    .when(|e: &StreamError| !matches!(e, StreamError::Closed | StreamError::InvalidSymbol(_)))
    .notify(|e: &StreamError, delay| {
        warn!(symbol = %config.symbol, error = %e, delay = ?delay, "RealtimeAnalyzer: connect failed, retrying");
        if let Some(m) = &inner.metrics {
            m.stream_reconnects_total.with_label_values(&[config.symbol.as_str()]).inc();
        }
    })
    .await
}

async fn run_stream(
    inner: Arc<Inner>,
    mut source: Box<dyn TickSource>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), AnalyzerError> {
    let symbol = inner.config.symbol.clone();

    loop {
        let connected = tokio::select! {
            _ = shutdown_requested(&mut shutdown) => return Ok(()),
            (returned, result) = connect_with_retry(&inner, source) => {
                source = returned;
                result
            }
        };

        match connected {
            Ok(()) => {}
            Err(StreamError::Closed) => {
                info!(symbol = %symbol, "RealtimeAnalyzer: tick source exhausted");
                inner.set_connected(false);
                return Ok(());
            }
            Err(e) => {
                error!(symbol = %symbol, error = %e, "RealtimeAnalyzer: giving up on tick stream");
                inner.set_connected(false);
                return Err(e.into());
            }
        }
        inner.set_connected(true);

        loop {
            tokio::select! {
                biased;
                _ = shutdown_requested(&mut shutdown) => {
                    if let Err(e) = source.disconnect().await {
                        debug!(symbol = %symbol, error = %e, "RealtimeAnalyzer: disconnect failed");
                    }
                    return Ok(());
                }
                next = source.next_tick() => match next {
                    Ok(Some(tick)) => {
                        if let Err(e) = inner.handle_tick(&tick).await {
                            error!(symbol = %symbol, error = %e, "RealtimeAnalyzer: tick processing failed");
                            if let Err(e) = source.disconnect().await {
                                debug!(symbol = %symbol, error = %e, "RealtimeAnalyzer: disconnect failed");
                            }
                            inner.set_connected(false);
                            return Err(e);
                        }
                    }
                    Ok(None) => {
                        info!(symbol = %symbol, "RealtimeAnalyzer: stream ended, reconnecting");
                        break;
                    }
                    Err(e) => {
                        warn!(symbol = %symbol, error = %e, "RealtimeAnalyzer: stream error, reconnecting");
                        break;
                    }
                }
            }
        }

        inner.set_connected(false);
        if let Some(m) = &inner.metrics {
            m.stream_reconnects_total.with_label_values(&[symbol.as_str()]).inc();
        }
        tokio::select! {
            _ = shutdown_requested(&mut shutdown) => return Ok(()),
            _ = tokio::time::sleep(inner.config.reconnect_delay) => {}
        }
    }
}
