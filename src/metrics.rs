//! Prometheus metrics for the analyzer pipeline

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry,
    TextEncoder,
};

/// Metrics shared by every analyzer in the process. Per-symbol series carry a
/// `symbol` label.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub ticks_processed_total: IntCounterVec,
    pub ticks_rejected_total: IntCounterVec,
    pub signals_generated_total: IntCounterVec,
    pub signals_accepted_total: IntCounterVec,
    pub signals_completed_total: IntCounterVec,
    pub subscriber_errors_total: IntCounter,
    pub stream_reconnects_total: IntCounterVec,
    pub active_signals: IntGaugeVec,
    pub stream_connected: IntGaugeVec,
    pub tick_processing_seconds: HistogramVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("tickscope".to_string()), None)?;

        let counter = |name: &str, help: &str| IntCounterVec::new(Opts::new(name, help), &["symbol"]);
        let gauge = |name: &str, help: &str| IntGaugeVec::new(Opts::new(name, help), &["symbol"]);

        let ticks_processed_total = counter("ticks_processed_total", "Ticks appended to the buffer")?;
        let ticks_rejected_total = counter("ticks_rejected_total", "Ticks dropped by validation")?;
        let signals_generated_total = counter("signals_generated_total", "Candidate signals produced by the generator")?;
        let signals_accepted_total = counter("signals_accepted_total", "Signals accepted by the filter")?;
        let signals_completed_total = counter("signals_completed_total", "Tracked signals that reached a terminal outcome")?;
        let subscriber_errors_total = IntCounter::new("subscriber_errors_total", "Subscriber callbacks that failed, timed out or panicked")?;
        let stream_reconnects_total = counter("stream_reconnects_total", "Tick stream reconnect attempts")?;
        let active_signals = gauge("active_signals", "Signals currently tracked as pending")?;
        let stream_connected = gauge("stream_connected", "1 while the tick stream is connected")?;
        let tick_processing_seconds = HistogramVec::new(
            HistogramOpts::new("tick_processing_seconds", "Time spent processing one tick")
                .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5]),
            &["symbol"],
        )?;

        registry.register(Box::new(ticks_processed_total.clone()))?;
        registry.register(Box::new(ticks_rejected_total.clone()))?;
        registry.register(Box::new(signals_generated_total.clone()))?;
        registry.register(Box::new(signals_accepted_total.clone()))?;
        registry.register(Box::new(signals_completed_total.clone()))?;
        registry.register(Box::new(subscriber_errors_total.clone()))?;
        registry.register(Box::new(stream_reconnects_total.clone()))?;
        registry.register(Box::new(active_signals.clone()))?;
        registry.register(Box::new(stream_connected.clone()))?;
        registry.register(Box::new(tick_processing_seconds.clone()))?;

        Ok(Self {
            registry,
            ticks_processed_total,
            ticks_rejected_total,
            signals_generated_total,
            signals_accepted_total,
            signals_completed_total,
            subscriber_errors_total,
            stream_reconnects_total,
            active_signals,
            stream_connected,
            tick_processing_seconds,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Render every metric in the Prometheus text exposition format.
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
