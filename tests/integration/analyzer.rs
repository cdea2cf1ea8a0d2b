//! Realtime analyzer driven end-to-end through an in-memory tick stream.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tickscope::core::{
    AnalysisUpdate, FnIndicatorSubscriber, FnSignalSubscriber, FnUpdateSubscriber, IndicatorSubscriber,
    RealtimeAnalyzer, SubscriptionScope,
};
use tickscope::metrics::Metrics;
use tickscope::models::{IndicatorUpdate, Signal, SignalType, Tick};
use tickscope::services::MemoryTickSource;
use tickscope::{AnalyzerError, SubscriberError};

use crate::test_utils::{falling_ticks, fast_config, recording_subscriber};

#[tokio::test]
async fn falling_stream_emits_oversold_buy() {
    let analyzer = RealtimeAnalyzer::new(fast_config("BTCUSDT")).expect("valid config");
    let (log, subscriber) = recording_subscriber();
    analyzer
        .subscribe_to_signals(SubscriptionScope::All, Arc::new(subscriber))
        .await;

    let (tx, source) = MemoryTickSource::channel();
    analyzer.start(Box::new(source)).await.expect("analyzer starts");
    for tick in falling_ticks("BTCUSDT", 50_000.0, 20) {
        assert!(tx.send(tick));
    }
    drop(tx);

    tokio::time::timeout(Duration::from_secs(10), analyzer.join())
        .await
        .expect("stream finishes")
        .expect("stream ends cleanly");

    assert_eq!(analyzer.buffer_len().await, 20);
    let signals = log.lock().unwrap().clone();
    assert!(
        signals
            .iter()
            .any(|(symbol, s)| symbol == "BTCUSDT"
                && s.indicator == "RSI"
                && s.signal_type == SignalType::Buy
                && s.strength >= 0.3),
        "expected an RSI BUY, got {:?}",
        signals
    );

    let tracked = analyzer.completed_signals().await.len() + analyzer.active_signals().await.len();
    assert_eq!(tracked, signals.len());
    assert!(analyzer.latest_indicators().await.is_some());
    assert!(!analyzer.is_running().await);
}

#[tokio::test]
async fn handle_tick_drives_the_pipeline_directly() {
    let analyzer = RealtimeAnalyzer::new(fast_config("BTCUSDT")).unwrap();
    let ticks = falling_ticks("BTCUSDT", 30_000.0, 15);

    for tick in &ticks[..13] {
        let outcome = analyzer.handle_tick(tick).await.unwrap().unwrap();
        assert!(outcome.snapshot.is_none());
    }
    let outcome = analyzer.handle_tick(&ticks[13]).await.unwrap().unwrap();
    assert!(outcome.snapshot.is_some());

    let outcome = analyzer.handle_tick(&ticks[14]).await.unwrap().unwrap();
    assert!(outcome.accepted.iter().any(|s| s.indicator == "RSI" && s.is_buy()));
}

#[tokio::test]
async fn invalid_ticks_are_skipped_and_counted() {
    let metrics = Arc::new(Metrics::new().unwrap());
    let analyzer = RealtimeAnalyzer::with_metrics(fast_config("BTCUSDT"), metrics.clone()).unwrap();

    let good = falling_ticks("BTCUSDT", 100.0, 1).remove(0);
    let mut bad = good.clone();
    bad.price = -5.0;
    let mut other = good.clone();
    other.symbol = "ETHUSDT".into();

    assert!(analyzer.handle_tick(&bad).await.unwrap().is_none());
    assert!(analyzer.handle_tick(&other).await.unwrap().is_none());
    assert!(analyzer.handle_tick(&good).await.unwrap().is_some());

    assert_eq!(analyzer.buffer_len().await, 1);
    assert_eq!(metrics.ticks_rejected_total.with_label_values(&["BTCUSDT"]).get(), 2);
    assert_eq!(metrics.ticks_processed_total.with_label_values(&["BTCUSDT"]).get(), 1);
}

#[tokio::test]
async fn failing_subscribers_do_not_block_others() {
    let metrics = Arc::new(Metrics::new().unwrap());
    let analyzer = RealtimeAnalyzer::with_metrics(fast_config("BTCUSDT"), metrics.clone()).unwrap();

    analyzer
        .subscribe_to_signals(
            SubscriptionScope::All,
            Arc::new(FnSignalSubscriber(|_: &str, _: &Signal| -> Result<(), SubscriberError> {
                Err(SubscriberError::failed("downstream unavailable"))
            })),
        )
        .await;
    analyzer
        .subscribe_to_signals(
            SubscriptionScope::All,
            Arc::new(FnSignalSubscriber(|_: &str, _: &Signal| -> Result<(), SubscriberError> {
                panic!("subscriber bug")
            })),
        )
        .await;
    let (log, subscriber) = recording_subscriber();
    analyzer
        .subscribe_to_signals(SubscriptionScope::indicator("rsi"), Arc::new(subscriber))
        .await;

    for tick in falling_ticks("BTCUSDT", 50_000.0, 16) {
        analyzer.handle_tick(&tick).await.expect("tick loop unaffected");
    }

    let received = log.lock().unwrap().clone();
    assert!(!received.is_empty());
    assert!(received.iter().all(|(_, s)| s.indicator == "RSI"));
    assert!(metrics.subscriber_errors_total.get() >= 2);
    assert_eq!(analyzer.buffer_len().await, 16);
}

#[tokio::test]
async fn indicator_and_update_subscribers_receive_every_analysed_tick() {
    let analyzer = RealtimeAnalyzer::new(fast_config("BTCUSDT")).unwrap();

    let rsi_updates = Arc::new(AtomicUsize::new(0));
    let counter = rsi_updates.clone();
    analyzer
        .subscribe_to_indicator(
            SubscriptionScope::indicator("RSI"),
            Arc::new(FnIndicatorSubscriber(move |_: &str, update: &IndicatorUpdate| -> Result<(), SubscriberError> {
                assert_eq!(update.indicator, "rsi");
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })),
        )
        .await;

    let updates = Arc::new(AtomicUsize::new(0));
    let counter = updates.clone();
    analyzer
        .subscribe_to_updates(Arc::new(FnUpdateSubscriber(move |update: &AnalysisUpdate| -> Result<(), SubscriberError> {
            assert_eq!(update.symbol, "BTCUSDT");
            assert!(!update.indicators.is_empty());
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })))
        .await;

    for tick in falling_ticks("BTCUSDT", 50_000.0, 16) {
        analyzer.handle_tick(&tick).await.unwrap();
    }

    // ticks 14..=16 are past warm-up
    assert_eq!(rsi_updates.load(Ordering::SeqCst), 3);
    assert_eq!(updates.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn stop_halts_processing() {
    let analyzer = RealtimeAnalyzer::new(fast_config("BTCUSDT")).unwrap();
    let (tx, source) = MemoryTickSource::channel();
    analyzer.start(Box::new(source)).await.unwrap();

    let ticks = falling_ticks("BTCUSDT", 100.0, 3);
    tx.send(ticks[0].clone());
    tokio::time::timeout(Duration::from_secs(5), async {
        while analyzer.buffer_len().await < 1 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("first tick processed");

    analyzer.stop().await.expect("clean stop");
    assert!(!analyzer.is_running().await);

    tx.send(ticks[1].clone());
    assert!(analyzer.handle_tick(&ticks[2]).await.unwrap().is_none());
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(analyzer.buffer_len().await, 1);
}

#[tokio::test]
async fn stop_without_start_is_a_no_op() {
    let analyzer = RealtimeAnalyzer::new(fast_config("BTCUSDT")).unwrap();
    assert!(analyzer.stop().await.is_ok());
}

#[tokio::test]
async fn second_start_is_rejected_while_running() {
    let analyzer = RealtimeAnalyzer::new(fast_config("BTCUSDT")).unwrap();
    let (_tx, source) = MemoryTickSource::channel();
    analyzer.start(Box::new(source)).await.unwrap();

    let (_tx2, second) = MemoryTickSource::channel();
    assert!(matches!(
        analyzer.start(Box::new(second)).await,
        Err(AnalyzerError::AlreadyRunning(symbol)) if symbol == "BTCUSDT"
    ));
    analyzer.stop().await.unwrap();
}

#[tokio::test]
async fn stream_errors_trigger_reconnect() {
    let metrics = Arc::new(Metrics::new().unwrap());
    let analyzer = RealtimeAnalyzer::with_metrics(fast_config("BTCUSDT"), metrics.clone()).unwrap();
    let (tx, source) = MemoryTickSource::channel();
    analyzer.start(Box::new(source)).await.unwrap();

    let ticks = falling_ticks("BTCUSDT", 100.0, 2);
    tx.send(ticks[0].clone());
    tx.fail(tickscope::StreamError::Connect("connection reset".into()));
    tx.send(ticks[1].clone());
    drop(tx);

    tokio::time::timeout(Duration::from_secs(5), analyzer.join())
        .await
        .expect("stream finishes")
        .unwrap();

    assert_eq!(analyzer.buffer_len().await, 2);
    assert!(metrics.stream_reconnects_total.with_label_values(&["BTCUSDT"]).get() >= 2);
}

#[tokio::test]
async fn invalid_config_is_rejected() {
    let mut config = fast_config("BTCUSDT");
    config.warmup_period = 0;
    assert!(matches!(RealtimeAnalyzer::new(config), Err(AnalyzerError::Config(_))));
}

#[tokio::test]
async fn expire_stale_sweeps_old_signals() {
    let analyzer = RealtimeAnalyzer::new(fast_config("BTCUSDT")).unwrap();
    let ticks: Vec<Tick> = falling_ticks("BTCUSDT", 50_000.0, 15);
    for tick in &ticks {
        analyzer.handle_tick(tick).await.unwrap();
    }
    let active = analyzer.active_signals().await.len();
    assert!(active > 0);

    let expired = analyzer
        .expire_stale(ticks[14].timestamp + chrono::Duration::hours(48))
        .await;
    assert_eq!(expired.len(), active);
    assert!(analyzer.active_signals().await.is_empty());

    let performance = analyzer.performance_metrics(None, chrono::Utc::now()).await;
    assert!(performance.expired_count >= expired.len());
}

struct SleepyIndicatorSubscriber {
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl IndicatorSubscriber for SleepyIndicatorSubscriber {
    async fn on_indicator(&self, _symbol: &str, _update: &IndicatorUpdate) -> Result<(), SubscriberError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(150)).await;
        Ok(())
    }
}

#[tokio::test]
async fn slow_subscriber_does_not_stall_the_tick_loop() {
    let analyzer = RealtimeAnalyzer::new(fast_config("BTCUSDT")).unwrap();
    let slow = Arc::new(SleepyIndicatorSubscriber {
        calls: AtomicUsize::new(0),
    });
    analyzer
        .subscribe_to_indicator(SubscriptionScope::All, slow.clone())
        .await;

    let ticks = falling_ticks("BTCUSDT", 50_000.0, 16);
    for tick in &ticks[..13] {
        analyzer.handle_tick(tick).await.unwrap();
    }

    for tick in &ticks[13..] {
        let started = Instant::now();
        let outcome = analyzer.handle_tick(tick).await.unwrap().unwrap();
        let elapsed = started.elapsed();
        assert!(outcome.indicator_updates().len() > 1);
        // one subscriber timeout (200ms) bounds the whole fan-out
        assert!(elapsed < Duration::from_millis(600), "tick took {:?}", elapsed);
    }
    assert!(slow.calls.load(Ordering::SeqCst) >= 3 * 2);
}

#[tokio::test]
async fn lenient_filter_end_to_end_yields_buy() {
    let mut config = fast_config("BTCUSDT");
    config.filter.min_strength = 0.3;
    config.filter.required_confirmations = 1;
    config.filter.cooldown_period = chrono::Duration::seconds(1);
    let analyzer = RealtimeAnalyzer::new(config).unwrap();
    let (log, subscriber) = recording_subscriber();
    analyzer
        .subscribe_to_signals(SubscriptionScope::All, Arc::new(subscriber))
        .await;

    let (tx, source) = MemoryTickSource::channel();
    analyzer.start(Box::new(source)).await.unwrap();
    for tick in falling_ticks("BTCUSDT", 50_000.0, 20) {
        tx.send(tick);
    }
    drop(tx);
    tokio::time::timeout(Duration::from_secs(10), analyzer.join())
        .await
        .expect("stream finishes")
        .unwrap();

    let buys: Vec<Signal> = log
        .lock()
        .unwrap()
        .iter()
        .filter(|(_, s)| s.signal_type == SignalType::Buy && s.strength >= 0.3)
        .map(|(_, s)| s.clone())
        .collect();
    assert!(!buys.is_empty());
    assert!(buys.iter().filter(|s| s.indicator == "RSI").count() > 1);
}
