//! Tickscope
//!
//! Streams Binance tickers for every configured symbol, logs accepted signals
//! and reports signal performance on shutdown.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tickscope::config::{get_environment, Config};
use tickscope::core::{AnalyzerRuntime, FnSignalSubscriber, SubscriptionScope};
use tickscope::logging;
use tickscope::metrics::Metrics;
use tickscope::models::{Observation, Signal};
use tickscope::services::binance::{BinanceRestClient, BinanceTickerStream};
use tickscope::services::{HistoricalDataProvider, TickSource};
use tickscope::signals::{SignalEngine, SignalGenerator};
use tickscope::validation::{default_max_gap, validate_bars};
use tickscope::SubscriberError;
use tokio::signal;
use tracing::{debug, error, info, warn};

/// Bars fetched per symbol for the startup analysis.
const HISTORY_BARS: usize = 200;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    logging::init_logging();

    info!("Starting Tickscope");
    info!(environment = %get_environment(), "Environment");
    info!(symbols = ?config.symbols, timeframe = %config.analyzer.timeframe, "Configured symbols");

    let metrics = Arc::new(Metrics::new()?);

    let rest = BinanceRestClient::new(&config.binance_rest_url)?;
    for analyzer_config in config.analyzer_configs() {
        report_history(&rest, &analyzer_config).await;
    }

    let runtime = AnalyzerRuntime::new(config.analyzer_configs(), Some(metrics.clone()))?;
    for analyzer in runtime.analyzers() {
        let subscriber = FnSignalSubscriber(|symbol: &str, signal: &Signal| -> Result<(), SubscriberError> {
            debug!(symbol, signal = ?signal, "Signal delivered");
            Ok(())
        });
        analyzer
            .subscribe_to_signals(SubscriptionScope::All, Arc::new(subscriber))
            .await;
    }

    let ws_url = config.binance_ws_url.clone();
    runtime
        .start_all(|_| Box::new(BinanceTickerStream::new(ws_url.clone())) as Box<dyn TickSource>)
        .await?;

    info!("Tickscope running. Waiting for shutdown signal...");
    let mut sweep = tokio::time::interval(Duration::from_secs(60));
    loop {
        tokio::select! {
            _ = signal::ctrl_c() => break,
            _ = sweep.tick() => {
                for analyzer in runtime.analyzers() {
                    let expired = analyzer.expire_stale(Utc::now()).await;
                    if !expired.is_empty() {
                        info!(symbol = %analyzer.symbol(), count = expired.len(), "Expired stale signals");
                    }
                }
            }
        }
    }

    info!("Shutting down...");
    for (symbol, e) in runtime.stop_all().await {
        warn!(symbol = %symbol, error = %e, "Analyzer stopped with error");
    }

    for analyzer in runtime.analyzers() {
        let performance = analyzer.performance_metrics(None, Utc::now()).await;
        info!(
            symbol = %analyzer.symbol(),
            total = performance.total_signals,
            win_rate = performance.win_rate,
            avg_return = performance.avg_return,
            profit_factor = performance.profit_factor,
            "Final performance"
        );
    }

    match metrics.export() {
        Ok(text) => debug!(metrics = %text, "Final metrics"),
        Err(e) => warn!(error = %e, "Failed to export metrics"),
    }

    info!("Tickscope stopped");
    Ok(())
}

/// Run the batch engine over recent history and log what it sees.
async fn report_history(rest: &BinanceRestClient, config: &tickscope::config::AnalyzerConfig) {
    let bars = match rest
        .fetch_bars(&config.symbol, config.timeframe, None, None, Some(HISTORY_BARS))
        .await
    {
        Ok(bars) => bars,
        Err(e) => {
            warn!(symbol = %config.symbol, error = %e, "Failed to fetch history");
            return;
        }
    };

    let validation = validate_bars(&bars, config.timeframe.duration().max(default_max_gap()));
    for warning in &validation.warnings {
        warn!(symbol = %config.symbol, warning = %warning, "History warning");
    }
    if !validation.is_valid() {
        for e in &validation.errors {
            warn!(symbol = %config.symbol, error = %e, "History rejected");
        }
        return;
    }

    let observations: Vec<Observation> = bars.iter().map(Observation::from).collect();
    let engine = SignalEngine::new(
        config.indicators.clone(),
        SignalGenerator::with_scaling(config.scaling.clone()),
    );
    match engine.evaluate(&observations) {
        Ok(Some(evaluation)) => {
            info!(
                symbol = %config.symbol,
                bars = observations.len(),
                indicators = evaluation.snapshot.len(),
                signals = evaluation.signals.len(),
                "Historical analysis"
            );
            for signal in &evaluation.signals {
                info!(symbol = %config.symbol, indicator = %signal.indicator, "{}", signal.message);
            }
        }
        Ok(None) => info!(symbol = %config.symbol, bars = observations.len(), "Not enough history to analyse"),
        Err(e) => error!(symbol = %config.symbol, error = %e, "Historical analysis failed"),
    }
}
