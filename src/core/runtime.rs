//! Multi-symbol runtime: one independent analyzer per symbol

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info};

use crate::config::AnalyzerConfig;
use crate::core::analyzer::RealtimeAnalyzer;
use crate::error::AnalyzerError;
use crate::metrics::Metrics;
use crate::services::market_data::TickSource;

/// Owns one [`RealtimeAnalyzer`] per symbol. Analyzers share only the metrics
/// registry.
pub struct AnalyzerRuntime {
    analyzers: HashMap<String, Arc<RealtimeAnalyzer>>,
    order: Vec<String>,
}

impl AnalyzerRuntime {
    pub fn new(configs: Vec<AnalyzerConfig>, metrics: Option<Arc<Metrics>>) -> Result<Self, AnalyzerError> {
        let mut analyzers = HashMap::with_capacity(configs.len());
        let mut order = Vec::with_capacity(configs.len());

        for config in configs {
            let symbol = config.symbol.clone();
            if analyzers.contains_key(&symbol) {
                continue;
            }
            let analyzer = match &metrics {
                Some(m) => RealtimeAnalyzer::with_metrics(config, m.clone())?,
                None => RealtimeAnalyzer::new(config)?,
            };
            analyzers.insert(symbol.clone(), Arc::new(analyzer));
            order.push(symbol);
        }

        info!(symbols = ?order, "AnalyzerRuntime: created {} analyzers", order.len());
        Ok(Self { analyzers, order })
    }

    pub fn symbols(&self) -> &[String] {
        &self.order
    }

    pub fn analyzer(&self, symbol: &str) -> Option<Arc<RealtimeAnalyzer>> {
        self.analyzers.get(symbol).cloned()
    }

    pub fn analyzers(&self) -> impl Iterator<Item = &Arc<RealtimeAnalyzer>> {
        self.order.iter().filter_map(|s| self.analyzers.get(s))
    }

    /// Start every analyzer with a source built by `make_source`.
    ///
    /// Analyzers already started are stopped again if a later one fails.
    pub async fn start_all<F>(&self, mut make_source: F) -> Result<(), AnalyzerError>
    where
        F: FnMut(&str) -> Box<dyn TickSource>,
    {
        for (i, symbol) in self.order.iter().enumerate() {
            let Some(analyzer) = self.analyzers.get(symbol) else {
                continue;
            };
            if let Err(e) = analyzer.start(make_source(symbol)).await {
                error!(symbol = %symbol, error = %e, "AnalyzerRuntime: failed to start analyzer");
                for started in &self.order[..i] {
                    if let Some(a) = self.analyzers.get(started) {
                        if let Err(stop_err) = a.stop().await {
                            error!(
                                symbol = %started,
                                error = %stop_err,
                                "AnalyzerRuntime: analyzer stopped with error during start rollback"
                            );
                        }
                    }
                }
                return Err(e);
            }
        }
        info!("AnalyzerRuntime: all analyzers started");
        Ok(())
    }

    /// Stop every analyzer. Errors from individual stream tasks are logged
    /// and returned per symbol.
    pub async fn stop_all(&self) -> Vec<(String, AnalyzerError)> {
        let mut errors = Vec::new();
        for symbol in &self.order {
            if let Some(analyzer) = self.analyzers.get(symbol) {
                if let Err(e) = analyzer.stop().await {
                    error!(symbol = %symbol, error = %e, "AnalyzerRuntime: analyzer stopped with error");
                    errors.push((symbol.clone(), e));
                }
            }
        }
        info!("AnalyzerRuntime: all analyzers stopped");
        errors
    }
}
