//! Rule-based signal generation from an indicator snapshot.

use tracing::debug;

use crate::models::{IndicatorField, IndicatorSnapshot, Signal, SignalType};
use crate::signals::scoring::{self, StrengthScaling};

/// The built-in strategies. Each one reads a fixed set of snapshot fields and
/// only runs once all of them are available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    Rsi,
    Macd,
    Bollinger,
    Stochastic,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [Strategy::Rsi, Strategy::Macd, Strategy::Bollinger, Strategy::Stochastic];

    /// Indicator name carried by the signals this strategy emits.
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Rsi => "RSI",
            Strategy::Macd => "MACD",
            Strategy::Bollinger => "BB",
            Strategy::Stochastic => "STOCH",
        }
    }

    pub fn required_fields(&self) -> &'static [IndicatorField] {
        match self {
            Strategy::Rsi => &[IndicatorField::Rsi],
            Strategy::Macd => &[IndicatorField::Macd, IndicatorField::MacdSignal, IndicatorField::Close],
            Strategy::Bollinger => &[IndicatorField::BbUpper, IndicatorField::BbLower, IndicatorField::Close],
            Strategy::Stochastic => &[IndicatorField::StochK, IndicatorField::StochD],
        }
    }

    pub fn from_name(name: &str) -> Option<Strategy> {
        Strategy::ALL
            .iter()
            .copied()
            .find(|s| s.name().eq_ignore_ascii_case(name.trim()))
    }

    fn evaluate(&self, snapshot: &IndicatorSnapshot, scaling: &StrengthScaling) -> Option<Signal> {
        match self {
            Strategy::Rsi => check_rsi(snapshot, scaling),
            Strategy::Macd => check_macd(snapshot, scaling),
            Strategy::Bollinger => check_bollinger(snapshot, scaling),
            Strategy::Stochastic => check_stochastic(snapshot, scaling),
        }
    }
}

pub struct SignalGenerator {
    strategies: Vec<Strategy>,
    scaling: StrengthScaling,
}

impl SignalGenerator {
    /// Generator with every built-in strategy and default scaling.
    pub fn new() -> Self {
        Self::with_scaling(StrengthScaling::default())
    }

    pub fn with_scaling(scaling: StrengthScaling) -> Self {
        Self {
            strategies: Strategy::ALL.to_vec(),
            scaling,
        }
    }

    pub fn with_strategies(strategies: Vec<Strategy>, scaling: StrengthScaling) -> Self {
        Self { strategies, scaling }
    }

    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    pub fn scaling(&self) -> &StrengthScaling {
        &self.scaling
    }

    /// Run every registered strategy whose inputs are present.
    pub fn generate(&self, snapshot: &IndicatorSnapshot) -> Vec<Signal> {
        self.strategies
            .iter()
            .filter(|strategy| {
                let ready = snapshot.contains_all(strategy.required_fields());
                if !ready {
                    debug!(strategy = strategy.name(), "SignalGenerator: inputs not ready, skipping");
                }
                ready
            })
            .filter_map(|strategy| strategy.evaluate(snapshot, &self.scaling))
            .collect()
    }
}

impl Default for SignalGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn check_rsi(snapshot: &IndicatorSnapshot, scaling: &StrengthScaling) -> Option<Signal> {
    let rsi = snapshot.get(IndicatorField::Rsi)?;

    if rsi >= scaling.rsi_overbought {
        let strength = scoring::threshold_strength(rsi - scaling.rsi_overbought, scaling.rsi_span);
        Some(Signal::new(
            SignalType::Sell,
            Strategy::Rsi.name(),
            strength,
            format!("RSI Overbought: {:.2}", rsi),
            snapshot.timestamp,
        ))
    } else if rsi <= scaling.rsi_oversold {
        let strength = scoring::threshold_strength(scaling.rsi_oversold - rsi, scaling.rsi_span);
        Some(Signal::new(
            SignalType::Buy,
            Strategy::Rsi.name(),
            strength,
            format!("RSI Oversold: {:.2}", rsi),
            snapshot.timestamp,
        ))
    } else {
        None
    }
}

fn check_macd(snapshot: &IndicatorSnapshot, scaling: &StrengthScaling) -> Option<Signal> {
    let macd = snapshot.get(IndicatorField::Macd)?;
    let signal = snapshot.get(IndicatorField::MacdSignal)?;
    let price = snapshot.get(IndicatorField::Close)?;

    let signal_type = if macd > signal {
        SignalType::Buy
    } else if macd < signal {
        SignalType::Sell
    } else {
        return None;
    };

    let strength = scoring::macd_strength(macd, signal, price, scaling.macd_price_fraction);
    let label = match signal_type {
        SignalType::Buy => "Bullish",
        SignalType::Sell => "Bearish",
    };
    Some(Signal::new(
        signal_type,
        Strategy::Macd.name(),
        strength,
        format!("MACD {} Crossover ({:.2}% strength)", label, strength * 100.0),
        snapshot.timestamp,
    ))
}

fn check_bollinger(snapshot: &IndicatorSnapshot, scaling: &StrengthScaling) -> Option<Signal> {
    let close = snapshot.get(IndicatorField::Close)?;
    let upper = snapshot.get(IndicatorField::BbUpper)?;
    let lower = snapshot.get(IndicatorField::BbLower)?;

    if close < lower {
        Some(Signal::new(
            SignalType::Buy,
            Strategy::Bollinger.name(),
            scoring::band_strength(close, lower, scaling.bollinger_band_fraction),
            format!("Price {:.2} below lower Bollinger Band {:.2}", close, lower),
            snapshot.timestamp,
        ))
    } else if close > upper {
        Some(Signal::new(
            SignalType::Sell,
            Strategy::Bollinger.name(),
            scoring::band_strength(close, upper, scaling.bollinger_band_fraction),
            format!("Price {:.2} above upper Bollinger Band {:.2}", close, upper),
            snapshot.timestamp,
        ))
    } else {
        None
    }
}

fn check_stochastic(snapshot: &IndicatorSnapshot, scaling: &StrengthScaling) -> Option<Signal> {
    let k = snapshot.get(IndicatorField::StochK)?;
    let d = snapshot.get(IndicatorField::StochD)?;

    if k < scaling.stoch_oversold && d < scaling.stoch_oversold {
        let strength = scoring::threshold_strength(scaling.stoch_oversold - k.max(d), scaling.stoch_span);
        Some(Signal::new(
            SignalType::Buy,
            Strategy::Stochastic.name(),
            strength,
            format!("Stochastic Oversold: %K={:.1}, %D={:.1}", k, d),
            snapshot.timestamp,
        ))
    } else if k > scaling.stoch_overbought && d > scaling.stoch_overbought {
        let strength = scoring::threshold_strength(k.min(d) - scaling.stoch_overbought, scaling.stoch_span);
        Some(Signal::new(
            SignalType::Sell,
            Strategy::Stochastic.name(),
            strength,
            format!("Stochastic Overbought: %K={:.1}, %D={:.1}", k, d),
            snapshot.timestamp,
        ))
    } else {
        None
    }
}
