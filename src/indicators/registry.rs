//! Indicator registry: categories and lookback requirements

use crate::indicators::engine::IndicatorParams;
use crate::models::IndicatorField;

/// Indicator category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorCategory {
    Momentum,
    Trend,
    Volatility,
    Volume,
    Structure,
}

/// Every indicator the engine knows how to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorKind {
    Sma,
    Ema,
    Rsi,
    Macd,
    Bollinger,
    Atr,
    Volatility,
    Stochastic,
    Ichimoku,
    Fibonacci,
    Obv,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 11] = [
        IndicatorKind::Sma,
        IndicatorKind::Ema,
        IndicatorKind::Rsi,
        IndicatorKind::Macd,
        IndicatorKind::Bollinger,
        IndicatorKind::Atr,
        IndicatorKind::Volatility,
        IndicatorKind::Stochastic,
        IndicatorKind::Ichimoku,
        IndicatorKind::Fibonacci,
        IndicatorKind::Obv,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            IndicatorKind::Sma => "sma",
            IndicatorKind::Ema => "ema",
            IndicatorKind::Rsi => "rsi",
            IndicatorKind::Macd => "macd",
            IndicatorKind::Bollinger => "bollinger",
            IndicatorKind::Atr => "atr",
            IndicatorKind::Volatility => "volatility",
            IndicatorKind::Stochastic => "stochastic",
            IndicatorKind::Ichimoku => "ichimoku",
            IndicatorKind::Fibonacci => "fibonacci",
            IndicatorKind::Obv => "obv",
        }
    }

    pub fn category(&self) -> IndicatorCategory {
        match self {
            IndicatorKind::Rsi | IndicatorKind::Macd | IndicatorKind::Stochastic => IndicatorCategory::Momentum,
            IndicatorKind::Sma | IndicatorKind::Ema | IndicatorKind::Ichimoku => IndicatorCategory::Trend,
            IndicatorKind::Bollinger | IndicatorKind::Atr | IndicatorKind::Volatility => IndicatorCategory::Volatility,
            IndicatorKind::Obv => IndicatorCategory::Volume,
            IndicatorKind::Fibonacci => IndicatorCategory::Structure,
        }
    }

    /// Number of observations needed before the indicator leaves its
    /// undefined or fallback region.
    pub fn lookback(&self, params: &IndicatorParams) -> usize {
        match self {
            IndicatorKind::Sma => params.sma_period as usize,
            IndicatorKind::Ema => 1,
            IndicatorKind::Rsi => params.rsi_period as usize + 1,
            IndicatorKind::Macd => params.macd_slow as usize,
            IndicatorKind::Bollinger => params.bollinger_period as usize,
            IndicatorKind::Atr => params.atr_period as usize,
            IndicatorKind::Volatility => params.volatility_period as usize + 1,
            IndicatorKind::Stochastic => {
                ((params.stoch_period + params.stoch_smooth_k + params.stoch_smooth_d) as usize).saturating_sub(2)
            }
            IndicatorKind::Ichimoku => (params.ichimoku_kijun + params.ichimoku_senkou_b) as usize,
            IndicatorKind::Fibonacci => params.fibonacci_period as usize,
            IndicatorKind::Obv => 1,
        }
    }

    /// Snapshot fields this indicator contributes.
    pub fn fields(&self) -> &'static [IndicatorField] {
        match self {
            IndicatorKind::Sma => &[IndicatorField::Sma],
            IndicatorKind::Ema => &[IndicatorField::Ema],
            IndicatorKind::Rsi => &[IndicatorField::Rsi],
            IndicatorKind::Macd => &[
                IndicatorField::Macd,
                IndicatorField::MacdSignal,
                IndicatorField::MacdHistogram,
            ],
            IndicatorKind::Bollinger => &[
                IndicatorField::BbUpper,
                IndicatorField::BbMiddle,
                IndicatorField::BbLower,
            ],
            IndicatorKind::Atr => &[IndicatorField::Atr],
            IndicatorKind::Volatility => &[IndicatorField::Volatility],
            IndicatorKind::Stochastic => &[IndicatorField::StochK, IndicatorField::StochD],
            IndicatorKind::Ichimoku => &[
                IndicatorField::IchimokuTenkan,
                IndicatorField::IchimokuKijun,
                IndicatorField::IchimokuSenkouA,
                IndicatorField::IchimokuSenkouB,
                IndicatorField::IchimokuChikou,
            ],
            IndicatorKind::Fibonacci => &[],
            IndicatorKind::Obv => &[IndicatorField::Obv],
        }
    }
}

/// Indicator registry for organizing indicators by category
pub struct IndicatorRegistry;

impl IndicatorRegistry {
    pub fn by_category(category: IndicatorCategory) -> Vec<IndicatorKind> {
        IndicatorKind::ALL
            .iter()
            .copied()
            .filter(|kind| kind.category() == category)
            .collect()
    }

    /// Longest lookback across every registered indicator.
    pub fn max_lookback(params: &IndicatorParams) -> usize {
        IndicatorKind::ALL
            .iter()
            .map(|kind| kind.lookback(params))
            .max()
            .unwrap_or(0)
    }

    /// Get all categories
    pub fn all_categories() -> Vec<IndicatorCategory> {
        vec![
            IndicatorCategory::Momentum,
            IndicatorCategory::Trend,
            IndicatorCategory::Volatility,
            IndicatorCategory::Volume,
            IndicatorCategory::Structure,
        ]
    }
}
