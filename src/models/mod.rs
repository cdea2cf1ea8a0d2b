//! Shared data models spanning the engine layers.

pub mod indicators;
pub mod market;
pub mod performance;
pub mod signal;
pub mod timeframe;

pub use indicators::{
    BollingerBands, FibonacciLevel, FibonacciLevels, IchimokuSeries, IndicatorField,
    IndicatorSnapshot, MacdSeries, StochasticSeries,
};
pub use market::{Bar, Observation, Tick};
pub use performance::{CompletionReason, PerformanceMetrics, SignalOutcome, SignalResult};
pub use signal::{IndicatorUpdate, Signal, SignalType};
pub use timeframe::{Timeframe, UnsupportedTimeframe};
