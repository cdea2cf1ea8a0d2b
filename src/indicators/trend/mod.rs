//! Trend indicators: SMA, EMA, Ichimoku

pub mod ema;
pub mod ichimoku;
pub mod sma;

pub use ema::*;
pub use ichimoku::*;
pub use sma::*;
