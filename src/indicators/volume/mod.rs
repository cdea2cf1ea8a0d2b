//! Volume indicators: On-Balance Volume

pub mod obv;

pub use obv::*;
