//! Sanity checks applied to market data before it reaches the buffer.

pub mod price;

pub use price::*;
