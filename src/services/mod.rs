//! External market data collaborators

pub mod binance;
pub mod market_data;

pub use market_data::{HistoricalDataProvider, MemoryTickSender, MemoryTickSource, TickSource};
