//! Binance spot market data: 24h ticker websocket and klines REST endpoint.

pub mod messages;
pub mod rest;
pub mod stream;

pub use messages::{parse_kline, BinanceErrorBody, TickerEvent};
pub use rest::BinanceRestClient;
pub use stream::BinanceTickerStream;
