//! Ticker websocket client

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, trace, warn};

use crate::error::StreamError;
use crate::models::Tick;
use crate::services::binance::messages::TickerEvent;
use crate::services::market_data::TickSource;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Live ticks from the `<symbol>@ticker` raw stream.
pub struct BinanceTickerStream {
    base_url: String,
    stream: Option<WsStream>,
}

impl BinanceTickerStream {
    /// `base_url` is the raw-stream endpoint, e.g. `wss://stream.binance.com:9443/ws`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            stream: None,
        }
    }

    pub fn stream_url(&self, symbol: &str) -> Result<url::Url, StreamError> {
        let raw = format!(
            "{}/{}@ticker",
            self.base_url.trim_end_matches('/'),
            symbol.replace('/', "").to_lowercase()
        );
        Ok(url::Url::parse(&raw)?)
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }
}

#[async_trait]
impl TickSource for BinanceTickerStream {
    async fn connect(&mut self, symbol: &str) -> Result<(), StreamError> {
        let url = self.stream_url(symbol)?;
        debug!(url = %url, "BinanceTickerStream: connecting");

        let (ws, response) = connect_async(url.as_str())
            .await
            .map_err(|e| StreamError::Connect(format!("{}: {}", url, e)))?;

        info!(url = %url, status = %response.status(), "BinanceTickerStream: connected");
        self.stream = Some(ws);
        Ok(())
    }

    async fn next_tick(&mut self) -> Result<Option<Tick>, StreamError> {
        loop {
            let stream = self.stream.as_mut().ok_or(StreamError::NotConnected)?;

            let msg = match stream.next().await {
                Some(Ok(msg)) => msg,
                Some(Err(e)) => {
                    self.stream = None;
                    return Err(StreamError::WebSocket(e));
                }
                None => {
                    self.stream = None;
                    return Ok(None);
                }
            };

            match msg {
                Message::Text(text) => {
                    let event: TickerEvent = serde_json::from_str(&text)?;
                    return event.to_tick().map(Some);
                }
                Message::Ping(payload) => {
                    trace!("BinanceTickerStream: ping");
                    stream.send(Message::Pong(payload)).await?;
                }
                Message::Close(frame) => {
                    warn!(frame = ?frame, "BinanceTickerStream: server closed the connection");
                    self.stream = None;
                    return Ok(None);
                }
                _ => {}
            }
        }
    }

    async fn disconnect(&mut self) -> Result<(), StreamError> {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.close(None).await {
                debug!(error = %e, "BinanceTickerStream: close failed");
            }
            info!("BinanceTickerStream: disconnected");
        }
        Ok(())
    }
}
