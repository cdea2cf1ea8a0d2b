//! Market data interfaces consumed by the analyzer.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use crate::error::StreamError;
use crate::models::{Bar, Tick, Timeframe};

/// A live, reconnectable stream of ticks for one symbol.
///
/// `next_tick` returns `Ok(None)` when the current connection ends; the caller
/// may `connect` again. A `connect` that fails with [`StreamError::Closed`]
/// means the source is exhausted and will never produce more ticks.
#[async_trait]
pub trait TickSource: Send {
    async fn connect(&mut self, symbol: &str) -> Result<(), StreamError>;

    async fn next_tick(&mut self) -> Result<Option<Tick>, StreamError>;

    async fn disconnect(&mut self) -> Result<(), StreamError>;
}

/// Historical OHLCV bars for the batch analysis path.
#[async_trait]
pub trait HistoricalDataProvider: Send + Sync {
    /// Bars in ascending time order.
    async fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        limit: Option<usize>,
    ) -> Result<Vec<Bar>, StreamError>;
}

/// Sending half of a [`MemoryTickSource`].
#[derive(Clone)]
pub struct MemoryTickSender {
    tx: mpsc::UnboundedSender<Result<Tick, StreamError>>,
}

impl MemoryTickSender {
    /// Queue a tick. Returns `false` once the source has been dropped.
    pub fn send(&self, tick: Tick) -> bool {
        self.tx.send(Ok(tick)).is_ok()
    }

    /// Queue a stream failure; the reader sees it as a dropped connection.
    pub fn fail(&self, error: StreamError) -> bool {
        self.tx.send(Err(error)).is_ok()
    }
}

/// Channel-backed tick source. The stream ends for good once every
/// [`MemoryTickSender`] is dropped and the queue is drained.
pub struct MemoryTickSource {
    rx: mpsc::UnboundedReceiver<Result<Tick, StreamError>>,
    connected: bool,
    exhausted: bool,
    connects: usize,
}

impl MemoryTickSource {
    pub fn channel() -> (MemoryTickSender, MemoryTickSource) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            MemoryTickSender { tx },
            MemoryTickSource {
                rx,
                connected: false,
                exhausted: false,
                connects: 0,
            },
        )
    }

    /// Number of successful `connect` calls so far.
    pub fn connect_count(&self) -> usize {
        self.connects
    }
}

#[async_trait]
impl TickSource for MemoryTickSource {
    async fn connect(&mut self, _symbol: &str) -> Result<(), StreamError> {
        if self.exhausted {
            return Err(StreamError::Closed);
        }
        self.connected = true;
        self.connects += 1;
        Ok(())
    }

    async fn next_tick(&mut self) -> Result<Option<Tick>, StreamError> {
        if !self.connected {
            return Err(StreamError::NotConnected);
        }
        match self.rx.recv().await {
            Some(Ok(tick)) => Ok(Some(tick)),
            Some(Err(e)) => {
                self.connected = false;
                Err(e)
            }
            None => {
                self.connected = false;
                self.exhausted = true;
                Ok(None)
            }
        }
    }

    async fn disconnect(&mut self) -> Result<(), StreamError> {
        self.connected = false;
        Ok(())
    }
}
