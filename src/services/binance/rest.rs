//! Klines REST client

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use crate::error::StreamError;
use crate::models::{Bar, Timeframe};
use crate::services::binance::messages::{parse_kline, BinanceErrorBody, INVALID_SYMBOL_CODE};
use crate::services::market_data::HistoricalDataProvider;

/// Binance caps a single klines request at 1000 rows.
pub const MAX_KLINES_PER_REQUEST: usize = 1000;

#[derive(Clone)]
pub struct BinanceRestClient {
    client: Client,
    base_url: url::Url,
}

impl BinanceRestClient {
    pub fn new(base_url: &str) -> Result<Self, StreamError> {
        Ok(Self {
            client: Client::new(),
            base_url: url::Url::parse(base_url)?,
        })
    }

    pub fn with_client(client: Client, base_url: &str) -> Result<Self, StreamError> {
        Ok(Self {
            client,
            base_url: url::Url::parse(base_url)?,
        })
    }

    fn klines_url(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        limit: Option<usize>,
    ) -> Result<url::Url, StreamError> {
        let mut url = self.base_url.join("/api/v3/klines")?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("symbol", &symbol.replace('/', "").to_uppercase())
                .append_pair("interval", timeframe.as_str());
            if let Some(start) = start {
                query.append_pair("startTime", &start.timestamp_millis().to_string());
            }
            if let Some(end) = end {
                query.append_pair("endTime", &end.timestamp_millis().to_string());
            }
            if let Some(limit) = limit {
                query.append_pair("limit", &limit.clamp(1, MAX_KLINES_PER_REQUEST).to_string());
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl HistoricalDataProvider for BinanceRestClient {
    async fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        limit: Option<usize>,
    ) -> Result<Vec<Bar>, StreamError> {
        let url = self.klines_url(symbol, timeframe, start, end, limit)?;
        debug!(url = %url, "BinanceRestClient: fetching klines");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, symbol, "BinanceRestClient: klines request failed");
            if status == StatusCode::BAD_REQUEST {
                if let Ok(err) = serde_json::from_str::<BinanceErrorBody>(&body) {
                    if err.code == INVALID_SYMBOL_CODE {
                        return Err(StreamError::InvalidSymbol(symbol.to_string()));
                    }
                    return Err(StreamError::Api {
                        status: status.as_u16(),
                        message: err.msg,
                    });
                }
            }
            return Err(StreamError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let rows: Vec<Vec<serde_json::Value>> = response.json().await?;
        let mut bars = rows
            .iter()
            .map(|row| parse_kline(row))
            .collect::<Result<Vec<Bar>, StreamError>>()?;
        bars.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

        debug!(symbol, count = bars.len(), "BinanceRestClient: fetched klines");
        Ok(bars)
    }
}
