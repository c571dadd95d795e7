use crate::error::{Error, Result};
use crate::models::{CandleWindow, Exchange, PriceSupply, TransferEvent};
use async_trait::async_trait;
use log::{error, warn};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::Mutex;

#[cfg(test)]
use mockall::automock;

pub mod binance;
pub mod coingecko;
pub mod etherscan;
pub mod gateio;
pub mod rate_limit;

pub use rate_limit::RateLimiter;

const MAX_RETRIES: u32 = 3;

/// Exchange-side data: listed pairs and candles.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Pairs currently tradable against `quote_asset`, upper-cased with `_` removed.
    async fn fetch_tradable_pairs(&self, exchange: Exchange, quote_asset: &str) -> Result<HashSet<String>>;

    async fn fetch_candles(&self, exchange: Exchange, pair: &str, interval: &str, limit: usize) -> Result<CandleWindow>;
}

/// Token transfer events between two unix timestamps.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ChainDataProvider: Send + Sync {
    async fn fetch_transfer_events(&self, token_address: &str, start_time: i64, end_time: i64) -> Result<Vec<TransferEvent>>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait PriceProvider: Send + Sync {
    async fn fetch_price_and_supply(&self, asset_id: &str) -> Result<PriceSupply>;
}

/// Routes market-data calls to the client of the requested exchange.
#[derive(Debug)]
pub struct MarketDataCollector {
    binance: binance::BinanceClient,
    gateio: gateio::GateioClient,
}

impl MarketDataCollector {
    pub fn new(binance: binance::BinanceClient, gateio: gateio::GateioClient) -> Self {
        Self { binance, gateio }
    }
}

#[async_trait]
impl MarketDataProvider for MarketDataCollector {
    async fn fetch_tradable_pairs(&self, exchange: Exchange, quote_asset: &str) -> Result<HashSet<String>> {
        match exchange {
            Exchange::Binance => self.binance.tradable_pairs(quote_asset).await,
            Exchange::Gateio => self.gateio.tradable_pairs(quote_asset).await,
        }
    }

    async fn fetch_candles(&self, exchange: Exchange, pair: &str, interval: &str, limit: usize) -> Result<CandleWindow> {
        match exchange {
            Exchange::Binance => self.binance.candles(pair, interval, limit).await,
            Exchange::Gateio => self.gateio.candles(pair, interval, limit).await,
        }
    }
}

/// Sends a GET request after waiting on the shared limiter and decodes the JSON body.
/// Rate-limit answers are retried with exponential back-off.
pub(crate) async fn send_json<T: DeserializeOwned>(
    request: RequestBuilder,
    rate_limiter: &Mutex<RateLimiter>,
    key: &str,
    min_interval: Duration,
) -> Result<T> {
    let mut retry_count = 0;
    loop {
        let attempt = request
            .try_clone()
            .ok_or_else(|| Error::ApiError(format!("{} request cannot be retried", key)))?;

        rate_limit::wait_until_ready(rate_limiter, key, min_interval).await;
        let response = attempt.send().await?;

        let status = response.status();
        if status.is_success() {
            return response.json::<T>().await.map_err(|e| {
                error!("Failed to parse {} response: {}", key, e);
                Error::ApiInvalidFormat(format!("Failed to parse {} response: {}", key, e))
            });
        }

        let error = match status {
            StatusCode::TOO_MANY_REQUESTS | StatusCode::IM_A_TEAPOT => {
                if retry_count < MAX_RETRIES {
                    retry_count += 1;
                    let backoff = Duration::from_secs(2u64.pow(retry_count));
                    warn!("{} rate limit exceeded, backing off for {} seconds...", key, backoff.as_secs());
                    tokio::time::sleep(backoff).await;
                    continue;
                }
                Error::RateLimitExceeded(format!("{} API rate limit exceeded", key))
            }
            StatusCode::UNAUTHORIZED => Error::ApiAuthFailed(format!("{} authentication failed", key)),
            StatusCode::FORBIDDEN => Error::ApiQuotaExceeded(format!("{} API quota exceeded", key)),
            StatusCode::SERVICE_UNAVAILABLE => Error::ApiMaintenance(format!("{} API is under maintenance", key)),
            status => Error::ApiError(format!("{} request failed with status: {}", key, status)),
        };
        return Err(error);
    }
}

/// Exchanges send numbers both as JSON numbers and as strings.
pub(crate) fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

pub(crate) fn field_f64(row: &[Value], index: usize, name: &str) -> Result<f64> {
    let value = row
        .get(index)
        .and_then(value_to_f64)
        .ok_or_else(|| Error::ApiInvalidData(format!("Missing or invalid {} at column {}", name, index)))?;
    if !value.is_finite() || value < 0.0 {
        return Err(Error::ApiInvalidData(format!("Invalid {} value: {}", name, value)));
    }
    Ok(value)
}
