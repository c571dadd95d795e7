use super::{field_f64, send_json, RateLimiter};
use crate::error::{Error, Result};
use crate::models::{Candle, CandleWindow};
use chrono::DateTime;
use log::info;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

pub const API_BASE_URL: &str = "https://api.binance.com";
const RATE_LIMIT: Duration = Duration::from_millis(100);
const RATE_LIMIT_KEY: &str = "binance";

#[derive(Debug, Deserialize)]
struct ExchangeInfo {
    symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SymbolInfo {
    symbol: String,
    quote_asset: String,
    status: String,
}

#[derive(Debug)]
pub struct BinanceClient {
    client: Client,
    base_url: String,
    rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl BinanceClient {
    pub fn new(base_url: &str, timeout: Duration, rate_limiter: Arc<Mutex<RateLimiter>>) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            rate_limiter,
        })
    }

    pub async fn tradable_pairs(&self, quote_asset: &str) -> Result<HashSet<String>> {
        let request = self.client.get(format!("{}/api/v3/exchangeInfo", self.base_url));
        let info: ExchangeInfo = send_json(request, &self.rate_limiter, RATE_LIMIT_KEY, RATE_LIMIT).await?;
        let pairs = tradable_from_info(info, quote_asset);
        info!("Binance tradable pairs found: {}", pairs.len());
        Ok(pairs)
    }

    pub async fn candles(&self, pair: &str, interval: &str, limit: usize) -> Result<CandleWindow> {
        let request = self
            .client
            .get(format!("{}/api/v3/klines", self.base_url))
            .query(&[
                ("symbol", pair.to_uppercase()),
                ("interval", interval.to_string()),
                ("limit", limit.to_string()),
            ]);
        let rows: Vec<Vec<Value>> = send_json(request, &self.rate_limiter, RATE_LIMIT_KEY, RATE_LIMIT).await?;
        parse_klines(&rows)
    }
}

fn tradable_from_info(info: ExchangeInfo, quote_asset: &str) -> HashSet<String> {
    info.symbols
        .into_iter()
        .filter(|s| s.quote_asset.eq_ignore_ascii_case(quote_asset) && s.status == "TRADING")
        .map(|s| s.symbol.to_uppercase())
        .collect()
}

/// Kline rows: `[open_time_ms, open, high, low, close, volume, close_time, ...]`.
fn parse_klines(rows: &[Vec<Value>]) -> Result<CandleWindow> {
    let mut candles = Vec::with_capacity(rows.len());
    for row in rows {
        let open_time = row
            .first()
            .and_then(Value::as_i64)
            .ok_or_else(|| Error::ApiInvalidData("Missing kline open time".into()))?;
        let timestamp = DateTime::from_timestamp_millis(open_time)
            .ok_or_else(|| Error::ApiInvalidData(format!("Invalid kline open time: {}", open_time)))?;

        candles.push(Candle::new(
            timestamp,
            field_f64(row, 1, "open")?,
            field_f64(row, 2, "high")?,
            field_f64(row, 3, "low")?,
            field_f64(row, 4, "close")?,
            field_f64(row, 5, "volume")?,
        ));
    }
    Ok(CandleWindow::new(candles))
}
