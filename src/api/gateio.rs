use super::{field_f64, send_json, value_to_f64, RateLimiter};
use crate::error::{Error, Result};
use crate::models::symbol::normalize_pair;
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

pub const API_BASE_URL: &str = "https://api.gateio.ws/api/v4";
const RATE_LIMIT: Duration = Duration::from_millis(100);
const RATE_LIMIT_KEY: &str = "gateio";

#[derive(Debug, Deserialize)]
struct CurrencyPair {
    id: String,
    quote: String,
    trade_status: String,
}

#[derive(Debug)]
pub struct GateioClient {
    client: Client,
    base_url: String,
    quote_asset: String,
    rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl GateioClient {
    /// `quote_asset` is used to turn normalised pairs (`SXPUSDT`) back into
    /// Gate.io ids (`SXP_USDT`).
    pub fn new(
        base_url: &str,
        quote_asset: &str,
        timeout: Duration,
        rate_limiter: Arc<Mutex<RateLimiter>>,
    ) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            quote_asset: quote_asset.to_uppercase(),
            rate_limiter,
        })
    }

    pub async fn tradable_pairs(&self, quote_asset: &str) -> Result<HashSet<String>> {
        let request = self.client.get(format!("{}/spot/currency_pairs", self.base_url));
        let pairs: Vec<CurrencyPair> = send_json(request, &self.rate_limiter, RATE_LIMIT_KEY, RATE_LIMIT).await?;
        let pairs = tradable_from_pairs(pairs, quote_asset);
        info!("Gate.io tradable pairs found: {}", pairs.len());
        Ok(pairs)
    }

    pub async fn candles(&self, pair: &str, interval: &str, limit: usize) -> Result<CandleWindow> {
        let request = self
            .client
            .get(format!("{}/spot/candlesticks", self.base_url))
            .query(&[
                ("currency_pair", to_gate_pair(pair, &self.quote_asset)),
                ("interval", interval.to_string()),
                ("limit", limit.to_string()),
            ]);
        let rows: Vec<Vec<Value>> = send_json(request, &self.rate_limiter, RATE_LIMIT_KEY, RATE_LIMIT).await?;
        parse_candlesticks(&rows)
    }
}

fn tradable_from_pairs(pairs: Vec<CurrencyPair>, quote_asset: &str) -> HashSet<String> {
    pairs
        .into_iter()
        .filter(|p| p.quote.eq_ignore_ascii_case(quote_asset) && p.trade_status == "tradable")
        .map(|p| normalize_pair(&p.id))
        .collect()
}

fn to_gate_pair(pair: &str, quote_asset: &str) -> String {
    let pair = pair.to_uppercase();
    if pair.contains('_') {
        return pair;
    }
    match pair.strip_suffix(quote_asset) {
        Some(base) if !base.is_empty() => format!("{}_{}", base, quote_asset),
        _ => pair,
    }
}

/// Candlestick rows: `[t, quote_volume, close, high, low, open, base_volume, closed]`.
/// Sorted oldest first regardless of the order received.
fn parse_candlesticks(rows: &[Vec<Value>]) -> Result<CandleWindow> {
    let mut candles = Vec::with_capacity(rows.len());
    for row in rows {
        let seconds = row
            .first()
            .and_then(value_to_f64)
            .ok_or_else(|| Error::ApiInvalidData("Missing candlestick timestamp".into()))?;
        let timestamp = DateTime::from_timestamp(seconds as i64, 0)
            .ok_or_else(|| Error::ApiInvalidData(format!("Invalid candlestick timestamp: {}", seconds)))?;

        candles.push(Candle::new(
            timestamp,
            field_f64(row, 5, "open")?,
            field_f64(row, 3, "high")?,
            field_f64(row, 4, "low")?,
            field_f64(row, 2, "close")?,
            field_f64(row, 6, "volume")?,
        ));
    }
    candles.sort_by_key(|c| c.timestamp);
    Ok(CandleWindow::new(candles))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tradable_pairs_are_normalised() {
        let pairs: Vec<CurrencyPair> = serde_json::from_str(
            r#"[
                {"id":"SXP_USDT","base":"SXP","quote":"USDT","trade_status":"tradable"},
                {"id":"ETH_BTC","base":"ETH","quote":"BTC","trade_status":"tradable"},
                {"id":"OLD_USDT","base":"OLD","quote":"USDT","trade_status":"untradable"}
            ]"#,
        )
        .unwrap();
        let set = tradable_from_pairs(pairs, "usdt");
        assert_eq!(set.len(), 1);
        assert!(set.contains("SXPUSDT"));
    }

    #[test]
    fn test_to_gate_pair() {
        assert_eq!(to_gate_pair("sxpusdt", "USDT"), "SXP_USDT");
        assert_eq!(to_gate_pair("SXP_USDT", "USDT"), "SXP_USDT");
        assert_eq!(to_gate_pair("USDT", "USDT"), "USDT");
        assert_eq!(to_gate_pair("ETHBTC", "USDT"), "ETHBTC");
    }

    #[test]
    fn test_parse_candlesticks_sorted_and_mapped() {
        let rows: Vec<Vec<Value>> = serde_json::from_str(
            r#"[
                ["1700000060","5000.0","1.30","1.35","1.20","1.25","4000.0","true"],
                ["1700000000","4000.0","1.25","1.26","1.10","1.15","3300.0","true"]
            ]"#,
        )
        .unwrap();
        let window = parse_candlesticks(&rows).unwrap();
        assert_eq!(window.len(), 2);
        let first = &window.candles()[0];
        assert_eq!(first.timestamp.timestamp(), 1700000000);
        assert_eq!(first.open, 1.15);
        assert_eq!(first.close, 1.25);
        let last = window.last().unwrap();
        assert_eq!(last.high, 1.35);
        assert_eq!(last.low, 1.20);
        assert_eq!(last.volume, 4000.0);
    }
}
