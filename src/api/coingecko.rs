use super::{send_json, PriceProvider, RateLimiter};
use crate::error::{Error, Result};
use crate::models::PriceSupply;
use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

pub const API_BASE_URL: &str = "https://api.coingecko.com/api/v3";
const RATE_LIMIT: Duration = Duration::from_secs(1);
const RATE_LIMIT_KEY: &str = "coingecko";

#[derive(Debug, Deserialize)]
struct CoinGeckoCoin {
    id: String,
    market_data: Option<CoinGeckoMarketData>,
}

#[derive(Debug, Deserialize, Default)]
struct CoinGeckoMarketData {
    #[serde(default)]
    current_price: CurrentPrice,
    circulating_supply: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
struct CurrentPrice {
    usd: Option<f64>,
}

impl CoinGeckoCoin {
    fn into_price_supply(self) -> Result<PriceSupply> {
        let market_data = self.market_data.ok_or_else(|| {
            error!("CoinGecko response for {} has no market data", self.id);
            Error::ApiInvalidData(format!("Missing market data for {}", self.id))
        })?;

        let price = market_data.current_price.usd;
        let circulating_supply = market_data.circulating_supply;
        if price.unwrap_or_default() < 0.0 {
            return Err(Error::ApiInvalidData("Negative token price".into()));
        }
        if circulating_supply.unwrap_or_default() < 0.0 {
            return Err(Error::ApiInvalidData("Negative circulating supply".into()));
        }

        Ok(PriceSupply { price, circulating_supply })
    }
}

#[derive(Debug)]
pub struct CoinGeckoClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl CoinGeckoClient {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
        rate_limiter: Arc<Mutex<RateLimiter>>,
    ) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
            rate_limiter,
        })
    }
}

#[async_trait]
impl PriceProvider for CoinGeckoClient {
    async fn fetch_price_and_supply(&self, asset_id: &str) -> Result<PriceSupply> {
        let mut request = self
            .client
            .get(format!("{}/coins/{}", self.base_url, asset_id))
            .query(&[
                ("localization", "false"),
                ("tickers", "false"),
                ("market_data", "true"),
                ("community_data", "false"),
                ("developer_data", "false"),
            ]);
        if let Some(key) = &self.api_key {
            request = request.header("X-CG-Pro-API-Key", key);
        }

        let coin: CoinGeckoCoin = send_json(request, &self.rate_limiter, RATE_LIMIT_KEY, RATE_LIMIT).await?;
        let data = coin.into_price_supply()?;
        debug!("CoinGecko {}: price {:?}, supply {:?}", asset_id, data.price, data.circulating_supply);
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_and_supply_parsed() {
        let coin: CoinGeckoCoin = serde_json::from_str(
            r#"{"id":"usd-coin","symbol":"usdc","market_data":{
                "current_price":{"usd":0.9998,"eur":0.92},
                "circulating_supply":32000000000.0,
                "total_supply":32000000000.0
            }}"#,
        )
        .unwrap();
        let data = coin.into_price_supply().unwrap();
        assert_eq!(data.price, Some(0.9998));
        assert_eq!(data.circulating_supply, Some(32_000_000_000.0));
        assert!(data.usable().is_some());
    }

    #[test]
    fn test_missing_market_data() {
        let coin: CoinGeckoCoin = serde_json::from_str(r#"{"id":"ghost","error":"coin not found"}"#).unwrap();
        assert!(matches!(coin.into_price_supply(), Err(Error::ApiInvalidData(_))));
    }

    #[test]
    fn test_partial_market_data() {
        let coin: CoinGeckoCoin =
            serde_json::from_str(r#"{"id":"tiny","market_data":{"current_price":{},"circulating_supply":null}}"#).unwrap();
        let data = coin.into_price_supply().unwrap();
        assert_eq!(data, PriceSupply::default());
        assert!(data.usable().is_none());
    }
}
