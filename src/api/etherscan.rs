use super::{send_json, ChainDataProvider, RateLimiter};
use crate::error::{Error, Result};
use crate::models::TransferEvent;
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

pub const API_BASE_URL: &str = "https://api.etherscan.io/v2/api";
// Free tier allows 5 calls per second.
const RATE_LIMIT: Duration = Duration::from_millis(250);
const RATE_LIMIT_KEY: &str = "etherscan";
const NO_TRANSACTIONS: &str = "No transactions found";

#[derive(Debug, Deserialize)]
struct EtherscanResponse {
    status: String,
    message: String,
    result: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenTransfer {
    from: String,
    to: String,
    value: String,
    token_decimal: String,
}

impl TokenTransfer {
    fn into_event(self) -> Result<TransferEvent> {
        let raw_amount: f64 = self
            .value
            .parse()
            .map_err(|_| Error::ApiInvalidData(format!("Invalid transfer value: {}", self.value)))?;
        let decimals: u32 = self
            .token_decimal
            .parse()
            .map_err(|_| Error::ApiInvalidData(format!("Invalid token decimals: {}", self.token_decimal)))?;
        if !raw_amount.is_finite() || raw_amount < 0.0 {
            return Err(Error::ApiInvalidData(format!("Invalid transfer value: {}", self.value)));
        }
        Ok(TransferEvent::new(self.from, self.to, raw_amount, decimals))
    }
}

#[derive(Debug)]
pub struct EtherscanClient {
    client: Client,
    base_url: String,
    api_key: String,
    chain_id: u64,
    rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl EtherscanClient {
    pub fn new(
        base_url: &str,
        api_key: String,
        chain_id: u64,
        timeout: Duration,
        rate_limiter: Arc<Mutex<RateLimiter>>,
    ) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.to_string(),
            api_key,
            chain_id,
            rate_limiter,
        })
    }
}

#[async_trait]
impl ChainDataProvider for EtherscanClient {
    async fn fetch_transfer_events(&self, token_address: &str, start_time: i64, end_time: i64) -> Result<Vec<TransferEvent>> {
        let request = self.client.get(&self.base_url).query(&[
            ("chainid", self.chain_id.to_string()),
            ("module", "account".to_string()),
            ("action", "tokentx".to_string()),
            ("contractaddress", token_address.to_string()),
            ("starttimestamp", start_time.to_string()),
            ("endtimestamp", end_time.to_string()),
            ("sort", "desc".to_string()),
            ("apikey", self.api_key.clone()),
        ]);
        let response: EtherscanResponse = send_json(request, &self.rate_limiter, RATE_LIMIT_KEY, RATE_LIMIT).await?;
        parse_transfers(response)
    }
}

fn parse_transfers(response: EtherscanResponse) -> Result<Vec<TransferEvent>> {
    if response.status != "1" {
        if response.message.starts_with(NO_TRANSACTIONS) {
            return Ok(Vec::new());
        }
        return Err(Error::ApiError(format!(
            "Etherscan returned status {}: {} ({})",
            response.status, response.message, response.result
        )));
    }

    let rows = match response.result {
        Value::Array(rows) => rows,
        other => return Err(Error::ApiInvalidFormat(format!("Unexpected tokentx result: {}", other))),
    };

    let mut events = Vec::with_capacity(rows.len());
    for row in rows {
        match serde_json::from_value::<TokenTransfer>(row).map_err(Error::from).and_then(TokenTransfer::into_event) {
            Ok(event) => events.push(event),
            Err(e) => warn!("Skipping malformed token transfer: {}", e),
        }
    }
    debug!("Parsed {} token transfers", events.len());
    Ok(events)
}
