use crate::api::{binance, coingecko, etherscan, gateio};
use anyhow::{bail, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub scan: ScanConfig,
    pub telegram: TelegramConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ApiConfig {
    pub binance_base_url: String,
    pub gateio_base_url: String,
    pub etherscan_base_url: String,
    pub etherscan_api_key: String,
    pub etherscan_chain_id: u64,
    pub coingecko_base_url: String,
    pub coingecko_api_key: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            binance_base_url: binance::API_BASE_URL.to_string(),
            gateio_base_url: gateio::API_BASE_URL.to_string(),
            etherscan_base_url: etherscan::API_BASE_URL.to_string(),
            etherscan_api_key: String::new(),
            etherscan_chain_id: 1,
            coingecko_base_url: coingecko::API_BASE_URL.to_string(),
            coingecko_api_key: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ScanConfig {
    pub symbols_path: PathBuf,
    pub quote_asset: String,
    pub candle_interval: String,
    /// Bars requested per symbol. Must cover `rollback_lookback` for the rollback check to run.
    pub candle_limit: usize,
    pub min_candles: usize,
    pub alert_threshold: i32,
    pub rollback_lookback: usize,
    pub rollback_threshold_pct: f64,
    pub symbol_delay_secs: u64,
    pub scan_interval_secs: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            symbols_path: PathBuf::from("token_list.csv"),
            quote_asset: "USDT".to_string(),
            candle_interval: "1m".to_string(),
            candle_limit: 60,
            min_candles: 20,
            alert_threshold: 6,
            rollback_lookback: 60,
            rollback_threshold_pct: 3.0,
            symbol_delay_secs: 2,
            scan_interval_secs: 300,
        }
    }
}

impl ScanConfig {
    pub fn symbol_delay(&self) -> Duration {
        Duration::from_secs(self.symbol_delay_secs)
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    pub enable_notifications: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct HttpConfig {
    pub request_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { request_timeout_secs: 10 }
    }
}

impl HttpConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let config_str =
            fs::read_to_string(path).with_context(|| format!("Failed to read config file {:?}", path))?;
        Self::from_toml(&config_str).with_context(|| format!("Failed to parse config file {:?}", path))
    }

    pub fn from_toml(config_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(config_str)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        fs::write(path, config_str)?;
        Ok(())
    }

    /// Secrets from the process environment take precedence over the file.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(token) = env_var("TELEGRAM_TOKEN") {
            self.telegram.bot_token = token;
        }
        if let Some(chat_id) = env_var("TELEGRAM_CHAT_ID") {
            self.telegram.chat_id = chat_id;
        }
        if let Some(key) = env_var("ETHERSCAN_API_KEY") {
            self.api.etherscan_api_key = key;
        }
        if let Some(key) = env_var("COINGECKO_API_KEY") {
            self.api.coingecko_api_key = Some(key);
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        let scan = &self.scan;
        if scan.quote_asset.trim().is_empty() {
            bail!("scan.quote_asset cannot be empty");
        }
        if scan.candle_interval.trim().is_empty() {
            bail!("scan.candle_interval cannot be empty");
        }
        if scan.candle_limit == 0 {
            bail!("scan.candle_limit must be positive");
        }
        if scan.rollback_lookback == 0 {
            bail!("scan.rollback_lookback must be positive");
        }
        if !scan.rollback_threshold_pct.is_finite() || scan.rollback_threshold_pct < 0.0 {
            bail!("scan.rollback_threshold_pct must be a non-negative number");
        }
        if scan.alert_threshold < 0 {
            bail!("scan.alert_threshold cannot be negative");
        }
        if self.http.request_timeout_secs == 0 {
            bail!("http.request_timeout_secs must be positive");
        }
        if scan.candle_limit < scan.rollback_lookback {
            warn!(
                "scan.candle_limit ({}) is below scan.rollback_lookback ({}), the rollback check will never trigger",
                scan.candle_limit, scan.rollback_lookback
            );
        }
        if self.api.etherscan_api_key.is_empty() {
            warn!("No Etherscan API key configured, whale-flow lookups will likely be rejected");
        }
        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = Config::from_toml(
            r#"
            [scan]
            alert_threshold = 7
            quote_asset = "USDC"

            [telegram]
            chat_id = "@alerts"
            "#,
        )
        .unwrap();
        assert_eq!(config.scan.alert_threshold, 7);
        assert_eq!(config.scan.quote_asset, "USDC");
        assert_eq!(config.scan.candle_limit, 60);
        assert_eq!(config.scan.rollback_threshold_pct, 3.0);
        assert_eq!(config.telegram.chat_id, "@alerts");
        assert!(!config.telegram.enable_notifications);
        assert_eq!(config.http.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.api.etherscan_chain_id, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_file_is_valid() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.scan.symbols_path, PathBuf::from("token_list.csv"));
        assert_eq!(config.scan.symbol_delay(), Duration::from_secs(2));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_malformed_file_rejected() {
        assert!(Config::from_toml("[scan]\ncandle_limit = \"many\"").is_err());
    }

    #[test]
    fn test_validate_rejects_impossible_values() {
        let mut config = Config::default();
        config.scan.candle_limit = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.scan.rollback_threshold_pct = -1.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.http.request_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let path = env::temp_dir().join(format!("pump-scanner-config-{}.toml", std::process::id()));
        let mut config = Config::default();
        config.scan.alert_threshold = 8;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(loaded.scan.alert_threshold, 8);
        assert_eq!(loaded.api.binance_base_url, binance::API_BASE_URL);
    }
}
