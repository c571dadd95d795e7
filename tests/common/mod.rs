#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use pump_scanner::api::{ChainDataProvider, MarketDataProvider, PriceProvider};
use pump_scanner::config::ScanConfig;
use pump_scanner::error::{Error, Result};
use pump_scanner::models::{Candle, CandleWindow, Exchange, PriceSupply, TransferEvent};
use pump_scanner::telegram::Notifier;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

pub const USDC_TOKEN: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";

// Helper to build one bar; bar `i` opens one minute after bar `i - 1`.
pub fn create_test_candle(i: usize, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Candle {
    let timestamp = Utc.timestamp_opt(1_700_000_000 + i as i64 * 60, 0).unwrap();
    Candle::new(timestamp, open, high, low, close, volume)
}

pub fn flat_window(n: usize, close: f64, volume: f64) -> CandleWindow {
    (0..n)
        .map(|i| create_test_candle(i, close, close, close, close, volume))
        .collect::<Vec<_>>()
        .into()
}

/// Builds a window from closes and volumes; each bar opens at the previous close
/// and its high and low span open and close.
pub fn window_from_closes(closes: &[f64], volumes: &[f64]) -> CandleWindow {
    assert_eq!(closes.len(), volumes.len());
    let mut candles = Vec::with_capacity(closes.len());
    for (i, (&close, &volume)) in closes.iter().zip(volumes).enumerate() {
        let open = if i == 0 { close } else { closes[i - 1] };
        candles.push(create_test_candle(i, open, open.max(close), open.min(close), close, volume));
    }
    candles.into()
}

/// Thirty bars engineered to hit every bonus except the volume-change and
/// 6-bar-change bonuses: pump start (+5), RSI with rising OBV, Williams %R of
/// exactly -20, breakout, close above the 25-bar mean and accelerating volume.
pub fn pump_window() -> CandleWindow {
    let mut candles: Vec<Candle> = (0..27)
        .map(|i| create_test_candle(i, 100.0, 100.0, 100.0, 100.0, 100.0))
        .collect();
    candles.push(create_test_candle(27, 100.0, 105.0, 100.0, 105.0, 300.0));
    candles.push(create_test_candle(28, 105.0, 110.0, 105.0, 110.0, 400.0));
    candles.push(create_test_candle(29, 110.0, 131.25, 110.0, 125.0, 500.0));
    candles.into()
}

pub fn test_scan_config() -> ScanConfig {
    ScanConfig {
        symbol_delay_secs: 0,
        ..ScanConfig::default()
    }
}

/// Canned market data keyed by exchange and pair.
#[derive(Default)]
pub struct FakeMarket {
    pub pairs: HashMap<Exchange, HashSet<String>>,
    pub windows: HashMap<String, CandleWindow>,
    pub pair_calls: Mutex<Vec<Exchange>>,
}

impl FakeMarket {
    pub fn list(mut self, exchange: Exchange, pair: &str, window: CandleWindow) -> Self {
        self.pairs.entry(exchange).or_default().insert(pair.to_string());
        self.windows.insert(pair.to_string(), window);
        self
    }
}

#[async_trait]
impl MarketDataProvider for FakeMarket {
    async fn fetch_tradable_pairs(&self, exchange: Exchange, _quote_asset: &str) -> Result<HashSet<String>> {
        self.pair_calls.lock().unwrap().push(exchange);
        self.pairs
            .get(&exchange)
            .cloned()
            .ok_or_else(|| Error::NetworkError(format!("{} unreachable", exchange)))
    }

    async fn fetch_candles(&self, _exchange: Exchange, pair: &str, _interval: &str, _limit: usize) -> Result<CandleWindow> {
        self.windows
            .get(pair)
            .cloned()
            .ok_or_else(|| Error::ApiError(format!("no candles for {}", pair)))
    }
}

/// Returns the same events for every window.
#[derive(Default)]
pub struct FakeChain {
    pub events: Vec<TransferEvent>,
}

#[async_trait]
impl ChainDataProvider for FakeChain {
    async fn fetch_transfer_events(&self, _token_address: &str, _start_time: i64, _end_time: i64) -> Result<Vec<TransferEvent>> {
        Ok(self.events.clone())
    }
}

#[derive(Default)]
pub struct FakePrices {
    pub quotes: HashMap<String, PriceSupply>,
}

#[async_trait]
impl PriceProvider for FakePrices {
    async fn fetch_price_and_supply(&self, asset_id: &str) -> Result<PriceSupply> {
        self.quotes
            .get(asset_id)
            .copied()
            .ok_or_else(|| Error::ApiInvalidData(format!("Missing market data for {}", asset_id)))
    }
}

/// Collects every message instead of sending it.
#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, message: &str) -> Result<()> {
        self.messages.lock().unwrap().push(message.to_string());
        Ok(())
    }
}
