//! Sequential scan over the configured symbols.
//!
//! Each symbol goes through the spot filter, the listing check, the rollback
//! filter and the pump score. Candidates above the alert threshold are enriched
//! with whale-flow reports before a single alert is sent. Collaborator failures
//! only ever skip the symbol they belong to.

pub mod alert;

use crate::api::binance::BinanceClient;
use crate::api::coingecko::CoinGeckoClient;
use crate::api::etherscan::EtherscanClient;
use crate::api::gateio::GateioClient;
use crate::api::{ChainDataProvider, MarketDataCollector, MarketDataProvider, PriceProvider, RateLimiter};
use crate::config::{Config, ScanConfig};
use crate::error::Result;
use crate::models::{Exchange, SymbolEntry};
use crate::signals::{has_rolled_back, is_spot, price_change, pump_score, IndicatorDetail};
use crate::telegram::{notifier_from_config, Notifier};
use crate::whale::{aggregate, FLOW_WINDOWS};
use alert::{compose_pump_alert, compose_stable_report, compose_summary, FlowSection, PumpAlert};
use chrono::Utc;
use log::{debug, error, info, warn};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Tradable pairs per exchange, fetched once per cycle.
pub type TradablePairs = HashMap<Exchange, HashSet<String>>;

/// What happened to one symbol during a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolOutcome {
    StableReported,
    StableSkipped,
    NotSpot,
    UnknownExchange,
    PairNotListed,
    InsufficientData,
    RolledBack,
    BelowThreshold(i32),
    Alerted(i32),
}

impl SymbolOutcome {
    /// Spot symbols count toward the cycle total.
    pub fn counts_toward_total(&self) -> bool {
        !matches!(
            self,
            SymbolOutcome::StableReported | SymbolOutcome::StableSkipped | SymbolOutcome::NotSpot
        )
    }

    pub fn was_scored(&self) -> bool {
        matches!(self, SymbolOutcome::BelowThreshold(_) | SymbolOutcome::Alerted(_))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub total: usize,
    pub scored: usize,
    pub alerts: usize,
    pub stable_reports: usize,
}

impl ScanSummary {
    fn record(&mut self, outcome: SymbolOutcome) {
        if outcome.counts_toward_total() {
            self.total += 1;
        }
        if outcome.was_scored() {
            self.scored += 1;
        }
        match outcome {
            SymbolOutcome::Alerted(_) => self.alerts += 1,
            SymbolOutcome::StableReported => self.stable_reports += 1,
            _ => {}
        }
    }
}

/// Everything known about a symbol that cleared the alert threshold.
#[derive(Debug, Clone)]
pub struct ScanCandidate {
    pub symbol: String,
    pub pair: String,
    pub exchange: Exchange,
    pub spot: bool,
    pub score: i32,
    pub detail: IndicatorDetail,
    pub rolled_back: bool,
    pub window_change_pct: f64,
    pub flows: Vec<FlowSection>,
}

impl ScanCandidate {
    pub fn alert_message(&self, threshold: i32) -> String {
        compose_pump_alert(&PumpAlert {
            symbol: &self.symbol,
            pair: &self.pair,
            exchange: self.exchange.as_str(),
            score: self.score,
            threshold,
            detail: &self.detail,
            window_change_pct: self.window_change_pct,
            flows: &self.flows,
        })
    }
}

pub struct Scanner {
    market: Arc<dyn MarketDataProvider>,
    chain: Arc<dyn ChainDataProvider>,
    prices: Arc<dyn PriceProvider>,
    notifier: Arc<dyn Notifier>,
    settings: ScanConfig,
}

impl Scanner {
    pub fn new(
        market: Arc<dyn MarketDataProvider>,
        chain: Arc<dyn ChainDataProvider>,
        prices: Arc<dyn PriceProvider>,
        notifier: Arc<dyn Notifier>,
        settings: ScanConfig,
    ) -> Self {
        Self {
            market,
            chain,
            prices,
            notifier,
            settings,
        }
    }

    /// Wires the HTTP collaborators behind one shared rate limiter.
    pub fn from_config(config: &Config) -> Result<Self> {
        let rate_limiter = RateLimiter::shared();
        let timeout = config.http.request_timeout();
        let api = &config.api;

        let binance = BinanceClient::new(&api.binance_base_url, timeout, rate_limiter.clone())?;
        let gateio = GateioClient::new(&api.gateio_base_url, &config.scan.quote_asset, timeout, rate_limiter.clone())?;
        let etherscan = EtherscanClient::new(
            &api.etherscan_base_url,
            api.etherscan_api_key.clone(),
            api.etherscan_chain_id,
            timeout,
            rate_limiter.clone(),
        )?;
        let coingecko = CoinGeckoClient::new(&api.coingecko_base_url, api.coingecko_api_key.clone(), timeout, rate_limiter)?;

        Ok(Self::new(
            Arc::new(MarketDataCollector::new(binance, gateio)),
            Arc::new(etherscan),
            Arc::new(coingecko),
            notifier_from_config(&config.telegram)?,
            config.scan.clone(),
        ))
    }

    pub fn settings(&self) -> &ScanConfig {
        &self.settings
    }

    /// Processes every entry in order and finishes with a summary message.
    pub async fn run_cycle(&self, entries: &[SymbolEntry]) -> ScanSummary {
        info!("Scan started for {} symbols", entries.len());
        let pairs = self.load_tradable_pairs(entries).await;

        let mut summary = ScanSummary::default();
        for entry in entries {
            let outcome = self.process_symbol(entry, &pairs).await;
            debug!("{} ({}): {:?}", entry.symbol, entry.pair, outcome);
            summary.record(outcome);
        }

        let message = compose_summary(summary.scored, summary.total);
        info!("{}", message);
        self.emit(&message).await;
        summary
    }

    /// One fetch per exchange referenced by a non-stable entry. A failed fetch leaves
    /// that exchange with no listed pairs for this cycle.
    pub async fn load_tradable_pairs(&self, entries: &[SymbolEntry]) -> TradablePairs {
        let exchanges: HashSet<Exchange> = entries
            .iter()
            .filter(|e| !e.is_stable)
            .filter_map(|e| e.exchange.parse().ok())
            .collect();

        let mut pairs = TradablePairs::new();
        for exchange in exchanges {
            let listed = match self
                .market
                .fetch_tradable_pairs(exchange, &self.settings.quote_asset)
                .await
            {
                Ok(listed) => listed,
                Err(e) => {
                    warn!("Failed to fetch {} tradable pairs: {}", exchange, e);
                    HashSet::new()
                }
            };
            pairs.insert(exchange, listed);
        }
        pairs
    }

    pub async fn process_symbol(&self, entry: &SymbolEntry, pairs: &TradablePairs) -> SymbolOutcome {
        info!(
            "{} ({}) - {} - stable: {}",
            entry.symbol, entry.pair, entry.exchange, entry.is_stable
        );

        if entry.is_stable {
            return self.report_stable(entry).await;
        }

        if !is_spot(&entry.pair, &entry.symbol) {
            info!("{} is not a spot pair, skipping", entry.symbol);
            return SymbolOutcome::NotSpot;
        }

        let exchange: Exchange = match entry.exchange.parse() {
            Ok(exchange) => exchange,
            Err(_) => {
                warn!("Unknown exchange {} for {}, skipping", entry.exchange, entry.symbol);
                return SymbolOutcome::UnknownExchange;
            }
        };

        if !pairs.get(&exchange).map_or(false, |listed| listed.contains(&entry.pair)) {
            info!("{} ({}) not found in {} tradable pairs, skipping", entry.symbol, entry.pair, exchange);
            return SymbolOutcome::PairNotListed;
        }

        let window = match self
            .market
            .fetch_candles(exchange, &entry.pair, &self.settings.candle_interval, self.settings.candle_limit)
            .await
        {
            Ok(window) => window,
            Err(e) => {
                warn!("Failed to fetch candles for {} on {}: {}", entry.pair, exchange, e);
                return SymbolOutcome::InsufficientData;
            }
        };
        if window.len() < self.settings.min_candles {
            info!("Candle data insufficient for {} ({} bars), skipping", entry.pair, window.len());
            return SymbolOutcome::InsufficientData;
        }

        if has_rolled_back(&window, self.settings.rollback_lookback, self.settings.rollback_threshold_pct) {
            info!("{} ({}) has rolled back after a pump, skipping", entry.symbol, entry.pair);
            return SymbolOutcome::RolledBack;
        }

        let (score, detail) = pump_score(&window);
        info!("{} ({}) pump score: {}", entry.symbol, entry.pair, score);
        if let Some(detail) = &detail {
            if let Ok(json) = serde_json::to_string(detail) {
                debug!("{} indicators: {}", entry.pair, json);
            }
        }

        let detail = match detail {
            Some(detail) if score >= self.settings.alert_threshold => detail,
            _ => return SymbolOutcome::BelowThreshold(score),
        };

        let mut flows = Vec::new();
        if let Some((token, asset)) = entry.whale_ids() {
            if let Some((price, supply)) = self.price_and_supply(asset).await {
                flows = self.collect_flows(token, price, supply).await;
            }
        }

        let candidate = ScanCandidate {
            symbol: entry.symbol.clone(),
            pair: entry.pair.clone(),
            exchange,
            spot: true,
            score,
            detail,
            rolled_back: false,
            window_change_pct: price_change(&window.closes(), window.len()),
            flows,
        };
        self.emit(&candidate.alert_message(self.settings.alert_threshold)).await;
        self.pace().await;
        SymbolOutcome::Alerted(score)
    }

    async fn report_stable(&self, entry: &SymbolEntry) -> SymbolOutcome {
        let Some((token, asset)) = entry.whale_ids() else {
            warn!("Stable asset {} has no token address or asset id, skipping", entry.symbol);
            return SymbolOutcome::StableSkipped;
        };
        let Some((price, supply)) = self.price_and_supply(asset).await else {
            info!("No usable price or supply for stable asset {}, skipping", entry.symbol);
            return SymbolOutcome::StableSkipped;
        };

        let flows = self.collect_flows(token, price, supply).await;
        self.emit(&compose_stable_report(&entry.symbol, price, &flows)).await;
        self.pace().await;
        SymbolOutcome::StableReported
    }

    async fn price_and_supply(&self, asset_id: &str) -> Option<(f64, f64)> {
        match self.prices.fetch_price_and_supply(asset_id).await {
            Ok(data) => data.usable(),
            Err(e) => {
                warn!("Failed to fetch price and supply for {}: {}", asset_id, e);
                None
            }
        }
    }

    /// One fresh event fetch per window. Windows without events are left out.
    async fn collect_flows(&self, token_address: &str, price: f64, supply: f64) -> Vec<FlowSection> {
        let now = Utc::now().timestamp();
        let mut flows = Vec::new();
        for window in FLOW_WINDOWS.iter() {
            let (start, end) = window.range_ending_at(now);
            match self.chain.fetch_transfer_events(token_address, start, end).await {
                Ok(events) if !events.is_empty() => flows.push(FlowSection {
                    label: window.label,
                    report: aggregate(&events, price, supply),
                }),
                Ok(_) => {}
                Err(e) => warn!("Failed to fetch {} transfers for {}: {}", window.label, token_address, e),
            }
        }
        flows
    }

    async fn emit(&self, message: &str) {
        if let Err(e) = self.notifier.notify(message).await {
            error!("Failed to send notification: {}", e);
        }
    }

    async fn pace(&self) {
        tokio::time::sleep(self.settings.symbol_delay()).await;
    }
}
