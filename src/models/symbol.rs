use serde::{Deserialize, Serialize};

/// One row of the symbol list, already normalised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolEntry {
    pub symbol: String,
    /// Lower-cased exchange name as written in the list. Parsed at scan time so an
    /// unsupported exchange only skips its own row.
    pub exchange: String,
    pub pair: String,
    pub token_address: Option<String>,
    pub asset_id: Option<String>,
    pub is_stable: bool,
}

impl SymbolEntry {
    pub fn new(symbol: &str, exchange: &str, pair: &str) -> Self {
        Self {
            symbol: symbol.trim().to_uppercase(),
            exchange: exchange.trim().to_lowercase(),
            pair: normalize_pair(pair),
            token_address: None,
            asset_id: None,
            is_stable: false,
        }
    }

    pub fn with_token(mut self, token_address: &str, asset_id: &str) -> Self {
        self.token_address = Some(token_address.trim().to_string());
        self.asset_id = Some(asset_id.trim().to_string());
        self
    }

    pub fn stable(mut self) -> Self {
        self.is_stable = true;
        self
    }

    /// Token contract and price-provider id, when both are configured.
    pub fn whale_ids(&self) -> Option<(&str, &str)> {
        match (&self.token_address, &self.asset_id) {
            (Some(token), Some(asset)) => Some((token.as_str(), asset.as_str())),
            _ => None,
        }
    }
}

/// Upper-cases a pair and strips `_` separators so `SXP_USDT` and `SXPUSDT` match.
pub fn normalize_pair(pair: &str) -> String {
    pair.trim().replace('_', "").to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_normalisation() {
        let entry = SymbolEntry::new(" sxp", "GateIO ", "sxp_usdt");
        assert_eq!(entry.symbol, "SXP");
        assert_eq!(entry.exchange, "gateio");
        assert_eq!(entry.pair, "SXPUSDT");
        assert!(entry.whale_ids().is_none());
    }

    #[test]
    fn test_whale_ids_require_both_fields() {
        let mut entry = SymbolEntry::new("USDC", "binance", "USDCUSDT").with_token("0xabc", "usd-coin");
        assert_eq!(entry.whale_ids(), Some(("0xabc", "usd-coin")));

        entry.asset_id = None;
        assert!(entry.whale_ids().is_none());
    }
}
