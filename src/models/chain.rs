use serde::{Deserialize, Serialize};

/// Mint/burn counterparty. Transfers touching it only count in one direction.
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferEvent {
    pub from: String,
    pub to: String,
    pub raw_amount: f64,
    pub decimals: u32,
}

impl TransferEvent {
    pub fn new(from: impl Into<String>, to: impl Into<String>, raw_amount: f64, decimals: u32) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            raw_amount,
            decimals,
        }
    }

    /// Amount in whole tokens.
    pub fn native_amount(&self) -> f64 {
        self.raw_amount / 10f64.powi(self.decimals as i32)
    }

    pub fn is_inbound(&self) -> bool {
        !self.to.eq_ignore_ascii_case(ZERO_ADDRESS)
    }

    pub fn is_outbound(&self) -> bool {
        !self.from.eq_ignore_ascii_case(ZERO_ADDRESS)
    }
}

/// Spot price in USD and circulating supply as reported by the price provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSupply {
    pub price: Option<f64>,
    pub circulating_supply: Option<f64>,
}

impl PriceSupply {
    /// Both values present and non-zero.
    pub fn usable(&self) -> Option<(f64, f64)> {
        match (self.price, self.circulating_supply) {
            (Some(price), Some(supply)) if price != 0.0 && supply != 0.0 => Some((price, supply)),
            _ => None,
        }
    }
}
