//! Directional whale-flow statistics over token transfer events.
//!
//! A transfer counts as inbound when its destination is not the zero address
//! and as outbound when its source is not the zero address. Ordinary
//! wallet-to-wallet transfers therefore land in both sums.

use crate::models::TransferEvent;
use crate::utils::format::thousands;
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Share of circulating supply above which a flow is flagged.
pub const HIGH_FLOW_PCT: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowWindow {
    pub label: &'static str,
    pub minutes: i64,
}

impl FlowWindow {
    pub const fn new(label: &'static str, minutes: i64) -> Self {
        Self { label, minutes }
    }

    pub fn duration(&self) -> Duration {
        Duration::minutes(self.minutes)
    }

    /// `(start, end)` unix seconds ending at `now`.
    pub fn range_ending_at(&self, now: i64) -> (i64, i64) {
        (now - self.duration().num_seconds(), now)
    }
}

pub const FLOW_WINDOWS: [FlowWindow; 5] = [
    FlowWindow::new("15m", 15),
    FlowWindow::new("30m", 30),
    FlowWindow::new("1h", 60),
    FlowWindow::new("4h", 4 * 60),
    FlowWindow::new("24h", 24 * 60),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowAmount {
    pub native: f64,
    pub usd: f64,
    pub supply_pct: f64,
}

impl FlowAmount {
    fn new(native: f64, price: f64, supply: f64) -> Self {
        Self {
            native,
            usd: if price != 0.0 { native * price } else { 0.0 },
            supply_pct: if supply != 0.0 { native / supply * 100.0 } else { 0.0 },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowReport {
    pub incoming: FlowAmount,
    pub outgoing: FlowAmount,
    pub net: FlowAmount,
    pub high_inflow: bool,
    pub high_outflow: bool,
}

impl FlowReport {
    /// Telegram HTML block for one window.
    pub fn render(&self, label: &str) -> String {
        let mut lines = vec![format!("⏱️ <b>{} Whale Activity</b>", label)];
        if self.incoming.native > 0.0 {
            lines.push(format!(
                "🟩 Inflow: <b>{}</b> ({:.4}%) ≈ ${}",
                thousands(self.incoming.native),
                self.incoming.supply_pct,
                thousands(self.incoming.usd)
            ));
            if self.high_inflow {
                lines.push("🚨 HIGH WHALE INFLOW!".to_string());
            }
        }
        if self.outgoing.native > 0.0 {
            lines.push(format!(
                "🟥 Outflow: <b>{}</b> ({:.4}%) ≈ ${}",
                thousands(self.outgoing.native),
                self.outgoing.supply_pct,
                thousands(self.outgoing.usd)
            ));
            if self.high_outflow {
                lines.push("⚠️ HIGH WHALE OUTFLOW!".to_string());
            }
        }
        lines.push(format!(
            "🟦 Net: <b>{}</b> ({:.4}%) ≈ ${}",
            thousands(self.net.native),
            self.net.supply_pct,
            thousands(self.net.usd)
        ));
        lines.join("\n")
    }
}

/// Reduces one window's transfer events to a [`FlowReport`].
///
/// A zero `price` yields zero USD figures and a zero `supply` yields zero
/// percentages.
pub fn aggregate(events: &[TransferEvent], price: f64, supply: f64) -> FlowReport {
    let incoming: f64 = events
        .iter()
        .filter(|e| e.is_inbound())
        .map(TransferEvent::native_amount)
        .sum();
    let outgoing: f64 = events
        .iter()
        .filter(|e| e.is_outbound())
        .map(TransferEvent::native_amount)
        .sum();

    let incoming = FlowAmount::new(incoming, price, supply);
    let outgoing = FlowAmount::new(outgoing, price, supply);
    let net = FlowAmount::new(incoming.native - outgoing.native, price, supply);

    FlowReport {
        high_inflow: incoming.supply_pct > HIGH_FLOW_PCT,
        high_outflow: outgoing.supply_pct > HIGH_FLOW_PCT,
        incoming,
        outgoing,
        net,
    }
}
