//! Telegram HTML messages emitted by a scan cycle.

use crate::signals::IndicatorDetail;
use crate::utils::format::{grouped, html_escape};
use crate::whale::FlowReport;

/// Volume ratio a pump-start line requires on top of the alert threshold.
const PUMP_START_VOLUME_RATIO: f64 = 3.0;
const PUMP_START_WINDOW_CHANGE_PCT: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalStrength {
    VeryStrong,
    Strong,
    Moderate,
}

impl SignalStrength {
    pub fn from_score(score: i32) -> Self {
        if score >= 9 {
            SignalStrength::VeryStrong
        } else if score >= 7 {
            SignalStrength::Strong
        } else {
            SignalStrength::Moderate
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SignalStrength::VeryStrong => "VERY STRONG",
            SignalStrength::Strong => "STRONG",
            SignalStrength::Moderate => "MODERATE",
        }
    }

    pub fn expected_move(&self) -> &'static str {
        match self {
            SignalStrength::VeryStrong => "20%+ target",
            SignalStrength::Strong => "10–20% potential",
            SignalStrength::Moderate => "4–10% potential",
        }
    }
}

/// One rendered whale-flow window.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowSection {
    pub label: &'static str,
    pub report: FlowReport,
}

pub struct PumpAlert<'a> {
    pub symbol: &'a str,
    pub pair: &'a str,
    pub exchange: &'a str,
    pub score: i32,
    pub threshold: i32,
    pub detail: &'a IndicatorDetail,
    pub window_change_pct: f64,
    pub flows: &'a [FlowSection],
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "YES"
    } else {
        "NO"
    }
}

fn render_flows(flows: &[FlowSection]) -> String {
    flows
        .iter()
        .map(|section| section.report.render(section.label))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn compose_pump_alert(alert: &PumpAlert<'_>) -> String {
    let detail = alert.detail;
    let strength = SignalStrength::from_score(alert.score);
    let pump_start = alert.score >= alert.threshold
        && detail.volume_ratio > PUMP_START_VOLUME_RATIO
        && detail.window_price_change_pct > PUMP_START_WINDOW_CHANGE_PCT;

    let mut message = format!(
        "<b>{} ({})</b> 🚀 <b>PUMP CANDIDATE!</b> (Score: {})\n\
         💹 Exchange: {}\n\
         💰 Price: <code>{:.6}</code>\n\
         📈 Volume Change: <code>{:.2}%</code>\n\
         📉 Price Change: <code>{:.2}%</code>\n\
         🔹 RSI: <code>{:.1}</code> | OBV: {}\n\
         🔸 Williams %R: <code>{:.2}</code> | Breakout: {}\n\
         📊 Pump Start Signal: {}\n\
         📐 Window Change: <code>{:.2}%</code>\n\
         🎯 Signal Strength: {}\n\
         🎯 Expected Move: {}",
        html_escape(alert.symbol),
        html_escape(alert.pair),
        alert.score,
        alert.exchange.to_uppercase(),
        detail.price,
        detail.volume_change_pct,
        detail.price_change_pct,
        detail.rsi,
        if detail.obv_up { "UP" } else { "WEAK" },
        detail.williams_r,
        yes_no(detail.breakout),
        yes_no(pump_start),
        alert.window_change_pct,
        strength.label(),
        strength.expected_move(),
    );

    if !alert.flows.is_empty() {
        message.push_str("\n\n");
        message.push_str(&render_flows(alert.flows));
    }
    message
}

pub fn compose_stable_report(symbol: &str, price: f64, flows: &[FlowSection]) -> String {
    let mut sections = vec![format!(
        "<b>{} (STABLE)</b>\n💰 Price: <code>{}</code>",
        html_escape(symbol),
        grouped(price, 6)
    )];
    if !flows.is_empty() {
        sections.push(render_flows(flows));
    }
    sections.join("\n\n")
}

pub fn compose_summary(scored: usize, total: usize) -> String {
    format!("🧮 Scan complete: {}/{}", scored, total)
}
