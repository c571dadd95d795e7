use crate::models::CandleWindow;

pub const DEFAULT_LOOKBACK: usize = 60;
pub const DEFAULT_THRESHOLD_PCT: f64 = 3.0;

/// Whether price has already retraced from its recent peak.
///
/// Short histories fail open: a window with fewer than `lookback` bars is
/// reported as not rolled back, unlike the pump score which fails closed.
pub fn has_rolled_back(window: &CandleWindow, lookback: usize, threshold_pct: f64) -> bool {
    if lookback == 0 || window.len() < lookback {
        return false;
    }

    let closes = window.closes();
    let recent = &closes[closes.len() - lookback..];
    let peak = recent.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let Some(now) = recent.last().copied() else {
        return false;
    };
    if peak == 0.0 || !peak.is_finite() {
        return false;
    }

    let drawdown = (peak - now) / peak * 100.0;
    drawdown > threshold_pct
}
