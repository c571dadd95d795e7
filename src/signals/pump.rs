//! Composite pump score.
//!
//! The score is an additive point system over a handful of indicator
//! conditions with one overbought penalty. It is a heuristic, not a
//! probability; downstream alerting compares it against an integer threshold.

use super::indicators::{
    from_end, highest, obv_trend_up, pct_change, rsi, sma, strictly_rising, volume_change, volume_ratio,
    williams_r, PRICE_EPSILON,
};
use crate::models::CandleWindow;
use serde::{Deserialize, Serialize};

/// Shortest window every sub-indicator can be computed on.
pub const MIN_CANDLES: usize = 30;

const BASELINE_BARS: usize = 10;
const RECENT_BARS: usize = 3;
const VOLUME_CHANGE_BARS: usize = 5;
const VOLUME_CHANGE_CAP: f64 = 100_000.0;
const PRICE_CHANGE_BARS: usize = 6;
const RSI_PERIOD: usize = 14;
const OBV_LOOKBACK: usize = 5;
const WILLIAMS_PERIOD: usize = 5;
const BREAKOUT_BARS: usize = 14;
const BREAKOUT_MARGIN: f64 = 1.01;
const MA_PERIOD: usize = 25;

const PUMP_START_VOLUME_RATIO: f64 = 3.0;
const PUMP_START_WINDOW_CHANGE: f64 = 15.0;

/// Results of one engine run. Read-only once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorDetail {
    pub volume_change_pct: f64,
    pub price_change_pct: f64,
    pub rsi: f64,
    pub obv_up: bool,
    pub williams_r: f64,
    pub breakout: bool,
    pub price: f64,
    pub volume_ratio: f64,
    pub window_price_change_pct: f64,
    pub pump_start: bool,
    pub ma_crossover: bool,
    pub volume_acceleration: bool,
}

impl IndicatorDetail {
    fn is_finite(&self) -> bool {
        [
            self.volume_change_pct,
            self.price_change_pct,
            self.rsi,
            self.williams_r,
            self.price,
            self.volume_ratio,
            self.window_price_change_pct,
        ]
        .iter()
        .all(|v| v.is_finite())
    }

    /// Points awarded for this detail.
    pub fn points(&self) -> i32 {
        let mut score = 0;
        if self.pump_start {
            score += 5;
        }
        if self.volume_change_pct > 500.0 {
            score += 3;
        }
        if self.price_change_pct > 5.0 && self.price_change_pct < 20.0 {
            score += 2;
        }
        if self.rsi > 60.0 && self.obv_up {
            score += 1;
        }
        if self.williams_r > -30.0 {
            score += 1;
        }
        if self.breakout {
            score += 1;
        }
        if self.ma_crossover {
            score += 1;
        }
        if self.volume_acceleration {
            score += 1;
        }

        if self.rsi > 80.0 && self.price_change_pct < 3.0 {
            score -= 2;
        }
        score
    }
}

/// Scores a candle window. Windows shorter than [`MIN_CANDLES`] or producing a
/// non-finite indicator yield `(0, None)` so one bad symbol never stops a scan.
pub fn pump_score(window: &CandleWindow) -> (i32, Option<IndicatorDetail>) {
    if window.len() < MIN_CANDLES {
        return (0, None);
    }

    match compute_detail(window) {
        Some(detail) if detail.is_finite() => (detail.points(), Some(detail)),
        _ => (0, None),
    }
}

fn compute_detail(window: &CandleWindow) -> Option<IndicatorDetail> {
    let closes = window.closes();
    let highs = window.highs();
    let lows = window.lows();
    let volumes = window.volumes();

    let price = from_end(&closes, 1)?;

    let ratio = volume_ratio(&volumes, BASELINE_BARS, RECENT_BARS)?;
    let breakout_level = highest(&highs, BASELINE_BARS + RECENT_BARS, RECENT_BARS)?;
    let window_close = from_end(&closes, BASELINE_BARS + RECENT_BARS)?;
    let window_change = pct_change(price, window_close, PRICE_EPSILON);

    let volume_change_pct = volume_change(&volumes, VOLUME_CHANGE_BARS)?.min(VOLUME_CHANGE_CAP);
    let price_change_pct = pct_change(price, from_end(&closes, PRICE_CHANGE_BARS)?, PRICE_EPSILON);

    let rsi = rsi(&closes, RSI_PERIOD)?;
    let obv_up = obv_trend_up(&closes, &volumes, OBV_LOOKBACK)?;
    let williams_r = williams_r(&highs, &lows, &closes, WILLIAMS_PERIOD)?;

    let breakout = price > highest(&highs, BREAKOUT_BARS + 1, 1)? * BREAKOUT_MARGIN;
    let ma_crossover = price > sma(&closes, MA_PERIOD)?;
    let volume_acceleration = strictly_rising(&volumes, RECENT_BARS)?;

    let pump_start = ratio > PUMP_START_VOLUME_RATIO
        && price > breakout_level * BREAKOUT_MARGIN
        && window_change > PUMP_START_WINDOW_CHANGE;

    Some(IndicatorDetail {
        volume_change_pct,
        price_change_pct,
        rsi,
        obv_up,
        williams_r,
        breakout,
        price,
        volume_ratio: ratio,
        window_price_change_pct: window_change,
        pump_start,
        ma_crossover,
        volume_acceleration,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Candle;
    use chrono::DateTime;

    fn window(closes: &[f64], volumes: &[f64]) -> CandleWindow {
        closes
            .iter()
            .zip(volumes)
            .enumerate()
            .map(|(i, (&close, &volume))| {
                let ts = DateTime::from_timestamp(i as i64 * 60, 0).unwrap();
                Candle::new(ts, close, close, close, close, volume)
            })
            .collect::<Vec<_>>()
            .into()
    }

    fn detail() -> IndicatorDetail {
        IndicatorDetail {
            volume_change_pct: 0.0,
            price_change_pct: 0.0,
            rsi: 50.0,
            obv_up: false,
            williams_r: -50.0,
            breakout: false,
            price: 1.0,
            volume_ratio: 1.0,
            window_price_change_pct: 0.0,
            pump_start: false,
            ma_crossover: false,
            volume_acceleration: false,
        }
    }

    #[test]
    fn test_short_window_scores_zero() {
        let w = window(&[1.0; MIN_CANDLES - 1], &[1.0; MIN_CANDLES - 1]);
        assert_eq!(pump_score(&w), (0, None));
    }

    #[test]
    fn test_flat_window_is_finite() {
        let w = window(&[100.0; 40], &[100.0; 40]);
        let (score, detail) = pump_score(&w);
        let detail = detail.unwrap();
        assert!(detail.rsi.is_finite());
        assert!(detail.williams_r.is_finite());
        // Only the Williams %R condition holds on a flat tape.
        assert_eq!(score, 1);
    }

    #[test]
    fn test_non_finite_input_scores_zero() {
        let mut closes = vec![100.0; 40];
        closes[39] = f64::NAN;
        let w = window(&closes, &[100.0; 40]);
        assert_eq!(pump_score(&w), (0, None));
    }

    #[test]
    fn test_point_table() {
        let mut d = detail();
        assert_eq!(d.points(), 0);

        d.pump_start = true;
        assert_eq!(d.points(), 5);

        d.volume_change_pct = 500.0;
        assert_eq!(d.points(), 5);
        d.volume_change_pct = 500.1;
        assert_eq!(d.points(), 8);

        d.price_change_pct = 5.0;
        assert_eq!(d.points(), 8);
        d.price_change_pct = 19.9;
        assert_eq!(d.points(), 10);
        d.price_change_pct = 20.0;
        assert_eq!(d.points(), 8);
    }

    #[test]
    fn test_rsi_requires_obv_confirmation() {
        let mut d = detail();
        d.rsi = 70.0;
        assert_eq!(d.points(), 0);
        d.obv_up = true;
        assert_eq!(d.points(), 1);
    }

    #[test]
    fn test_overbought_penalty() {
        let mut d = detail();
        d.rsi = 85.0;
        d.price_change_pct = 2.0;
        d.williams_r = -10.0;
        assert_eq!(d.points(), -1);

        d.price_change_pct = 3.0;
        assert_eq!(d.points(), 1);
    }
}
