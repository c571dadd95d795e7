//! Indicator primitives over candle columns.
//!
//! Every function checks its own lookback and returns `None` instead of
//! indexing past the start of the series. Denominators that can reach zero
//! are padded with the epsilon passed by the caller.

/// Guard added to price denominators.
pub const PRICE_EPSILON: f64 = 1e-9;
/// Guard added to volume and oscillator denominators.
pub const OSCILLATOR_EPSILON: f64 = 1e-8;

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

/// `values[len - back]`, i.e. `back = 1` is the latest value.
pub fn from_end(values: &[f64], back: usize) -> Option<f64> {
    if back == 0 || back > values.len() {
        return None;
    }
    Some(values[values.len() - back])
}

/// Slice covering `[len - start_back, len - end_back)`.
pub fn span_from_end(values: &[f64], start_back: usize, end_back: usize) -> Option<&[f64]> {
    if start_back > values.len() || end_back >= start_back {
        return None;
    }
    let len = values.len();
    Some(&values[len - start_back..len - end_back])
}

/// Percentage change from `past` to `now` with `epsilon` added to the denominator.
pub fn pct_change(now: f64, past: f64, epsilon: f64) -> f64 {
    (now - past) / (past + epsilon) * 100.0
}

/// Percentage change of the latest close against the close `period` bars back
/// (`period = 1` compares the latest close with itself). Returns 0 when the
/// series is shorter than `period` or the past close is zero.
pub fn price_change(closes: &[f64], period: usize) -> f64 {
    let (Some(now), Some(past)) = (from_end(closes, 1), from_end(closes, period)) else {
        return 0.0;
    };
    if past == 0.0 {
        return 0.0;
    }
    (now - past) / past * 100.0
}

/// Mean of the last `recent` values over the mean of the `baseline` values before them.
pub fn volume_ratio(volumes: &[f64], baseline: usize, recent: usize) -> Option<f64> {
    let baseline_mean = mean(span_from_end(volumes, baseline + recent, recent)?)?;
    let recent_mean = mean(span_from_end(volumes, recent, 0)?)?;
    Some(recent_mean / (baseline_mean + PRICE_EPSILON))
}

/// Sum of the last `bars` volumes against the sum of the `bars` before them, in percent.
pub fn volume_change(volumes: &[f64], bars: usize) -> Option<f64> {
    let now: f64 = span_from_end(volumes, bars, 0)?.iter().sum();
    let prev: f64 = span_from_end(volumes, bars * 2, bars)?.iter().sum();
    Some(pct_change(now, prev, OSCILLATOR_EPSILON))
}

/// Highest value in `[len - start_back, len - end_back)`.
pub fn highest(values: &[f64], start_back: usize, end_back: usize) -> Option<f64> {
    max(span_from_end(values, start_back, end_back)?)
}

/// RSI over the last `period` close deltas using simple means of gains and losses.
///
/// RSI = 100 - 100 / (1 + RS), RS = mean gain / (mean loss + epsilon)
pub fn rsi(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }

    let deltas = &closes[closes.len() - period - 1..];
    let (mut gains, mut losses) = (0.0, 0.0);
    for pair in deltas.windows(2) {
        let change = pair[1] - pair[0];
        if change > 0.0 {
            gains += change;
        } else {
            losses -= change;
        }
    }

    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;
    let rs = avg_gain / (avg_loss + OSCILLATOR_EPSILON);
    Some(100.0 - (100.0 / (1.0 + rs)))
}

/// On-balance volume series, starting at 0 for the first bar.
pub fn obv(closes: &[f64], volumes: &[f64]) -> Vec<f64> {
    let mut series = Vec::with_capacity(closes.len());
    if closes.is_empty() {
        return series;
    }
    series.push(0.0);
    for i in 1..closes.len().min(volumes.len()) {
        let prev = series[i - 1];
        let next = if closes[i] > closes[i - 1] {
            prev + volumes[i]
        } else if closes[i] < closes[i - 1] {
            prev - volumes[i]
        } else {
            prev
        };
        series.push(next);
    }
    series
}

/// OBV now is above OBV `bars` bars earlier.
pub fn obv_trend_up(closes: &[f64], volumes: &[f64], bars: usize) -> Option<bool> {
    let series = obv(closes, volumes);
    Some(from_end(&series, 1)? > from_end(&series, bars + 1)?)
}

/// Williams %R at the latest bar over the last `period` bars.
pub fn williams_r(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Option<f64> {
    let highest_high = max(span_from_end(highs, period, 0)?)?;
    let lowest_low = min(span_from_end(lows, period, 0)?)?;
    let close = from_end(closes, 1)?;
    Some(-100.0 * (highest_high - close) / (highest_high - lowest_low + OSCILLATOR_EPSILON))
}

/// Simple moving average of the last `period` values.
pub fn sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 {
        return None;
    }
    mean(span_from_end(values, period, 0)?)
}

/// Last `bars` values are strictly increasing.
pub fn strictly_rising(values: &[f64], bars: usize) -> Option<bool> {
    let tail = span_from_end(values, bars, 0)?;
    Some(tail.windows(2).all(|pair| pair[1] > pair[0]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_end_and_spans() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(from_end(&values, 1), Some(5.0));
        assert_eq!(from_end(&values, 5), Some(1.0));
        assert_eq!(from_end(&values, 6), None);
        assert_eq!(from_end(&values, 0), None);
        assert_eq!(span_from_end(&values, 3, 1), Some(&values[2..4]));
        assert_eq!(span_from_end(&values, 6, 0), None);
        assert_eq!(span_from_end(&values, 2, 2), None);
    }

    #[test]
    fn test_price_change_guards() {
        assert_eq!(price_change(&[100.0, 110.0], 2), 10.0);
        assert_eq!(price_change(&[100.0], 2), 0.0);
        assert_eq!(price_change(&[0.0, 110.0], 2), 0.0);
    }

    #[test]
    fn test_volume_ratio() {
        let mut volumes = vec![100.0; 10];
        volumes.extend([300.0, 400.0, 500.0]);
        let ratio = volume_ratio(&volumes, 10, 3).unwrap();
        assert!((ratio - 4.0).abs() < 1e-9);
        assert!(volume_ratio(&volumes[..12], 10, 3).is_none());
    }

    #[test]
    fn test_rsi_all_gains_and_all_losses() {
        let rising: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        assert!(rsi(&rising, 14).unwrap() > 99.0);

        let falling: Vec<f64> = (0..15).map(|i| 100.0 - i as f64).collect();
        assert!(rsi(&falling, 14).unwrap() < 1.0);

        assert!(rsi(&rising[..14], 14).is_none());
    }

    #[test]
    fn test_rsi_flat_is_finite() {
        let flat = vec![100.0; 20];
        let value = rsi(&flat, 14).unwrap();
        assert!(value.is_finite());
        assert_eq!(value, 0.0);
    }

    #[test]
    fn test_obv_series() {
        let closes = [1.0, 2.0, 2.0, 1.5, 3.0];
        let volumes = [10.0, 20.0, 30.0, 40.0, 50.0];
        assert_eq!(obv(&closes, &volumes), vec![0.0, 20.0, 20.0, -20.0, 30.0]);
        assert_eq!(obv_trend_up(&closes, &volumes, 4), Some(true));
        assert_eq!(obv_trend_up(&closes, &volumes, 5), None);
    }

    #[test]
    fn test_williams_r() {
        let highs = [10.0, 12.0, 14.0, 13.0, 15.0];
        let lows = [8.0, 9.0, 10.0, 11.0, 10.0];
        let closes = [9.0, 11.0, 13.0, 12.0, 14.0];
        let value = williams_r(&highs, &lows, &closes, 5).unwrap();
        assert!((value - (-100.0 / 7.0)).abs() < 1e-6);
    }

    #[test]
    fn test_sma_and_rising() {
        assert_eq!(sma(&[1.0, 2.0, 3.0, 4.0], 2), Some(3.5));
        assert_eq!(sma(&[1.0], 2), None);
        assert_eq!(strictly_rising(&[1.0, 2.0, 3.0], 3), Some(true));
        assert_eq!(strictly_rising(&[1.0, 3.0, 3.0], 3), Some(false));
    }
}
