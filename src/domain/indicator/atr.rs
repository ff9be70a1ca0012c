//! Average True Range.
//!
//! TR[0] = high - low, TR[i] = max(high - low, |high - prev_close|, |low - prev_close|).
//! Seed with the mean of the first n true ranges, then Wilder smoothing:
//! ATR[i] = (ATR[i-1] * (n-1) + TR[i]) / n.
//! Warmup: first (n-1) bars are `None`.

use super::Series;
use crate::domain::candle::Candle;

pub fn atr(candles: &[Candle], period: usize) -> Series {
    if period == 0 {
        return vec![None; candles.len()];
    }

    let tr_values: Vec<f64> = candles
        .iter()
        .enumerate()
        .map(|(i, candle)| {
            if i == 0 {
                candle.high - candle.low
            } else {
                candle.true_range(candles[i - 1].close)
            }
        })
        .collect();

    let mut out = Vec::with_capacity(candles.len());
    let mut prev_atr = 0.0;

    for i in 0..candles.len() {
        if i + 1 < period {
            out.push(None);
        } else if i + 1 == period {
            prev_atr = tr_values[..=i].iter().sum::<f64>() / period as f64;
            out.push(Some(prev_atr));
        } else {
            prev_atr = (prev_atr * (period - 1) as f64 + tr_values[i]) / period as f64;
            out.push(Some(prev_atr));
        }
    }

    out
}
