//! Cumulative Volume Weighted Average Price.
//!
//! VWAP[i] = sum(typical_price * volume) / sum(volume) over bars 0..=i.
//! `None` while the cumulative volume is still zero.

use super::Series;
use crate::domain::candle::Candle;

pub fn vwap(candles: &[Candle]) -> Series {
    let mut pv_sum = 0.0;
    let mut vol_sum = 0.0;

    candles
        .iter()
        .map(|candle| {
            pv_sum += candle.typical_price() * candle.volume;
            vol_sum += candle.volume;
            (vol_sum > 0.0).then(|| pv_sum / vol_sum)
        })
        .collect()
}
