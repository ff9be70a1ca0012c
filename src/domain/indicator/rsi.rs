//! RSI (Relative Strength Index).
//!
//! Uses Wilder's smoothing for average gain/loss calculation:
//! - First average: simple mean of gains/losses over first n changes
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100, unless avg_gain is also 0 (flat window), then 50.
//!
//! Warmup: first n bars are `None` (need n price changes for the initial average).

use super::Series;

/// RSI reported when there is no movement or no history to judge.
pub const NEUTRAL_RSI: f64 = 50.0;

pub fn rsi(values: &[f64], period: usize) -> Series {
    if period == 0 || values.len() < 2 {
        return vec![None; values.len()];
    }

    let mut out = Vec::with_capacity(values.len());
    out.push(None);

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    let mut gain_sum = 0.0;
    let mut loss_sum = 0.0;

    for i in 1..values.len() {
        let change = values[i] - values[i - 1];
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);
        let change_idx = i - 1;

        if change_idx < period - 1 {
            gain_sum += gain;
            loss_sum += loss;
            out.push(None);
            continue;
        }

        if change_idx == period - 1 {
            avg_gain = (gain_sum + gain) / period as f64;
            avg_loss = (loss_sum + loss) / period as f64;
        } else {
            avg_gain = (avg_gain * (period - 1) as f64 + gain) / period as f64;
            avg_loss = (avg_loss * (period - 1) as f64 + loss) / period as f64;
        }

        out.push(Some(rsi_from_averages(avg_gain, avg_loss)));
    }

    out
}

/// RSI at the last bar of `values`, or [`NEUTRAL_RSI`] when there is not
/// enough history.
pub fn latest_rsi(values: &[f64], period: usize) -> f64 {
    rsi(values, period)
        .last()
        .copied()
        .flatten()
        .unwrap_or(NEUTRAL_RSI)
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 { NEUTRAL_RSI } else { 100.0 }
    } else {
        let rs = avg_gain / avg_loss;
        (100.0 - (100.0 / (1.0 + rs))).clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsi_empty() {
        assert!(rsi(&[], 14).is_empty());
    }

    #[test]
    fn rsi_single_value() {
        assert_eq!(rsi(&[100.0], 14), vec![None]);
    }

    #[test]
    fn rsi_warmup_period() {
        let values: Vec<f64> = (1..=15).map(|i| 100.0 + (i as f64 % 5.0) * 2.0).collect();
        let series = rsi(&values, 14);

        assert_eq!(series.len(), 15);
        for (i, v) in series.iter().enumerate().take(14) {
            assert!(v.is_none(), "bar {} should be undefined", i);
        }
        assert!(series[14].is_some(), "bar 14 should be defined");
    }

    #[test]
    fn rsi_all_gains_no_losses() {
        let values: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        let series = rsi(&values, 14);
        assert!((series[14].unwrap() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rsi_all_losses_no_gains() {
        let values: Vec<f64> = (0..15).map(|i| 100.0 - i as f64).collect();
        let series = rsi(&values, 14);
        assert!(series[14].unwrap().abs() < f64::EPSILON);
    }

    #[test]
    fn rsi_flat_prices_are_neutral() {
        let series = rsi(&[100.0; 20], 14);
        assert_eq!(series[14], Some(NEUTRAL_RSI));
        assert_eq!(series[19], Some(NEUTRAL_RSI));
    }

    #[test]
    fn rsi_in_range() {
        let values: Vec<f64> = (1..=40)
            .map(|i| 100.0 + (i as f64 % 7.0 - 3.0) * 2.0)
            .collect();
        for v in rsi(&values, 14).into_iter().flatten() {
            assert!((0.0..=100.0).contains(&v), "RSI {} out of range", v);
        }
    }

    #[test]
    fn rsi_zero_period() {
        assert_eq!(rsi(&[100.0, 101.0], 0), vec![None, None]);
    }

    #[test]
    fn rsi_known_calculation() {
        // period 2: changes +1, -1, +2
        // seed: gain avg (1+0)/2 = 0.5, loss avg (0+1)/2 = 0.5 -> RSI 50
        // next: gain (0.5*1 + 2)/2 = 1.25, loss (0.5*1 + 0)/2 = 0.25 -> RS 5 -> 83.33
        let series = rsi(&[10.0, 11.0, 10.0, 12.0], 2);
        assert_eq!(series[0], None);
        assert_eq!(series[1], None);
        assert!((series[2].unwrap() - 50.0).abs() < 1e-12);
        assert!((series[3].unwrap() - (100.0 - 100.0 / 6.0)).abs() < 1e-12);
    }

    #[test]
    fn latest_rsi_without_history_is_neutral() {
        assert_eq!(latest_rsi(&[], 14), NEUTRAL_RSI);
        assert_eq!(latest_rsi(&[1.0, 2.0, 3.0], 14), NEUTRAL_RSI);
    }

    #[test]
    fn latest_rsi_returns_last_value() {
        let values: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        assert_eq!(latest_rsi(&values, 14), 100.0);
    }
}
