//! Simple Moving Average.
//!
//! SMA(n)[i] = mean(v[i-n+1..=i]). Warmup: first (n-1) bars are `None`.

use super::Series;

pub fn sma(values: &[f64], period: usize) -> Series {
    if period == 0 {
        return vec![None; values.len()];
    }

    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;

    for (i, &v) in values.iter().enumerate() {
        sum += v;
        if i >= period {
            sum -= values[i - period];
        }
        if i + 1 >= period {
            out.push(Some(sum / period as f64));
        } else {
            out.push(None);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_boundary() {
        let series = sma(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert_eq!(series[0], None);
        assert_eq!(series[1], None);
        assert_eq!(series[2], Some(2.0));
        assert_eq!(series[3], Some(3.0));
        assert_eq!(series[4], Some(4.0));
    }

    #[test]
    fn sma_period_1_is_identity() {
        let series = sma(&[7.0, 8.0, 9.0], 1);
        assert_eq!(series, vec![Some(7.0), Some(8.0), Some(9.0)]);
    }

    #[test]
    fn sma_period_longer_than_input() {
        let series = sma(&[1.0, 2.0], 5);
        assert_eq!(series, vec![None, None]);
    }

    #[test]
    fn sma_period_0() {
        let series = sma(&[1.0, 2.0], 0);
        assert_eq!(series, vec![None, None]);
    }

    #[test]
    fn sma_empty() {
        assert!(sma(&[], 3).is_empty());
    }

    #[test]
    fn sma_rolling_sum_matches_window_mean() {
        let values: Vec<f64> = (0..50).map(|i| (i as f64 * 1.3).cos() * 10.0 + 50.0).collect();
        let series = sma(&values, 7);
        for i in 6..values.len() {
            let expected = values[i - 6..=i].iter().sum::<f64>() / 7.0;
            assert!((series[i].unwrap() - expected).abs() < 1e-9);
        }
    }
}
