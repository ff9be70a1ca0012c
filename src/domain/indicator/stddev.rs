//! Rolling population standard deviation.
//!
//! STDDEV(n)[i] = sqrt(sum((v[i-j] - SMA(n)[i])^2 for j in 0..n-1) / n)
//! Warmup: first (n-1) bars are `None`.

use super::Series;

pub fn stddev(values: &[f64], period: usize) -> Series {
    (0..values.len())
        .map(|i| window_stats(values, i, period).map(|(_, sd)| sd))
        .collect()
}

/// Mean and population standard deviation of the `period` values ending at `i`.
pub(crate) fn window_stats(values: &[f64], i: usize, period: usize) -> Option<(f64, f64)> {
    if period == 0 || i + 1 < period || i >= values.len() {
        return None;
    }
    let window = &values[i + 1 - period..=i];
    let mean = window.iter().sum::<f64>() / period as f64;
    let variance = window
        .iter()
        .map(|v| {
            let diff = v - mean;
            diff * diff
        })
        .sum::<f64>()
        / period as f64;
    Some((mean, variance.sqrt()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stddev_warmup() {
        let series = stddev(&[10.0, 20.0, 30.0, 40.0, 50.0], 3);
        assert!(series[0].is_none());
        assert!(series[1].is_none());
        assert!(series[2..].iter().all(Option::is_some));
    }

    #[test]
    fn stddev_constant_values() {
        let series = stddev(&[100.0; 5], 3);
        assert!(series[2].unwrap().abs() < f64::EPSILON);
    }

    #[test]
    fn stddev_basic_calculation() {
        let series = stddev(&[10.0, 20.0, 30.0], 3);
        let sma: f64 = 20.0;
        let expected = (((10.0 - sma).powi(2) + (20.0 - sma).powi(2) + (30.0 - sma).powi(2))
            / 3.0)
            .sqrt();
        assert!((series[2].unwrap() - expected).abs() < 1e-10);
    }

    #[test]
    fn stddev_known_values() {
        let series = stddev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0], 8);
        assert!((series[7].unwrap() - 2.0).abs() < 1e-10);
    }

    #[test]
    fn stddev_zero_period() {
        assert_eq!(stddev(&[1.0, 2.0], 0), vec![None, None]);
    }
}
