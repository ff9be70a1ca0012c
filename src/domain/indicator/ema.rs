//! Exponential Moving Average.
//!
//! k = 2/(n+1), seed with first SMA, then EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! Warmup: first (n-1) bars are `None`.

use super::Series;

pub fn ema(values: &[f64], period: usize) -> Series {
    if period == 0 || values.is_empty() {
        return vec![None; values.len()];
    }

    let mut out = Vec::with_capacity(values.len());
    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = 0.0;
    let mut sum = 0.0;

    for (i, &v) in values.iter().enumerate() {
        if i < period - 1 {
            sum += v;
            out.push(None);
        } else if i == period - 1 {
            sum += v;
            ema = sum / period as f64;
            out.push(Some(ema));
        } else {
            ema = v * k + ema * (1.0 - k);
            out.push(Some(ema));
        }
    }

    out
}

/// EMA over a series that starts with a run of `None` warmup entries.
///
/// The leading `None`s are carried through and the EMA is seeded from the
/// first `period` defined values. A `None` after the first defined value
/// breaks the series from that point on.
pub fn ema_of_series(series: &[Option<f64>], period: usize) -> Series {
    let offset = match series.iter().position(Option::is_some) {
        Some(offset) => offset,
        None => return vec![None; series.len()],
    };

    let defined: Vec<f64> = series[offset..].iter().map_while(|v| *v).collect();
    let mut out = vec![None; offset];
    out.extend(ema(&defined, period));
    out.resize(series.len(), None);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_warmup() {
        let series = ema(&[10.0, 20.0, 30.0, 40.0, 50.0], 3);
        assert!(series[0].is_none());
        assert!(series[1].is_none());
        assert!(series[2].is_some());
        assert!(series[3].is_some());
        assert!(series[4].is_some());
    }

    #[test]
    fn ema_period_1() {
        let series = ema(&[10.0, 20.0, 30.0], 1);
        assert_eq!(series, vec![Some(10.0), Some(20.0), Some(30.0)]);
    }

    #[test]
    fn ema_seed_is_sma() {
        let series = ema(&[10.0, 20.0, 30.0], 3);
        let expected_sma = (10.0 + 20.0 + 30.0) / 3.0;
        assert!((series[2].unwrap() - expected_sma).abs() < f64::EPSILON);
    }

    #[test]
    fn ema_recursive_calculation() {
        let series = ema(&[10.0, 20.0, 30.0, 40.0, 50.0], 3);

        let k = 2.0 / 4.0;
        let sma = (10.0 + 20.0 + 30.0) / 3.0;
        assert!((series[2].unwrap() - sma).abs() < f64::EPSILON);

        let ema_3 = 40.0 * k + sma * (1.0 - k);
        assert!((series[3].unwrap() - ema_3).abs() < f64::EPSILON);

        let ema_4 = 50.0 * k + ema_3 * (1.0 - k);
        assert!((series[4].unwrap() - ema_4).abs() < f64::EPSILON);
    }

    #[test]
    fn ema_equal_prices() {
        let series = ema(&[100.0; 5], 3);
        for v in series.iter().skip(2) {
            assert!((v.unwrap() - 100.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn ema_empty_and_zero_period() {
        assert!(ema(&[], 3).is_empty());
        assert_eq!(ema(&[10.0, 20.0], 0), vec![None, None]);
    }

    #[test]
    fn ema_of_series_skips_leading_none() {
        let input = vec![None, None, Some(10.0), Some(20.0), Some(30.0), Some(40.0)];
        let out = ema_of_series(&input, 2);
        assert_eq!(out.len(), 6);
        assert!(out[..3].iter().all(Option::is_none));
        assert_eq!(out[3], Some(15.0));
        // k = 2/3
        let expected = 30.0 * (2.0 / 3.0) + 15.0 * (1.0 / 3.0);
        assert!((out[4].unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn ema_of_series_all_none() {
        assert_eq!(ema_of_series(&[None, None], 3), vec![None, None]);
    }
}
