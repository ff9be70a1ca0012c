//! Running-peak drawdown tracking over an equity curve.
//!
//! Drawdown at point `i` is `(peak - value) / peak` where `peak` is the
//! highest value seen at or before `i`. Values are fractions in `[0, 1]`
//! for positive equity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::metrics::EquityPoint;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawdownPoint {
    pub timestamp: DateTime<Utc>,
    pub peak: f64,
    pub drawdown: f64,
}

/// One peak-to-recovery episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawdownRecord {
    /// Timestamp of the peak the decline started from.
    pub start: DateTime<Utc>,
    pub trough: DateTime<Utc>,
    /// First point back at or above the peak; `None` while unrecovered.
    pub end: Option<DateTime<Utc>>,
    pub peak_value: f64,
    pub trough_value: f64,
    pub depth: f64,
    /// Number of points spent below the peak.
    pub duration: usize,
}

impl DrawdownRecord {
    pub fn recovered(&self) -> bool {
        self.end.is_some()
    }
}

fn drawdown_from(peak: f64, value: f64) -> f64 {
    if peak <= 0.0 {
        return 0.0;
    }
    ((peak - value) / peak).max(0.0)
}

pub fn calculate_drawdown_series(equity_curve: &[EquityPoint]) -> Vec<DrawdownPoint> {
    let Some(first) = equity_curve.first() else {
        return Vec::new();
    };
    let mut peak = first.value;
    equity_curve
        .iter()
        .map(|point| {
            if point.value > peak {
                peak = point.value;
            }
            DrawdownPoint {
                timestamp: point.timestamp,
                peak,
                drawdown: drawdown_from(peak, point.value),
            }
        })
        .collect()
}

pub fn calculate_max_drawdown(equity_curve: &[EquityPoint]) -> f64 {
    calculate_drawdown_series(equity_curve)
        .iter()
        .map(|p| p.drawdown)
        .fold(0.0, f64::max)
}

/// Mean depth of the distinct drawdown episodes; 0 when there are none.
pub fn calculate_avg_drawdown(equity_curve: &[EquityPoint]) -> f64 {
    let records = extract_drawdown_records(equity_curve);
    if records.is_empty() {
        return 0.0;
    }
    records.iter().map(|r| r.depth).sum::<f64>() / records.len() as f64
}

/// Longest stretch, in points, spent below a prior peak.
pub fn calculate_max_drawdown_duration(equity_curve: &[EquityPoint]) -> usize {
    extract_drawdown_records(equity_curve)
        .iter()
        .map(|r| r.duration)
        .max()
        .unwrap_or(0)
}

pub fn extract_drawdown_records(equity_curve: &[EquityPoint]) -> Vec<DrawdownRecord> {
    let mut records = Vec::new();
    let Some(first) = equity_curve.first() else {
        return records;
    };

    let mut peak = first.value;
    let mut peak_time = first.timestamp;
    let mut current: Option<DrawdownRecord> = None;

    for point in equity_curve {
        if point.value >= peak {
            if let Some(mut record) = current.take() {
                record.end = Some(point.timestamp);
                records.push(record);
            }
            peak = point.value;
            peak_time = point.timestamp;
            continue;
        }

        let depth = drawdown_from(peak, point.value);
        let record = current.get_or_insert_with(|| DrawdownRecord {
            start: peak_time,
            trough: point.timestamp,
            end: None,
            peak_value: peak,
            trough_value: point.value,
            depth,
            duration: 0,
        });
        record.duration += 1;
        if point.value < record.trough_value {
            record.trough = point.timestamp;
            record.trough_value = point.value;
            record.depth = depth;
        }
    }

    if let Some(record) = current {
        records.push(record);
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone};

    fn curve(values: &[f64]) -> Vec<EquityPoint> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| EquityPoint {
                timestamp: start + Duration::days(i as i64),
                value,
            })
            .collect()
    }

    #[test]
    fn max_drawdown_fixture() {
        let equity = curve(&[100.0, 120.0, 90.0, 130.0, 80.0, 150.0]);
        assert_relative_eq!(calculate_max_drawdown(&equity), 50.0 / 130.0);
    }

    #[test]
    fn series_tracks_running_peak() {
        let series = calculate_drawdown_series(&curve(&[100.0, 120.0, 90.0, 130.0]));
        let dd: Vec<f64> = series.iter().map(|p| p.drawdown).collect();
        assert_eq!(dd[0], 0.0);
        assert_eq!(dd[1], 0.0);
        assert_relative_eq!(dd[2], 0.25);
        assert_eq!(dd[3], 0.0);
        assert_eq!(series[2].peak, 120.0);
    }

    #[test]
    fn empty_curve() {
        assert!(calculate_drawdown_series(&[]).is_empty());
        assert_eq!(calculate_max_drawdown(&[]), 0.0);
        assert_eq!(calculate_avg_drawdown(&[]), 0.0);
        assert!(extract_drawdown_records(&[]).is_empty());
    }

    #[test]
    fn monotonic_curve_has_no_drawdown() {
        let equity = curve(&[100.0, 101.0, 101.0, 105.0]);
        assert_eq!(calculate_max_drawdown(&equity), 0.0);
        assert!(extract_drawdown_records(&equity).is_empty());
    }

    #[test]
    fn records_capture_each_episode() {
        let equity = curve(&[100.0, 120.0, 90.0, 130.0, 80.0, 150.0]);
        let records = extract_drawdown_records(&equity);
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].start, equity[1].timestamp);
        assert_eq!(records[0].trough, equity[2].timestamp);
        assert_eq!(records[0].end, Some(equity[3].timestamp));
        assert_relative_eq!(records[0].depth, 0.25);
        assert_eq!(records[0].duration, 1);

        assert_eq!(records[1].peak_value, 130.0);
        assert_eq!(records[1].trough_value, 80.0);
        assert!(records[1].recovered());

        assert_relative_eq!(calculate_avg_drawdown(&equity), (0.25 + 50.0 / 130.0) / 2.0);
    }

    #[test]
    fn unrecovered_drawdown_stays_open() {
        let equity = curve(&[100.0, 110.0, 100.0, 90.0, 85.0, 95.0]);
        let records = extract_drawdown_records(&equity);
        assert_eq!(records.len(), 1);
        assert!(!records[0].recovered());
        assert_eq!(records[0].duration, 4);
        assert_eq!(records[0].trough_value, 85.0);
        assert_eq!(calculate_max_drawdown_duration(&equity), 4);
    }

    #[test]
    fn zero_peak_does_not_divide() {
        let equity = curve(&[0.0, 0.0, -5.0]);
        assert!(calculate_drawdown_series(&equity).iter().all(|p| p.drawdown == 0.0));
    }
}
