//! JSON report adapter implementing ReportPort.

use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::domain::error::TradecoreError;
use crate::domain::metrics::PerformanceMetrics;
use crate::ports::report_port::ReportPort;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report<'a> {
    strategy: &'a str,
    metrics: &'a PerformanceMetrics,
}

pub struct JsonReportAdapter {
    pretty: bool,
}

impl JsonReportAdapter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    pub fn render(&self, metrics: &PerformanceMetrics, strategy_name: &str) -> Result<String, TradecoreError> {
        let report = Report {
            strategy: strategy_name,
            metrics,
        };
        let json = if self.pretty {
            serde_json::to_string_pretty(&report)?
        } else {
            serde_json::to_string(&report)?
        };
        Ok(json)
    }
}

impl Default for JsonReportAdapter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ReportPort for JsonReportAdapter {
    fn write(
        &self,
        metrics: &PerformanceMetrics,
        strategy_name: &str,
        output_path: &str,
    ) -> Result<(), TradecoreError> {
        let json = self.render(metrics, strategy_name)?;
        if let Some(parent) = Path::new(output_path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(output_path, json)?;
        info!(path = output_path, "wrote report");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metrics::{calculate_performance_metrics, EquityPoint, MetricsConfig};
    use chrono::{Duration, TimeZone, Utc};
    use tempfile::TempDir;

    fn sample_metrics() -> PerformanceMetrics {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let curve: Vec<EquityPoint> = [100.0, 105.0, 102.0, 110.0]
            .iter()
            .enumerate()
            .map(|(i, &value)| EquityPoint {
                timestamp: start + Duration::days(i as i64),
                value,
            })
            .collect();
        calculate_performance_metrics(100.0, 110.0, &curve, &[], &MetricsConfig::default())
    }

    #[test]
    fn writes_report_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("report.json");
        let adapter = JsonReportAdapter::default();

        adapter
            .write(&sample_metrics(), "demo", path.to_str().unwrap())
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["strategy"], "demo");
        assert!((value["metrics"]["totalReturn"].as_f64().unwrap() - 0.1).abs() < 1e-9);
        assert!(content.contains('\n'));
    }

    #[test]
    fn compact_rendering() {
        let json = JsonReportAdapter::new(false).render(&sample_metrics(), "demo").unwrap();
        assert!(!json.contains('\n'));
    }
}
