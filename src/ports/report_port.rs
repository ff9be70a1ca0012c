//! Report generation port trait.

use crate::domain::error::TradecoreError;
use crate::domain::metrics::PerformanceMetrics;

/// Port for writing performance reports.
pub trait ReportPort {
    fn write(&self, metrics: &PerformanceMetrics, strategy_name: &str, output_path: &str)
        -> Result<(), TradecoreError>;
}
