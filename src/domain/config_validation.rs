//! Metrics settings from the `[metrics]` config section.
//!
//! Missing keys fall back to `MetricsConfig::default()`; present but invalid
//! values are errors.

use crate::domain::error::TradecoreError;
use crate::domain::metrics::{EquityPoint, MetricsConfig};
use crate::ports::config_port::ConfigPort;

const SECTION: &str = "metrics";

fn invalid(key: &str, reason: &str) -> TradecoreError {
    TradecoreError::ConfigInvalid {
        section: SECTION.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

pub fn build_metrics_config(config: &dyn ConfigPort) -> Result<MetricsConfig, TradecoreError> {
    let defaults = MetricsConfig::default();

    let risk_free_rate = config.get_f64(SECTION, "risk_free_rate")?.unwrap_or(defaults.risk_free_rate);
    if !(0.0..1.0).contains(&risk_free_rate) {
        return Err(invalid("risk_free_rate", "risk_free_rate must be between 0 and 1"));
    }

    let trading_days_per_year = config.get_f64(SECTION, "trading_days_per_year")?.unwrap_or(defaults.trading_days_per_year);
    if !(trading_days_per_year.is_finite() && trading_days_per_year > 0.0) {
        return Err(invalid("trading_days_per_year", "trading_days_per_year must be positive"));
    }

    let profit_factor_cap = config.get_f64(SECTION, "profit_factor_cap")?.unwrap_or(defaults.profit_factor_cap);
    if !(profit_factor_cap.is_finite() && profit_factor_cap > 0.0) {
        return Err(invalid("profit_factor_cap", "profit_factor_cap must be positive"));
    }

    Ok(MetricsConfig {
        trading_days_per_year,
        risk_free_rate,
        profit_factor_cap,
    })
}

/// Initial capital from the command line, then `[metrics] initial_capital`,
/// then the first equity point.
pub fn resolve_initial_capital(
    override_value: Option<f64>,
    config: Option<&dyn ConfigPort>,
    equity_curve: &[EquityPoint],
) -> Result<f64, TradecoreError> {
    let from_config = match config {
        Some(c) => c.get_f64(SECTION, "initial_capital")?,
        None => None,
    };

    let value = override_value
        .or(from_config)
        .or_else(|| equity_curve.first().map(|p| p.value))
        .ok_or_else(|| TradecoreError::ConfigMissing {
            section: SECTION.to_string(),
            key: "initial_capital".to_string(),
        })?;

    if !(value.is_finite() && value > 0.0) {
        return Err(invalid("initial_capital", "initial_capital must be positive"));
    }
    Ok(value)
}
