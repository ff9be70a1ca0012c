//! Pure numeric core: indicators, conditions, signals, order math and metrics.

pub mod candle;
pub mod condition;
pub mod condition_eval;
pub mod config_validation;
pub mod drawdown;
pub mod error;
pub mod execution;
pub mod indicator;
pub mod metrics;
pub mod position;
pub mod signal;
pub mod strategy;
pub mod validation;
