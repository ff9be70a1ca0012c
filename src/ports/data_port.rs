//! Data access port traits: candles in, trade logs and equity curves for metrics.

use crate::domain::candle::Candle;
use crate::domain::error::TradecoreError;
use crate::domain::metrics::EquityPoint;
use crate::domain::position::RoundTripTrade;

pub trait DataPort {
    /// Candles for `symbol`, sorted by timestamp.
    fn fetch_candles(&self, symbol: &str) -> Result<Vec<Candle>, TradecoreError>;

    fn list_symbols(&self) -> Result<Vec<String>, TradecoreError>;
}

/// Source of backtest output produced by an external runner.
pub trait BacktestLogPort {
    fn load_trades(&self) -> Result<Vec<RoundTripTrade>, TradecoreError>;

    fn load_equity_curve(&self) -> Result<Vec<EquityPoint>, TradecoreError>;
}
