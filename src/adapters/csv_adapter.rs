//! CSV file adapters: candle files per symbol, trade logs and equity curves.
//!
//! Timestamps are accepted as RFC 3339 or plain `YYYY-MM-DD` (midnight UTC).

use crate::domain::candle::Candle;
use crate::domain::error::TradecoreError;
use crate::domain::metrics::EquityPoint;
use crate::domain::position::{calculate_pnl, PositionSide, RoundTripTrade};
use crate::ports::data_port::{BacktestLogPort, DataPort};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn data_error(path: &Path, reason: impl Into<String>) -> TradecoreError {
    TradecoreError::Data {
        source_name: path.display().to_string(),
        reason: reason.into(),
    }
}

fn read_file(path: &Path) -> Result<String, TradecoreError> {
    fs::read_to_string(path).map_err(|e| data_error(path, format!("failed to read: {}", e)))
}

fn timestamp_field(path: &Path, row: usize, value: &str) -> Result<DateTime<Utc>, TradecoreError> {
    parse_timestamp(value).ok_or_else(|| data_error(path, format!("row {}: invalid timestamp '{}'", row, value)))
}

#[derive(Debug, Deserialize)]
struct CandleRow {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

/// Reads `<symbol>.csv` files from one directory.
pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

/// Parse candle CSV text. Rows are sorted by timestamp.
pub fn read_candles(path: &Path) -> Result<Vec<Candle>, TradecoreError> {
    let content = read_file(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());
    let mut candles = Vec::new();

    for (i, result) in rdr.deserialize::<CandleRow>().enumerate() {
        let row = result.map_err(|e| data_error(path, format!("CSV parse error: {}", e)))?;
        candles.push(Candle {
            timestamp: timestamp_field(path, i + 1, &row.timestamp)?,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        });
    }

    candles.sort_by_key(|c| c.timestamp);
    debug!(path = %path.display(), count = candles.len(), "loaded candles");
    Ok(candles)
}

impl DataPort for CsvAdapter {
    fn fetch_candles(&self, symbol: &str) -> Result<Vec<Candle>, TradecoreError> {
        let path = self.csv_path(symbol);
        if !path.exists() {
            return Err(TradecoreError::NoData {
                symbol: symbol.to_string(),
            });
        }
        read_candles(&path)
    }

    fn list_symbols(&self) -> Result<Vec<String>, TradecoreError> {
        let entries = fs::read_dir(&self.base_path)
            .map_err(|e| data_error(&self.base_path, format!("failed to read directory: {}", e)))?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| data_error(&self.base_path, format!("directory entry error: {}", e)))?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(symbol) = name_str.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}

#[derive(Debug, Deserialize)]
struct TradeRow {
    #[serde(default)]
    side: Option<PositionSide>,
    entry_price: f64,
    exit_price: f64,
    quantity: f64,
    entry_time: String,
    exit_time: String,
    #[serde(default)]
    pnl: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct EquityRow {
    timestamp: String,
    value: f64,
}

/// Trade log and equity curve CSV files written by a backtest runner.
///
/// Trade columns: `side,entry_price,exit_price,quantity,entry_time,exit_time,pnl`.
/// `side` defaults to long and a missing `pnl` is derived from the prices.
/// Equity columns: `timestamp,value`.
pub struct CsvBacktestLog {
    trades_path: Option<PathBuf>,
    equity_path: PathBuf,
}

impl CsvBacktestLog {
    pub fn new(equity_path: PathBuf, trades_path: Option<PathBuf>) -> Self {
        Self {
            trades_path,
            equity_path,
        }
    }
}

impl BacktestLogPort for CsvBacktestLog {
    fn load_trades(&self) -> Result<Vec<RoundTripTrade>, TradecoreError> {
        let Some(path) = &self.trades_path else {
            return Ok(Vec::new());
        };
        let content = read_file(path)?;
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let mut trades = Vec::new();

        for (i, result) in rdr.deserialize::<TradeRow>().enumerate() {
            let row = result.map_err(|e| data_error(path, format!("CSV parse error: {}", e)))?;
            let side = row.side.unwrap_or_default();
            let entry_time = timestamp_field(path, i + 1, &row.entry_time)?;
            let exit_time = timestamp_field(path, i + 1, &row.exit_time)?;
            if exit_time < entry_time {
                return Err(data_error(path, format!("row {}: exit_time before entry_time", i + 1)));
            }
            trades.push(RoundTripTrade {
                side,
                entry_price: row.entry_price,
                exit_price: row.exit_price,
                quantity: row.quantity,
                entry_time,
                exit_time,
                pnl: row
                    .pnl
                    .unwrap_or_else(|| calculate_pnl(row.entry_price, row.exit_price, row.quantity, side)),
            });
        }

        debug!(path = %path.display(), count = trades.len(), "loaded trades");
        Ok(trades)
    }

    fn load_equity_curve(&self) -> Result<Vec<EquityPoint>, TradecoreError> {
        let path = &self.equity_path;
        let content = read_file(path)?;
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let mut curve = Vec::new();

        for (i, result) in rdr.deserialize::<EquityRow>().enumerate() {
            let row = result.map_err(|e| data_error(path, format!("CSV parse error: {}", e)))?;
            curve.push(EquityPoint {
                timestamp: timestamp_field(path, i + 1, &row.timestamp)?,
                value: row.value,
            });
        }

        curve.sort_by_key(|p| p.timestamp);
        debug!(path = %path.display(), count = curve.len(), "loaded equity curve");
        Ok(curve)
    }
}
