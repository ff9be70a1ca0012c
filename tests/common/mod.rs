#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
pub use tradecore::domain::candle::Candle;
use tradecore::domain::error::TradecoreError;
use tradecore::domain::metrics::EquityPoint;
use tradecore::domain::position::{PositionSide, RoundTripTrade};
use tradecore::ports::data_port::DataPort;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Candle>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_candles(mut self, symbol: &str, candles: Vec<Candle>) -> Self {
        self.data.insert(symbol.to_string(), candles);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_candles(&self, symbol: &str) -> Result<Vec<Candle>, TradecoreError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(TradecoreError::Data {
                source_name: "mock".to_string(),
                reason: reason.clone(),
            });
        }
        self.data
            .get(symbol)
            .cloned()
            .ok_or_else(|| TradecoreError::NoData {
                symbol: symbol.to_string(),
            })
    }

    fn list_symbols(&self) -> Result<Vec<String>, TradecoreError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

pub fn make_candle(day: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Candle {
    Candle {
        timestamp: start_time() + Duration::days(day),
        open,
        high,
        low,
        close,
        volume,
    }
}

/// Flat candles (open = high = low = close), one per day.
pub fn make_candles(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_candle(i as i64, c, c, c, c, 1000.0))
        .collect()
}

/// Candles with a high/low range of 1% around each close.
pub fn make_ranged_candles(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_candle(i as i64, c, c * 1.01, c * 0.99, c, 1000.0 + i as f64))
        .collect()
}

pub fn make_equity_curve(values: &[f64]) -> Vec<EquityPoint> {
    values
        .iter()
        .enumerate()
        .map(|(i, &value)| EquityPoint {
            timestamp: start_time() + Duration::days(i as i64),
            value,
        })
        .collect()
}

/// A long trade held for one day per position in the list.
pub fn make_trade(index: i64, pnl: f64) -> RoundTripTrade {
    let entry_time = start_time() + Duration::days(index);
    RoundTripTrade {
        side: PositionSide::Long,
        entry_price: 100.0,
        exit_price: 100.0 + pnl / 10.0,
        quantity: 10.0,
        entry_time,
        exit_time: entry_time + Duration::days(1),
        pnl,
    }
}

pub fn make_trades(pnls: &[f64]) -> Vec<RoundTripTrade> {
    pnls.iter()
        .enumerate()
        .map(|(i, &pnl)| make_trade(i as i64 * 2, pnl))
        .collect()
}

pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

/// Render candles in the CSV layout `CsvAdapter` reads.
pub fn candles_csv(candles: &[Candle]) -> String {
    let mut out = String::from("timestamp,open,high,low,close,volume\n");
    for c in candles {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            c.timestamp.format("%Y-%m-%d"),
            c.open,
            c.high,
            c.low,
            c.close,
            c.volume
        ));
    }
    out
}

pub fn equity_csv(values: &[f64]) -> String {
    let mut out = String::from("timestamp,value\n");
    for p in make_equity_curve(values) {
        out.push_str(&format!("{},{}\n", p.timestamp.format("%Y-%m-%d"), p.value));
    }
    out
}

pub fn trades_csv(pnls: &[f64]) -> String {
    let mut out = String::from("side,entry_price,exit_price,quantity,entry_time,exit_time,pnl\n");
    for t in make_trades(pnls) {
        out.push_str(&format!(
            "long,{},{},{},{},{},{}\n",
            t.entry_price,
            t.exit_price,
            t.quantity,
            t.entry_time.format("%Y-%m-%d"),
            t.exit_time.format("%Y-%m-%d"),
            t.pnl
        ));
    }
    out
}

pub const RSI_STRATEGY: &str = r#"{
    "name": "RSI reversal",
    "entryConditions": {"logic": "and", "conditions": [
        {"left": {"type": "rsi", "period": 3}, "operator": "lt", "right": 30}
    ]},
    "exitConditions": {"logic": "or", "conditions": [
        {"left": {"type": "rsi", "period": 3}, "operator": "gt", "right": 70}
    ]},
    "positionSizing": {"type": "fixed_percent", "percent": 10},
    "riskManagement": {"stopLossPercent": 5}
}"#;
