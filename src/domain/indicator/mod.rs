//! Technical indicator implementations.
//!
//! Every indicator is a pure transform from a price (or candle) slice to a
//! series of the same length. A `None` entry marks a bar without enough
//! history; it is never an error.
//!
//! - `IndicatorConfig`: closed description of one indicator instance
//! - `indicator_values`: dispatch from a config to a single value series

pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod stddev;
pub mod vwap;

pub use atr::atr;
pub use bollinger::{bollinger, BollingerSeries};
pub use ema::{ema, ema_of_series};
pub use macd::{macd, MacdSeries};
pub use rsi::{latest_rsi, rsi};
pub use sma::sma;
pub use stddev::stddev;
pub use vwap::vwap;

use crate::domain::candle::{price_series, Candle, PriceSource};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An indicator value series aligned index-for-index with its input.
pub type Series = Vec<Option<f64>>;

pub const DEFAULT_RSI_PERIOD: usize = 14;
pub const DEFAULT_ATR_PERIOD: usize = 14;
pub const DEFAULT_MACD_FAST: usize = 12;
pub const DEFAULT_MACD_SLOW: usize = 26;
pub const DEFAULT_MACD_SIGNAL: usize = 9;
pub const DEFAULT_BOLLINGER_PERIOD: usize = 20;
pub const DEFAULT_BOLLINGER_MULTIPLIER: f64 = 2.0;

/// Which line of a MACD an indicator reference reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacdOutput {
    #[default]
    Macd,
    Signal,
    Histogram,
}

/// Which band of a Bollinger envelope an indicator reference reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BollingerBand {
    Upper,
    #[default]
    Middle,
    Lower,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IndicatorConfig {
    Price {
        #[serde(default)]
        source: PriceSource,
    },
    Sma {
        period: usize,
        #[serde(default)]
        source: PriceSource,
    },
    Ema {
        period: usize,
        #[serde(default)]
        source: PriceSource,
    },
    Rsi {
        #[serde(default = "default_rsi_period")]
        period: usize,
        #[serde(default)]
        source: PriceSource,
    },
    #[serde(rename_all = "camelCase")]
    Macd {
        #[serde(default = "default_macd_fast")]
        fast: usize,
        #[serde(default = "default_macd_slow")]
        slow: usize,
        #[serde(default = "default_macd_signal")]
        signal: usize,
        #[serde(default)]
        source: PriceSource,
        #[serde(default)]
        output: MacdOutput,
    },
    #[serde(rename_all = "camelCase")]
    Bollinger {
        #[serde(default = "default_bollinger_period")]
        period: usize,
        #[serde(default = "default_bollinger_multiplier")]
        std_dev_multiplier: f64,
        #[serde(default)]
        source: PriceSource,
        #[serde(default)]
        band: BollingerBand,
    },
    Atr {
        #[serde(default = "default_atr_period")]
        period: usize,
    },
    Volume,
    Vwap,
}

fn default_rsi_period() -> usize {
    DEFAULT_RSI_PERIOD
}

fn default_atr_period() -> usize {
    DEFAULT_ATR_PERIOD
}

fn default_macd_fast() -> usize {
    DEFAULT_MACD_FAST
}

fn default_macd_slow() -> usize {
    DEFAULT_MACD_SLOW
}

fn default_macd_signal() -> usize {
    DEFAULT_MACD_SIGNAL
}

fn default_bollinger_period() -> usize {
    DEFAULT_BOLLINGER_PERIOD
}

fn default_bollinger_multiplier() -> f64 {
    DEFAULT_BOLLINGER_MULTIPLIER
}

impl IndicatorConfig {
    pub fn close() -> Self {
        IndicatorConfig::Price {
            source: PriceSource::Close,
        }
    }

    pub fn sma(period: usize) -> Self {
        IndicatorConfig::Sma {
            period,
            source: PriceSource::Close,
        }
    }

    pub fn ema(period: usize) -> Self {
        IndicatorConfig::Ema {
            period,
            source: PriceSource::Close,
        }
    }

    pub fn rsi(period: usize) -> Self {
        IndicatorConfig::Rsi {
            period,
            source: PriceSource::Close,
        }
    }

    /// Number of leading bars for which this indicator yields `None`.
    pub fn warmup(&self) -> usize {
        match self {
            IndicatorConfig::Price { .. } | IndicatorConfig::Volume | IndicatorConfig::Vwap => 0,
            IndicatorConfig::Sma { period, .. }
            | IndicatorConfig::Ema { period, .. }
            | IndicatorConfig::Bollinger { period, .. }
            | IndicatorConfig::Atr { period } => period.saturating_sub(1),
            IndicatorConfig::Rsi { period, .. } => *period,
            IndicatorConfig::Macd {
                fast,
                slow,
                signal,
                output,
                ..
            } => {
                let line = (*fast).max(*slow).saturating_sub(1);
                match output {
                    MacdOutput::Macd => line,
                    MacdOutput::Signal | MacdOutput::Histogram => {
                        line + signal.saturating_sub(1)
                    }
                }
            }
        }
    }
}

/// Compute the value series described by `config` over `candles`.
///
/// Each entry depends only on candles at or before its index.
pub fn indicator_values(candles: &[Candle], config: &IndicatorConfig) -> Series {
    match config {
        IndicatorConfig::Price { source } => candles.iter().map(|c| Some(c.price(*source))).collect(),
        IndicatorConfig::Sma { period, source } => sma(&price_series(candles, *source), *period),
        IndicatorConfig::Ema { period, source } => ema(&price_series(candles, *source), *period),
        IndicatorConfig::Rsi { period, source } => rsi(&price_series(candles, *source), *period),
        IndicatorConfig::Macd {
            fast,
            slow,
            signal,
            source,
            output,
        } => {
            let series = macd(&price_series(candles, *source), *fast, *slow, *signal);
            match output {
                MacdOutput::Macd => series.macd,
                MacdOutput::Signal => series.signal,
                MacdOutput::Histogram => series.histogram,
            }
        }
        IndicatorConfig::Bollinger {
            period,
            std_dev_multiplier,
            source,
            band,
        } => {
            let series = bollinger(&price_series(candles, *source), *period, *std_dev_multiplier);
            match band {
                BollingerBand::Upper => series.upper,
                BollingerBand::Middle => series.middle,
                BollingerBand::Lower => series.lower,
            }
        }
        IndicatorConfig::Atr { period } => atr(candles, *period),
        IndicatorConfig::Volume => candles.iter().map(|c| Some(c.volume)).collect(),
        IndicatorConfig::Vwap => vwap(candles),
    }
}

/// Value of `config` at `index`, computed from `candles[..=index]` only.
pub fn indicator_value_at(candles: &[Candle], config: &IndicatorConfig, index: usize) -> Option<f64> {
    if index >= candles.len() {
        return None;
    }
    indicator_values(&candles[..=index], config)
        .get(index)
        .copied()
        .flatten()
        .filter(|v| v.is_finite())
}

impl fmt::Display for IndicatorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorConfig::Price { source } => write!(f, "{}", source_name(*source)),
            IndicatorConfig::Sma { period, .. } => write!(f, "SMA({})", period),
            IndicatorConfig::Ema { period, .. } => write!(f, "EMA({})", period),
            IndicatorConfig::Rsi { period, .. } => write!(f, "RSI({})", period),
            IndicatorConfig::Macd {
                fast,
                slow,
                signal,
                output,
                ..
            } => {
                let line = match output {
                    MacdOutput::Macd => "macd",
                    MacdOutput::Signal => "signal",
                    MacdOutput::Histogram => "histogram",
                };
                write!(f, "MACD({},{},{}).{}", fast, slow, signal, line)
            }
            IndicatorConfig::Bollinger {
                period,
                std_dev_multiplier,
                band,
                ..
            } => {
                let band = match band {
                    BollingerBand::Upper => "upper",
                    BollingerBand::Middle => "middle",
                    BollingerBand::Lower => "lower",
                };
                write!(f, "BOLLINGER({},{}).{}", period, std_dev_multiplier, band)
            }
            IndicatorConfig::Atr { period } => write!(f, "ATR({})", period),
            IndicatorConfig::Volume => write!(f, "VOLUME"),
            IndicatorConfig::Vwap => write!(f, "VWAP"),
        }
    }
}

fn source_name(source: PriceSource) -> &'static str {
    match source {
        PriceSource::Open => "OPEN",
        PriceSource::High => "HIGH",
        PriceSource::Low => "LOW",
        PriceSource::Close => "CLOSE",
    }
}
