//! Fill simulation: slippage and commissions.
//!
//! Slippage always moves the fill against the trader. Buys (long entries,
//! short exits) fill higher, sells (long exits, short entries) fill lower.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::position::PositionSide;

/// Which leg of a round trip is being filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillKind {
    Entry,
    Exit,
}

fn is_buy(side: PositionSide, fill: FillKind) -> bool {
    matches!(
        (side, fill),
        (PositionSide::Long, FillKind::Entry) | (PositionSide::Short, FillKind::Exit)
    )
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum SlippageConfig {
    #[default]
    None,
    Fixed {
        percent: f64,
    },
    /// Uniform in `[0, max_percent]` per fill.
    Random {
        #[serde(rename = "maxPercent")]
        max_percent: f64,
    },
}

/// Apply `slippage_percent` adversely to `price`.
pub fn calculate_slippage(price: f64, slippage_percent: f64, side: PositionSide, fill: FillKind) -> f64 {
    if is_buy(side, fill) {
        price * (1.0 + slippage_percent / 100.0)
    } else {
        price * (1.0 - slippage_percent / 100.0)
    }
}

/// Apply the configured slippage model. The random model draws from `rng`,
/// so a seeded generator gives reproducible fills.
pub fn simulate_slippage<R: Rng + ?Sized>(
    price: f64,
    config: &SlippageConfig,
    side: PositionSide,
    fill: FillKind,
    rng: &mut R,
) -> f64 {
    let percent = match *config {
        SlippageConfig::None => 0.0,
        SlippageConfig::Fixed { percent } => percent,
        SlippageConfig::Random { max_percent } if max_percent > 0.0 => rng.gen_range(0.0..=max_percent),
        SlippageConfig::Random { .. } => 0.0,
    };
    calculate_slippage(price, percent, side, fill)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionConfig {
    #[serde(default)]
    pub commission_per_trade: f64,
    #[serde(default)]
    pub commission_pct: f64,
    #[serde(default)]
    pub slippage: SlippageConfig,
}

/// Commission: flat fee plus a percentage of the trade value.
pub fn calculate_commission(trade_value: f64, config: &ExecutionConfig) -> f64 {
    config.commission_per_trade + (trade_value.abs() * config.commission_pct / 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fill {
    pub execution_price: f64,
    pub quantity: f64,
    pub value: f64,
    pub commission: f64,
}

/// Simulate one fill of `quantity` units at `market_price`.
pub fn simulate_fill<R: Rng + ?Sized>(
    market_price: f64,
    quantity: f64,
    side: PositionSide,
    fill: FillKind,
    config: &ExecutionConfig,
    rng: &mut R,
) -> Fill {
    let execution_price = simulate_slippage(market_price, &config.slippage, side, fill, rng);
    let value = quantity.abs() * execution_price;
    Fill {
        execution_price,
        quantity,
        value,
        commission: calculate_commission(value, config),
    }
}
