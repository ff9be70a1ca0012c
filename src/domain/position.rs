//! Position sizing and per-position risk math.
//!
//! All `*_percent` inputs are whole percentages: `5.0` means 5%.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::validation::ValidationResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionSide {
    #[default]
    Long,
    Short,
}

impl PositionSide {
    /// +1 for long, -1 for short.
    pub fn direction(self) -> f64 {
        match self {
            PositionSide::Long => 1.0,
            PositionSide::Short => -1.0,
        }
    }

    /// True when `price` is at or beyond `level` against the position.
    pub fn is_adverse_or_equal(self, price: f64, level: f64) -> bool {
        match self {
            PositionSide::Long => price <= level,
            PositionSide::Short => price >= level,
        }
    }

    /// True when `price` is at or beyond `level` in the position's favour.
    pub fn is_favourable_or_equal(self, price: f64, level: f64) -> bool {
        match self {
            PositionSide::Long => price >= level,
            PositionSide::Short => price <= level,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizingType {
    FixedAmount,
    FixedPercent,
    Kelly,
    RiskBased,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionSizingConfig {
    #[serde(rename = "type")]
    pub sizing_type: SizingType,
    pub amount: Option<f64>,
    pub percent: Option<f64>,
    pub max_risk_percent: Option<f64>,
}

impl PositionSizingConfig {
    pub fn fixed_amount(amount: f64) -> Self {
        PositionSizingConfig {
            sizing_type: SizingType::FixedAmount,
            amount: Some(amount),
            percent: None,
            max_risk_percent: None,
        }
    }

    pub fn fixed_percent(percent: f64) -> Self {
        PositionSizingConfig {
            sizing_type: SizingType::FixedPercent,
            amount: None,
            percent: Some(percent),
            max_risk_percent: None,
        }
    }

    pub fn risk_based(max_risk_percent: f64) -> Self {
        PositionSizingConfig {
            sizing_type: SizingType::RiskBased,
            amount: None,
            percent: None,
            max_risk_percent: Some(max_risk_percent),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskManagementConfig {
    pub stop_loss_percent: Option<f64>,
    pub take_profit_percent: Option<f64>,
    pub trailing_stop_percent: Option<f64>,
    pub max_positions: Option<usize>,
    pub max_capital_usage: Option<f64>,
    pub daily_max_loss: Option<f64>,
}

/// Historical edge used by Kelly sizing. `avg_loss` is a positive magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeStats {
    pub win_rate: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionSize {
    pub quantity: f64,
    pub notional: f64,
}

impl PositionSize {
    fn from_notional(notional: f64, price: f64) -> Self {
        if notional <= 0.0 || !notional.is_finite() {
            return PositionSize::default();
        }
        PositionSize {
            quantity: notional / price,
            notional,
        }
    }
}

/// Size a new position.
///
/// `stop_loss_price` is required by `risk_based`, `stats` by `kelly`; when a
/// required input is missing the size is zero.
pub fn calculate_position_size(
    config: &PositionSizingConfig,
    equity: f64,
    price: f64,
    stop_loss_price: Option<f64>,
    stats: Option<&TradeStats>,
) -> PositionSize {
    if price <= 0.0 || equity <= 0.0 || !price.is_finite() || !equity.is_finite() {
        return PositionSize::default();
    }

    match config.sizing_type {
        SizingType::FixedAmount => PositionSize::from_notional(config.amount.unwrap_or(0.0), price),
        SizingType::FixedPercent => {
            let percent = config.percent.unwrap_or(0.0);
            PositionSize::from_notional(equity * percent / 100.0, price)
        }
        SizingType::RiskBased => {
            let (Some(risk_pct), Some(stop)) = (config.max_risk_percent, stop_loss_price) else {
                return PositionSize::default();
            };
            let stop_distance = (price - stop).abs();
            if stop_distance == 0.0 || risk_pct <= 0.0 {
                return PositionSize::default();
            }
            let quantity = equity * risk_pct / 100.0 / stop_distance;
            PositionSize {
                quantity,
                notional: quantity * price,
            }
        }
        SizingType::Kelly => {
            let Some(stats) = stats else {
                return PositionSize::default();
            };
            let mut fraction = kelly_fraction(stats);
            if let Some(scale) = config.percent {
                fraction *= scale / 100.0;
            }
            if let Some(cap) = config.max_risk_percent {
                fraction = fraction.min(cap / 100.0);
            }
            PositionSize::from_notional(equity * fraction, price)
        }
    }
}

/// Kelly criterion `f* = W - (1 - W) / R`, clamped to `[0, 1]`.
pub fn kelly_fraction(stats: &TradeStats) -> f64 {
    if stats.avg_loss <= 0.0 || stats.avg_win <= 0.0 {
        return 0.0;
    }
    let payoff = stats.avg_win / stats.avg_loss;
    let f = stats.win_rate - (1.0 - stats.win_rate) / payoff;
    f.clamp(0.0, 1.0)
}

pub fn calculate_stop_loss_price(entry_price: f64, stop_loss_percent: f64, side: PositionSide) -> f64 {
    entry_price * (1.0 - side.direction() * stop_loss_percent / 100.0)
}

pub fn calculate_take_profit_price(entry_price: f64, take_profit_percent: f64, side: PositionSide) -> f64 {
    entry_price * (1.0 + side.direction() * take_profit_percent / 100.0)
}

/// Stop placed `multiplier` ATRs away from entry, against the position.
pub fn calculate_atr_stop_loss(entry_price: f64, atr: f64, multiplier: f64, side: PositionSide) -> f64 {
    entry_price - side.direction() * atr * multiplier
}

/// Stop trailing `trailing_percent` behind the best price since entry.
pub fn calculate_trailing_stop_price(extreme_price: f64, trailing_percent: f64, side: PositionSide) -> f64 {
    calculate_stop_loss_price(extreme_price, trailing_percent, side)
}

/// True once `price` has moved at least `percent` against the position from
/// `reference`. Compared as `move * 100 >= percent * reference` so round
/// percentages trigger exactly on their level.
pub fn has_moved_against(reference: f64, price: f64, percent: f64, side: PositionSide) -> bool {
    side.direction() * (reference - price) * 100.0 >= percent * reference
}

/// Mirror of [`has_moved_against`] for moves in the position's favour.
pub fn has_moved_in_favour(reference: f64, price: f64, percent: f64, side: PositionSide) -> bool {
    side.direction() * (price - reference) * 100.0 >= percent * reference
}

/// Isolated-margin liquidation price.
///
/// Long: `entry * (1 - 1/leverage + mmr)`, short: `entry * (1 + 1/leverage - mmr)`.
/// A non-positive leverage has no liquidation level and returns 0.
pub fn calculate_liquidation_price(
    entry_price: f64,
    leverage: f64,
    maintenance_margin_rate: f64,
    side: PositionSide,
) -> f64 {
    if leverage <= 0.0 {
        return 0.0;
    }
    let price = match side {
        PositionSide::Long => entry_price * (1.0 - 1.0 / leverage + maintenance_margin_rate),
        PositionSide::Short => entry_price * (1.0 + 1.0 / leverage - maintenance_margin_rate),
    };
    price.max(0.0)
}

/// Initial margin for a position. Leverage below 1x is treated as 1x.
pub fn calculate_required_margin(quantity: f64, price: f64, leverage: f64) -> f64 {
    (quantity.abs() * price) / leverage.max(1.0)
}

/// Effective leverage of `notional` exposure on `equity`; 0 without equity.
pub fn calculate_leverage(notional: f64, equity: f64) -> f64 {
    if equity <= 0.0 {
        return 0.0;
    }
    notional.abs() / equity
}

pub fn calculate_pnl(entry_price: f64, exit_price: f64, quantity: f64, side: PositionSide) -> f64 {
    (exit_price - entry_price) * quantity * side.direction()
}

/// PnL as a percentage of the entry notional.
pub fn calculate_pnl_percent(entry_price: f64, exit_price: f64, quantity: f64, side: PositionSide) -> f64 {
    let notional = entry_price * quantity;
    if notional == 0.0 {
        return 0.0;
    }
    calculate_pnl(entry_price, exit_price, quantity, side) / notional.abs() * 100.0
}

pub fn calculate_unrealized_pnl(entry_price: f64, current_price: f64, quantity: f64, side: PositionSide) -> f64 {
    calculate_pnl(entry_price, current_price, quantity, side)
}

/// Realized profit per unit expressed in units of the initial stop distance.
pub fn calculate_r_multiple(entry_price: f64, exit_price: f64, stop_loss_price: f64, side: PositionSide) -> f64 {
    let risk_per_unit = (entry_price - stop_loss_price).abs();
    if risk_per_unit == 0.0 {
        return 0.0;
    }
    (exit_price - entry_price) * side.direction() / risk_per_unit
}

/// A completed entry + exit pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundTripTrade {
    #[serde(default)]
    pub side: PositionSide,
    pub entry_price: f64,
    pub exit_price: f64,
    pub quantity: f64,
    pub entry_time: DateTime<Utc>,
    pub exit_time: DateTime<Utc>,
    pub pnl: f64,
}

impl RoundTripTrade {
    pub fn holding_duration(&self) -> Duration {
        self.exit_time - self.entry_time
    }

    pub fn is_win(&self) -> bool {
        self.pnl > 0.0
    }

    pub fn is_loss(&self) -> bool {
        self.pnl < 0.0
    }
}

/// An order about to be placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub side: PositionSide,
    pub quantity: f64,
    pub price: f64,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
}

/// Account state an order is checked against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountState {
    pub equity: f64,
    pub open_positions: usize,
    pub capital_in_use: f64,
    pub daily_pnl: f64,
}

/// Limits an order must respect.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderLimits {
    pub risk: RiskManagementConfig,
    pub max_risk_percent: Option<f64>,
}

/// Check an order against its limits, collecting every violation.
pub fn validate_order(order: &OrderRequest, limits: &OrderLimits, account: &AccountState) -> ValidationResult {
    let mut result = ValidationResult::new();

    if !(order.quantity.is_finite() && order.quantity > 0.0) {
        result.push("quantity must be positive");
    }
    if !(order.price.is_finite() && order.price > 0.0) {
        result.push("price must be positive");
    }
    if !(account.equity.is_finite() && account.equity > 0.0) {
        result.push("equity must be positive");
    }

    if let Some(stop) = order.stop_loss {
        if stop <= 0.0 {
            result.push("stop_loss must be positive");
        } else if !order.side.is_adverse_or_equal(stop, order.price) || stop == order.price {
            result.push(format!("stop_loss {} is on the wrong side of price {}", stop, order.price));
        }
    }

    if let Some(target) = order.take_profit {
        if target <= 0.0 {
            result.push("take_profit must be positive");
        } else if !order.side.is_favourable_or_equal(target, order.price) || target == order.price {
            result.push(format!("take_profit {} is on the wrong side of price {}", target, order.price));
        }
    }

    if let Some(max) = limits.risk.max_positions {
        if account.open_positions >= max {
            result.push(format!("maximum of {} open positions reached", max));
        }
    }

    let notional = order.quantity * order.price;
    if let Some(usage_pct) = limits.risk.max_capital_usage {
        let allowed = account.equity * usage_pct / 100.0;
        if account.capital_in_use + notional > allowed {
            result.push(format!(
                "order notional {:.2} exceeds capital usage limit of {}% ({:.2} available)",
                notional,
                usage_pct,
                (allowed - account.capital_in_use).max(0.0)
            ));
        }
    }

    if let Some(loss_pct) = limits.risk.daily_max_loss {
        let limit = account.equity * loss_pct / 100.0;
        if account.daily_pnl < 0.0 && -account.daily_pnl >= limit {
            result.push(format!("daily loss limit of {}% reached", loss_pct));
        }
    }

    if let (Some(risk_pct), Some(stop)) = (limits.max_risk_percent, order.stop_loss) {
        let risk = (order.price - stop).abs() * order.quantity;
        let allowed = account.equity * risk_pct / 100.0;
        // tolerate rounding from sizing with the same limit
        if risk > allowed * (1.0 + 1e-9) {
            result.push(format!(
                "order risk {:.2} exceeds {}% of equity ({:.2})",
                risk, risk_pct, allowed
            ));
        }
    }

    if !result.valid {
        debug!(errors = ?result.errors, "order rejected");
    }
    result
}
