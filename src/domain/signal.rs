//! Entry and exit signal detection.
//!
//! Exit triggers are checked in a fixed order: stop-loss, take-profit, then
//! the exit condition tree. The first one that fires is reported.

use crate::domain::candle::Candle;
use crate::domain::condition::ConditionGroup;
use crate::domain::condition_eval::evaluate_condition_group;
use crate::domain::position::{
    calculate_stop_loss_price, calculate_take_profit_price, calculate_trailing_stop_price, has_moved_against,
    has_moved_in_favour, PositionSide,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    TrailingStop,
    Condition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitSignal {
    pub exit: bool,
    pub reason: ExitReason,
}

impl ExitSignal {
    fn new(reason: ExitReason) -> Self {
        ExitSignal { exit: true, reason }
    }
}

pub fn detect_entry_signal(candles: &[Candle], entry_conditions: &ConditionGroup, current_index: usize) -> bool {
    evaluate_condition_group(candles, entry_conditions, current_index)
}

/// Exit check for a long position.
pub fn detect_exit_signal(
    candles: &[Candle],
    exit_conditions: &ConditionGroup,
    current_index: usize,
    entry_price: f64,
    stop_loss_percent: Option<f64>,
    take_profit_percent: Option<f64>,
) -> Option<ExitSignal> {
    detect_exit_signal_for_side(
        candles,
        exit_conditions,
        current_index,
        entry_price,
        PositionSide::Long,
        stop_loss_percent,
        take_profit_percent,
    )
}

/// Exit check for either side. Shorts stop out above entry and take profit below.
pub fn detect_exit_signal_for_side(
    candles: &[Candle],
    exit_conditions: &ConditionGroup,
    current_index: usize,
    entry_price: f64,
    side: PositionSide,
    stop_loss_percent: Option<f64>,
    take_profit_percent: Option<f64>,
) -> Option<ExitSignal> {
    let close = candles.get(current_index)?.close;

    if let Some(pct) = stop_loss_percent.filter(|p| *p > 0.0) {
        if has_moved_against(entry_price, close, pct, side) {
            let stop = calculate_stop_loss_price(entry_price, pct, side);
            debug!(index = current_index, close, stop, "stop-loss exit");
            return Some(ExitSignal::new(ExitReason::StopLoss));
        }
    }

    if let Some(pct) = take_profit_percent.filter(|p| *p > 0.0) {
        if has_moved_in_favour(entry_price, close, pct, side) {
            let target = calculate_take_profit_price(entry_price, pct, side);
            debug!(index = current_index, close, target, "take-profit exit");
            return Some(ExitSignal::new(ExitReason::TakeProfit));
        }
    }

    if evaluate_condition_group(candles, exit_conditions, current_index) {
        debug!(index = current_index, close, "condition exit");
        return Some(ExitSignal::new(ExitReason::Condition));
    }

    None
}

/// Trailing-stop check against the best close seen since entry.
///
/// `extreme_price` is the highest close for a long, the lowest for a short;
/// tracking it across bars is the caller's job.
pub fn detect_trailing_stop(
    candles: &[Candle],
    current_index: usize,
    extreme_price: f64,
    side: PositionSide,
    trailing_stop_percent: f64,
) -> Option<ExitSignal> {
    if trailing_stop_percent <= 0.0 {
        return None;
    }
    let close = candles.get(current_index)?.close;
    if has_moved_against(extreme_price, close, trailing_stop_percent, side) {
        let stop = calculate_trailing_stop_price(extreme_price, trailing_stop_percent, side);
        debug!(index = current_index, close, stop, "trailing-stop exit");
        return Some(ExitSignal::new(ExitReason::TrailingStop));
    }
    None
}
