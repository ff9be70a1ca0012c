//! Condition evaluation engine.
//!
//! # Evaluation Semantics
//!
//! - Indicators are computed over `candles[..=index]` only, so no value at a
//!   later bar can influence the result.
//! - A side whose indicator has no value yet makes the condition `false`.
//! - `eq`/`neq` compare exactly, without tolerance.
//! - `cross_above`/`cross_below` also read bar `index - 1` and return `false`
//!   at index 0.
//! - `and` short-circuits on the first `false`, `or` on the first `true`.
//!   An empty `and` is `true`, an empty `or` is `false`.

use crate::domain::candle::Candle;
use crate::domain::condition::{Condition, ConditionGroup, ConditionNode, Logic, Operand, Operator};
use crate::domain::indicator::{indicator_values, IndicatorConfig};

pub fn evaluate_comparison(
    left: f64,
    operator: Operator,
    right: f64,
    prev_left: Option<f64>,
    prev_right: Option<f64>,
) -> bool {
    match operator {
        Operator::Gt => left > right,
        Operator::Gte => left >= right,
        Operator::Lt => left < right,
        Operator::Lte => left <= right,
        Operator::Eq => left == right,
        Operator::Neq => left != right,
        Operator::CrossAbove => match (prev_left, prev_right) {
            (Some(pl), Some(pr)) => pl <= pr && left > right,
            _ => false,
        },
        Operator::CrossBelow => match (prev_left, prev_right) {
            (Some(pl), Some(pr)) => pl >= pr && left < right,
            _ => false,
        },
    }
}

pub fn evaluate_condition(candles: &[Candle], condition: &Condition, index: usize) -> bool {
    if index >= candles.len() {
        return false;
    }
    let window = &candles[..=index];

    let (left, prev_left) = resolve_indicator(window, &condition.left, index);
    let (right, prev_right) = match &condition.right {
        Operand::Constant(v) => (Some(*v), Some(*v)),
        Operand::Indicator(config) => resolve_indicator(window, config, index),
    };

    let (Some(left), Some(right)) = (left, right) else {
        return false;
    };

    if condition.operator.is_crossing() && index == 0 {
        return false;
    }

    evaluate_comparison(left, condition.operator, right, prev_left, prev_right)
}

pub fn evaluate_condition_group(candles: &[Candle], group: &ConditionGroup, index: usize) -> bool {
    match group.logic {
        Logic::And => group
            .conditions
            .iter()
            .all(|node| evaluate_node(candles, node, index)),
        Logic::Or => group
            .conditions
            .iter()
            .any(|node| evaluate_node(candles, node, index)),
    }
}

fn evaluate_node(candles: &[Candle], node: &ConditionNode, index: usize) -> bool {
    match node {
        ConditionNode::Leaf(condition) => evaluate_condition(candles, condition, index),
        ConditionNode::Group(group) => evaluate_condition_group(candles, group, index),
    }
}

fn resolve_indicator(window: &[Candle], config: &IndicatorConfig, index: usize) -> (Option<f64>, Option<f64>) {
    current_and_previous(&indicator_values(window, config), index)
}

/// Values at `index` and `index - 1`; NaN or infinite entries count as missing.
fn current_and_previous(series: &[Option<f64>], index: usize) -> (Option<f64>, Option<f64>) {
    let at = |i: usize| series.get(i).copied().flatten().filter(|v| v.is_finite());
    let prev = index.checked_sub(1).and_then(at);
    (at(index), prev)
}
