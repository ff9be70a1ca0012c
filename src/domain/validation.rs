//! Structural validation of indicator configs, condition trees and strategies.
//!
//! Validators never stop at the first problem; every violation is collected
//! into a `ValidationResult`. Raw strategy JSON goes through
//! `validate_strategy_value` first, so unknown indicator types and malformed
//! nodes are reported together instead of as a single parse error.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::condition::{ConditionGroup, ConditionNode, Logic, Operand, Operator};
use crate::domain::indicator::IndicatorConfig;
use crate::domain::position::{PositionSizingConfig, RiskManagementConfig, SizingType};
use crate::domain::strategy::Strategy;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        ValidationResult {
            valid: true,
            errors: Vec::new(),
        }
    }
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: impl Into<String>) {
        self.valid = false;
        self.errors.push(error.into());
    }

    /// Fold another result in, prefixing its errors with `context`.
    pub fn merge(&mut self, context: &str, other: ValidationResult) {
        for error in other.errors {
            self.push(format!("{}: {}", context, error));
        }
    }
}

pub fn validate_indicator_config(config: &IndicatorConfig) -> ValidationResult {
    let mut result = ValidationResult::new();
    match *config {
        IndicatorConfig::Price { .. } | IndicatorConfig::Volume | IndicatorConfig::Vwap => {}
        IndicatorConfig::Sma { period, .. }
        | IndicatorConfig::Ema { period, .. }
        | IndicatorConfig::Rsi { period, .. }
        | IndicatorConfig::Atr { period } => {
            if period == 0 {
                result.push(format!("{}: period must be at least 1", config));
            }
        }
        IndicatorConfig::Macd { fast, slow, signal, .. } => {
            if fast == 0 || slow == 0 || signal == 0 {
                result.push(format!("{}: periods must be at least 1", config));
            }
            if fast >= slow {
                result.push(format!("{}: fast period must be shorter than slow period", config));
            }
        }
        IndicatorConfig::Bollinger {
            period,
            std_dev_multiplier,
            ..
        } => {
            if period == 0 {
                result.push(format!("{}: period must be at least 1", config));
            }
            if !(std_dev_multiplier.is_finite() && std_dev_multiplier > 0.0) {
                result.push(format!("{}: stdDevMultiplier must be positive", config));
            }
        }
    }
    result
}

/// Validate every indicator and constant in a condition tree. Empty groups
/// are allowed.
pub fn validate_condition_group(group: &ConditionGroup) -> ValidationResult {
    let mut result = ValidationResult::new();
    for (i, node) in group.conditions.iter().enumerate() {
        match node {
            ConditionNode::Group(inner) => {
                result.merge(&format!("conditions[{}]", i), validate_condition_group(inner));
            }
            ConditionNode::Leaf(condition) => {
                let context = format!("conditions[{}]", i);
                result.merge(&context, validate_indicator_config(&condition.left));
                match &condition.right {
                    Operand::Indicator(right) => result.merge(&context, validate_indicator_config(right)),
                    Operand::Constant(value) if !value.is_finite() => {
                        result.push(format!("{}: constant must be finite", context));
                    }
                    Operand::Constant(_) => {}
                }
            }
        }
    }
    result
}

fn validate_position_sizing(config: &PositionSizingConfig) -> ValidationResult {
    let mut result = ValidationResult::new();
    match config.sizing_type {
        SizingType::FixedAmount => match config.amount {
            Some(a) if a > 0.0 => {}
            Some(_) => result.push("amount must be positive"),
            None => result.push("fixed_amount sizing requires amount"),
        },
        SizingType::FixedPercent => match config.percent {
            Some(p) if p > 0.0 && p <= 100.0 => {}
            Some(_) => result.push("percent must be in (0, 100]"),
            None => result.push("fixed_percent sizing requires percent"),
        },
        SizingType::RiskBased => match config.max_risk_percent {
            Some(p) if p > 0.0 && p <= 100.0 => {}
            Some(_) => result.push("maxRiskPercent must be in (0, 100]"),
            None => result.push("risk_based sizing requires maxRiskPercent"),
        },
        SizingType::Kelly => {
            if let Some(p) = config.percent {
                if !(p > 0.0 && p <= 100.0) {
                    result.push("percent must be in (0, 100]");
                }
            }
            if let Some(p) = config.max_risk_percent {
                if !(p > 0.0 && p <= 100.0) {
                    result.push("maxRiskPercent must be in (0, 100]");
                }
            }
        }
    }
    result
}

fn validate_risk_management(config: &RiskManagementConfig) -> ValidationResult {
    let mut result = ValidationResult::new();
    let percents = [
        ("stopLossPercent", config.stop_loss_percent),
        ("takeProfitPercent", config.take_profit_percent),
        ("trailingStopPercent", config.trailing_stop_percent),
        ("maxCapitalUsage", config.max_capital_usage),
        ("dailyMaxLoss", config.daily_max_loss),
    ];
    for (name, value) in percents {
        if let Some(v) = value {
            if !(v.is_finite() && v >= 0.0) {
                result.push(format!("{} must be non-negative", name));
            }
        }
    }
    if let Some(stop) = config.stop_loss_percent {
        if stop >= 100.0 {
            result.push("stopLossPercent must be below 100");
        }
    }
    if config.max_positions == Some(0) {
        result.push("maxPositions must be at least 1");
    }
    result
}

pub fn validate_strategy(strategy: &Strategy) -> ValidationResult {
    let mut result = ValidationResult::new();
    if strategy.name.trim().is_empty() {
        result.push("name must not be empty");
    }
    result.merge("entryConditions", validate_condition_group(&strategy.entry_conditions));
    result.merge("exitConditions", validate_condition_group(&strategy.exit_conditions));
    result.merge("positionSizing", validate_position_sizing(&strategy.position_sizing));
    result.merge("riskManagement", validate_risk_management(&strategy.risk_management));
    result
}

/// Shape check of strategy JSON before it is deserialized.
pub fn validate_strategy_value(value: &Value) -> ValidationResult {
    let mut result = ValidationResult::new();
    let Some(object) = value.as_object() else {
        result.push("strategy must be a JSON object");
        return result;
    };
    match object.get("name") {
        Some(Value::String(_)) => {}
        Some(_) => result.push("name must be a string"),
        None => result.push("name is required"),
    }
    for key in ["entryConditions", "exitConditions"] {
        match object.get(key) {
            Some(group) => result.merge(key, validate_group_value(group)),
            None => result.push(format!("{} is required", key)),
        }
    }
    match object.get("positionSizing") {
        Some(sizing) => result.merge("positionSizing", parse_value::<PositionSizingConfig>(sizing)),
        None => result.push("positionSizing is required"),
    }
    if let Some(risk) = object.get("riskManagement") {
        result.merge("riskManagement", parse_value::<RiskManagementConfig>(risk));
    }
    result
}

fn validate_group_value(value: &Value) -> ValidationResult {
    let mut result = ValidationResult::new();
    let Some(group) = value.as_object() else {
        result.push("condition group must be an object");
        return result;
    };
    match group.get("logic") {
        Some(logic) => result.merge("logic", parse_value::<Logic>(logic)),
        None => result.push("logic is required"),
    }
    match group.get("conditions") {
        Some(Value::Array(nodes)) => {
            for (i, node) in nodes.iter().enumerate() {
                result.merge(&format!("conditions[{}]", i), validate_node_value(node));
            }
        }
        Some(_) => result.push("conditions must be an array"),
        None => {}
    }
    result
}

fn validate_node_value(value: &Value) -> ValidationResult {
    let Some(node) = value.as_object() else {
        let mut result = ValidationResult::new();
        result.push("condition must be an object");
        return result;
    };
    if node.contains_key("logic") {
        return validate_group_value(value);
    }

    let mut result = ValidationResult::new();
    match node.get("left") {
        Some(left) => result.merge("left", parse_value::<IndicatorConfig>(left)),
        None => result.push("left is required"),
    }
    match node.get("operator") {
        Some(operator) => result.merge("operator", parse_value::<Operator>(operator)),
        None => result.push("operator is required"),
    }
    match node.get("right") {
        Some(Value::Number(_)) => {}
        Some(right @ Value::Object(_)) => result.merge("right", parse_value::<IndicatorConfig>(right)),
        Some(_) => result.push("right must be a number or an indicator"),
        None => result.push("right is required"),
    }
    result
}

fn parse_value<T: DeserializeOwned>(value: &Value) -> ValidationResult {
    let mut result = ValidationResult::new();
    if let Err(e) = T::deserialize(value) {
        result.push(e.to_string());
    }
    result
}
