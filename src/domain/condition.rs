//! Condition tree data structures.
//!
//! - `Operand`: right-hand side of a comparison (indicator or constant)
//! - `Operator`: comparison and crossing operators
//! - `Condition`: one comparison between an indicator and an operand
//! - `ConditionGroup`: recursive `and`/`or` tree of conditions and groups

use crate::domain::indicator::IndicatorConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Gt,
    Gte,
    Lt,
    Lte,
    Eq,
    Neq,
    CrossAbove,
    CrossBelow,
}

impl Operator {
    /// Crossing operators also read the previous bar.
    pub fn is_crossing(self) -> bool {
        matches!(self, Operator::CrossAbove | Operator::CrossBelow)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Operand {
    Constant(f64),
    Indicator(IndicatorConfig),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub left: IndicatorConfig,
    pub operator: Operator,
    pub right: Operand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Logic {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionGroup {
    pub logic: Logic,
    #[serde(default)]
    pub conditions: Vec<ConditionNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionNode {
    Group(ConditionGroup),
    Leaf(Condition),
}

impl Condition {
    pub fn new(left: IndicatorConfig, operator: Operator, right: Operand) -> Self {
        Condition {
            left,
            operator,
            right,
        }
    }
}

impl ConditionGroup {
    pub fn and(conditions: Vec<ConditionNode>) -> Self {
        ConditionGroup {
            logic: Logic::And,
            conditions,
        }
    }

    pub fn or(conditions: Vec<ConditionNode>) -> Self {
        ConditionGroup {
            logic: Logic::Or,
            conditions,
        }
    }

    /// Every indicator referenced anywhere in the tree, in visit order.
    pub fn indicators(&self) -> Vec<&IndicatorConfig> {
        let mut out = Vec::new();
        collect_indicators(self, &mut out);
        out
    }

    pub fn depth(&self) -> usize {
        1 + self
            .conditions
            .iter()
            .map(|node| match node {
                ConditionNode::Group(group) => group.depth(),
                ConditionNode::Leaf(_) => 0,
            })
            .max()
            .unwrap_or(0)
    }
}

fn collect_indicators<'a>(group: &'a ConditionGroup, out: &mut Vec<&'a IndicatorConfig>) {
    for node in &group.conditions {
        match node {
            ConditionNode::Group(inner) => collect_indicators(inner, out),
            ConditionNode::Leaf(condition) => {
                out.push(&condition.left);
                if let Operand::Indicator(right) = &condition.right {
                    out.push(right);
                }
            }
        }
    }
}

impl From<Condition> for ConditionNode {
    fn from(condition: Condition) -> Self {
        ConditionNode::Leaf(condition)
    }
}

impl From<ConditionGroup> for ConditionNode {
    fn from(group: ConditionGroup) -> Self {
        ConditionNode::Group(group)
    }
}

impl From<f64> for Operand {
    fn from(value: f64) -> Self {
        Operand::Constant(value)
    }
}

impl From<IndicatorConfig> for Operand {
    fn from(config: IndicatorConfig) -> Self {
        Operand::Indicator(config)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Eq => "==",
            Operator::Neq => "!=",
            Operator::CrossAbove => "CROSS_ABOVE",
            Operator::CrossBelow => "CROSS_BELOW",
        };
        f.write_str(s)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Constant(v) => write!(f, "{}", v),
            Operand::Indicator(config) => write!(f, "{}", config),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.operator, self.right)
    }
}
