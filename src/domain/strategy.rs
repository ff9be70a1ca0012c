//! Strategy definition: entry/exit condition trees plus sizing and risk settings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::candle::Candle;
use crate::domain::condition::ConditionGroup;
use crate::domain::position::{OrderLimits, PositionSide, PositionSizingConfig, RiskManagementConfig};
use crate::domain::signal::{
    detect_entry_signal, detect_exit_signal_for_side, detect_trailing_stop, ExitReason, ExitSignal,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Strategy {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub entry_conditions: ConditionGroup,
    pub exit_conditions: ConditionGroup,
    pub position_sizing: PositionSizingConfig,
    #[serde(default)]
    pub risk_management: RiskManagementConfig,
}

impl Strategy {
    pub fn order_limits(&self) -> OrderLimits {
        OrderLimits {
            risk: self.risk_management.clone(),
            max_risk_percent: self.position_sizing.max_risk_percent,
        }
    }

    /// Exit check using this strategy's stop-loss and take-profit settings.
    pub fn exit_signal(
        &self,
        candles: &[Candle],
        current_index: usize,
        entry_price: f64,
        side: PositionSide,
    ) -> Option<ExitSignal> {
        detect_exit_signal_for_side(
            candles,
            &self.exit_conditions,
            current_index,
            entry_price,
            side,
            self.risk_management.stop_loss_percent,
            self.risk_management.take_profit_percent,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    Entry,
    Exit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    pub kind: SignalKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<ExitReason>,
    pub price: f64,
}

/// Walk the candles holding at most one position and report every entry and
/// exit signal, filled at the bar's close.
///
/// Exits are never checked on the entry bar. The trailing stop is checked
/// after stop-loss, take-profit and the exit conditions.
pub fn scan_signals(candles: &[Candle], strategy: &Strategy, side: PositionSide) -> Vec<SignalEvent> {
    let mut events = Vec::new();
    // (entry price, best close since entry)
    let mut open: Option<(f64, f64)> = None;

    for (i, candle) in candles.iter().enumerate() {
        let close = candle.close;
        match open {
            None => {
                if detect_entry_signal(candles, &strategy.entry_conditions, i) {
                    events.push(SignalEvent {
                        index: i,
                        timestamp: candle.timestamp,
                        kind: SignalKind::Entry,
                        reason: None,
                        price: close,
                    });
                    open = Some((close, close));
                }
            }
            Some((entry_price, extreme)) => {
                let extreme = match side {
                    PositionSide::Long => extreme.max(close),
                    PositionSide::Short => extreme.min(close),
                };
                let exit = strategy.exit_signal(candles, i, entry_price, side).or_else(|| {
                    strategy
                        .risk_management
                        .trailing_stop_percent
                        .and_then(|pct| detect_trailing_stop(candles, i, extreme, side, pct))
                });
                match exit {
                    Some(signal) => {
                        events.push(SignalEvent {
                            index: i,
                            timestamp: candle.timestamp,
                            kind: SignalKind::Exit,
                            reason: Some(signal.reason),
                            price: close,
                        });
                        open = None;
                    }
                    None => open = Some((entry_price, extreme)),
                }
            }
        }
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::condition::{Condition, Logic, Operator};
    use crate::domain::indicator::IndicatorConfig;
    use crate::domain::position::SizingType;
    use chrono::{Duration, TimeZone};

    const SMA_CROSS: &str = r#"{
        "name": "SMA Crossover",
        "description": "Simple moving average crossover strategy",
        "entryConditions": {
            "logic": "and",
            "conditions": [
                {"left": {"type": "sma", "period": 20}, "operator": "cross_above", "right": {"type": "sma", "period": 50}}
            ]
        },
        "exitConditions": {
            "logic": "or",
            "conditions": [
                {"left": {"type": "sma", "period": 20}, "operator": "cross_below", "right": {"type": "sma", "period": 50}}
            ]
        },
        "positionSizing": {"type": "fixed_percent", "percent": 25},
        "riskManagement": {"stopLossPercent": 5, "takeProfitPercent": 10, "maxPositions": 1}
    }"#;

    #[test]
    fn strategy_from_json() {
        let s: Strategy = serde_json::from_str(SMA_CROSS).unwrap();
        assert_eq!(s.name, "SMA Crossover");
        assert_eq!(s.entry_conditions.logic, Logic::And);
        assert_eq!(s.exit_conditions.logic, Logic::Or);
        assert_eq!(s.position_sizing.sizing_type, SizingType::FixedPercent);
        assert_eq!(s.position_sizing.percent, Some(25.0));
        assert_eq!(s.risk_management.stop_loss_percent, Some(5.0));
        assert_eq!(s.risk_management.max_positions, Some(1));
        assert_eq!(s.risk_management.trailing_stop_percent, None);
    }

    #[test]
    fn risk_management_is_optional() {
        let json = r#"{
            "name": "bare",
            "entryConditions": {"logic": "and"},
            "exitConditions": {"logic": "or"},
            "positionSizing": {"type": "fixed_amount", "amount": 1000}
        }"#;
        let s: Strategy = serde_json::from_str(json).unwrap();
        assert_eq!(s.description, "");
        assert_eq!(s.risk_management, RiskManagementConfig::default());
    }

    #[test]
    fn order_limits_carry_risk_settings() {
        let mut s: Strategy = serde_json::from_str(SMA_CROSS).unwrap();
        s.position_sizing.max_risk_percent = Some(2.0);
        let limits = s.order_limits();
        assert_eq!(limits.risk.max_positions, Some(1));
        assert_eq!(limits.max_risk_percent, Some(2.0));
    }

    fn make_candles(closes: &[f64]) -> Vec<Candle> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                timestamp: start + Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000.0,
            })
            .collect()
    }

    fn threshold_strategy(risk: RiskManagementConfig) -> Strategy {
        Strategy {
            name: "threshold".into(),
            description: String::new(),
            entry_conditions: ConditionGroup::and(vec![
                Condition::new(IndicatorConfig::close(), Operator::CrossAbove, 100.0.into()).into(),
            ]),
            exit_conditions: ConditionGroup::and(vec![
                Condition::new(IndicatorConfig::close(), Operator::CrossBelow, 100.0.into()).into(),
            ]),
            position_sizing: PositionSizingConfig::fixed_percent(10.0),
            risk_management: risk,
        }
    }

    #[test]
    fn scan_reports_entry_then_condition_exit() {
        let candles = make_candles(&[95.0, 101.0, 103.0, 99.0, 98.0]);
        let events = scan_signals(&candles, &threshold_strategy(RiskManagementConfig::default()), PositionSide::Long);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, SignalKind::Entry);
        assert_eq!(events[0].index, 1);
        assert_eq!(events[1].kind, SignalKind::Exit);
        assert_eq!(events[1].index, 3);
        assert_eq!(events[1].reason, Some(ExitReason::Condition));
    }

    #[test]
    fn scan_prefers_stop_loss() {
        let candles = make_candles(&[95.0, 101.0, 90.0]);
        let risk = RiskManagementConfig {
            stop_loss_percent: Some(5.0),
            ..Default::default()
        };
        let events = scan_signals(&candles, &threshold_strategy(risk), PositionSide::Long);
        assert_eq!(events[1].reason, Some(ExitReason::StopLoss));
    }

    #[test]
    fn scan_trailing_stop_follows_best_close() {
        let candles = make_candles(&[95.0, 101.0, 120.0, 130.0, 116.0]);
        let risk = RiskManagementConfig {
            trailing_stop_percent: Some(10.0),
            ..Default::default()
        };
        let events = scan_signals(&candles, &threshold_strategy(risk), PositionSide::Long);
        // best close 130, stop at 117
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].index, 4);
        assert_eq!(events[1].reason, Some(ExitReason::TrailingStop));
    }

    #[test]
    fn exit_signal_uses_risk_settings() {
        let s: Strategy = serde_json::from_str(SMA_CROSS).unwrap();
        let candles = make_candles(&[111.0]);
        let signal = s.exit_signal(&candles, 0, 100.0, PositionSide::Long);
        assert_eq!(signal.map(|e| e.reason), Some(ExitReason::TakeProfit));
    }
}
