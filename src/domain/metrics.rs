//! Backtest performance metrics.
//!
//! Every function here returns a finite number. Divisions by zero resolve to
//! the sentinels in `MetricsConfig` or to 0, never to NaN or infinity.

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::drawdown::{
    calculate_avg_drawdown, calculate_max_drawdown, calculate_max_drawdown_duration, extract_drawdown_records,
    DrawdownRecord,
};
use super::position::{RoundTripTrade, TradeStats};

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
pub const DEFAULT_PROFIT_FACTOR_CAP: f64 = 999.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsConfig {
    pub trading_days_per_year: f64,
    /// Annual rate as a fraction (0.05 = 5%).
    pub risk_free_rate: f64,
    /// Profit factor reported when there are profits but no losses.
    pub profit_factor_cap: f64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        MetricsConfig {
            trading_days_per_year: TRADING_DAYS_PER_YEAR,
            risk_free_rate: 0.0,
            profit_factor_cap: DEFAULT_PROFIT_FACTOR_CAP,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Streaks {
    pub max_consecutive_wins: usize,
    pub max_consecutive_losses: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReturn {
    pub year: i32,
    pub month: u32,
    /// Fractional return over the month.
    #[serde(rename = "return")]
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub initial_capital: f64,
    pub final_equity: f64,
    pub total_return: f64,
    pub annualized_return: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub calmar_ratio: f64,
    pub max_drawdown: f64,
    pub avg_drawdown: f64,
    pub max_drawdown_duration: usize,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub breakeven_trades: usize,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub max_consecutive_wins: usize,
    pub max_consecutive_losses: usize,
    pub expectancy: f64,
    pub avg_holding_period_hours: f64,
    pub monthly_returns: Vec<MonthlyReturn>,
    pub drawdowns: Vec<DrawdownRecord>,
}

fn finite_or_zero(x: f64) -> f64 {
    if x.is_finite() { x } else { 0.0 }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

pub fn calculate_total_return(initial_capital: f64, final_equity: f64) -> f64 {
    if initial_capital <= 0.0 {
        return 0.0;
    }
    finite_or_zero((final_equity - initial_capital) / initial_capital)
}

/// CAGR: `(1 + total_return)^(days_per_year / trading_days) - 1`.
///
/// A total loss (or worse) annualizes to -1.
pub fn calculate_annualized_return(total_return: f64, trading_days: usize, days_per_year: f64) -> f64 {
    if trading_days == 0 || days_per_year <= 0.0 {
        return 0.0;
    }
    let growth = 1.0 + total_return;
    if growth <= 0.0 {
        return -1.0;
    }
    finite_or_zero(growth.powf(days_per_year / trading_days as f64) - 1.0)
}

/// Fractional change between consecutive equity points. A non-positive
/// previous value yields a 0 return for that step.
pub fn calculate_daily_returns(equity_curve: &[EquityPoint]) -> Vec<f64> {
    equity_curve
        .windows(2)
        .map(|w| {
            let prev = w[0].value;
            if prev > 0.0 {
                finite_or_zero((w[1].value - prev) / prev)
            } else {
                0.0
            }
        })
        .collect()
}

/// Annualized Sharpe ratio. `risk_free_rate` is annual.
pub fn calculate_sharpe_ratio(daily_returns: &[f64], risk_free_rate: f64, days_per_year: f64) -> f64 {
    let sd = std_dev(daily_returns);
    if sd == 0.0 || days_per_year <= 0.0 {
        return 0.0;
    }
    let excess = mean(daily_returns) - risk_free_rate / days_per_year;
    finite_or_zero(excess / sd * days_per_year.sqrt())
}

/// Annualized Sortino ratio. The downside deviation averages squared
/// shortfalls below the daily risk-free rate over all periods.
pub fn calculate_sortino_ratio(daily_returns: &[f64], risk_free_rate: f64, days_per_year: f64) -> f64 {
    if daily_returns.is_empty() || days_per_year <= 0.0 {
        return 0.0;
    }
    let daily_rf = risk_free_rate / days_per_year;
    let downside = daily_returns
        .iter()
        .filter(|&&r| r < daily_rf)
        .map(|&r| (r - daily_rf).powi(2))
        .sum::<f64>()
        / daily_returns.len() as f64;
    let downside_dev = downside.sqrt();
    if downside_dev == 0.0 {
        return 0.0;
    }
    let excess = mean(daily_returns) - daily_rf;
    finite_or_zero(excess / downside_dev * days_per_year.sqrt())
}

/// Annualized return over max drawdown; 0 when there was no drawdown.
pub fn calculate_calmar_ratio(annualized_return: f64, max_drawdown: f64) -> f64 {
    if max_drawdown <= 0.0 {
        return 0.0;
    }
    finite_or_zero(annualized_return / max_drawdown)
}

/// Winning trades over all trades; breakeven trades count in the total.
pub fn calculate_win_rate(trades: &[RoundTripTrade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    trades.iter().filter(|t| t.is_win()).count() as f64 / trades.len() as f64
}

pub fn calculate_profit_factor(trades: &[RoundTripTrade], cap: f64) -> f64 {
    let gross_profit: f64 = trades.iter().filter(|t| t.is_win()).map(|t| t.pnl).sum();
    let gross_loss: f64 = trades.iter().filter(|t| t.is_loss()).map(|t| -t.pnl).sum();
    if gross_loss > 0.0 {
        finite_or_zero(gross_profit / gross_loss).min(cap)
    } else if gross_profit > 0.0 {
        cap
    } else {
        0.0
    }
}

/// `(avg_win, avg_loss)`; the loss is returned as a positive magnitude.
pub fn calculate_avg_win_loss(trades: &[RoundTripTrade]) -> (f64, f64) {
    let wins: Vec<f64> = trades.iter().filter(|t| t.is_win()).map(|t| t.pnl).collect();
    let losses: Vec<f64> = trades.iter().filter(|t| t.is_loss()).map(|t| -t.pnl).collect();
    (mean(&wins), mean(&losses))
}

/// Longest runs of wins and of losses. A breakeven trade ends both runs.
pub fn calculate_consecutive_wins_losses(trades: &[RoundTripTrade]) -> Streaks {
    let mut streaks = Streaks {
        max_consecutive_wins: 0,
        max_consecutive_losses: 0,
    };
    let (mut wins, mut losses) = (0usize, 0usize);
    for trade in trades {
        if trade.is_win() {
            wins += 1;
            losses = 0;
        } else if trade.is_loss() {
            losses += 1;
            wins = 0;
        } else {
            wins = 0;
            losses = 0;
        }
        streaks.max_consecutive_wins = streaks.max_consecutive_wins.max(wins);
        streaks.max_consecutive_losses = streaks.max_consecutive_losses.max(losses);
    }
    streaks
}

/// `win_rate * avg_win - loss_rate * avg_loss`.
pub fn calculate_expectancy(trades: &[RoundTripTrade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let n = trades.len() as f64;
    let win_rate = trades.iter().filter(|t| t.is_win()).count() as f64 / n;
    let loss_rate = trades.iter().filter(|t| t.is_loss()).count() as f64 / n;
    let (avg_win, avg_loss) = calculate_avg_win_loss(trades);
    win_rate * avg_win - loss_rate * avg_loss
}

pub fn calculate_avg_holding_period(trades: &[RoundTripTrade]) -> Duration {
    if trades.is_empty() {
        return Duration::zero();
    }
    let total_ms: i64 = trades.iter().map(|t| t.holding_duration().num_milliseconds()).sum();
    Duration::milliseconds(total_ms / trades.len() as i64)
}

fn close_month(key: (i32, u32), base: f64, last: f64, out: &mut Vec<MonthlyReturn>) {
    let value = if base > 0.0 { finite_or_zero(last / base - 1.0) } else { 0.0 };
    out.push(MonthlyReturn {
        year: key.0,
        month: key.1,
        value,
    });
}

/// Per-calendar-month returns. Each month is measured from the previous
/// month's closing value; the first month from its own first value.
pub fn calculate_monthly_returns(equity_curve: &[EquityPoint]) -> Vec<MonthlyReturn> {
    let mut out = Vec::new();
    let Some(first) = equity_curve.first() else {
        return out;
    };

    let mut base = first.value;
    let mut key = (first.timestamp.year(), first.timestamp.month());
    let mut last = first.value;

    for point in &equity_curve[1..] {
        let point_key = (point.timestamp.year(), point.timestamp.month());
        if point_key != key {
            close_month(key, base, last, &mut out);
            base = last;
            key = point_key;
        }
        last = point.value;
    }
    close_month(key, base, last, &mut out);
    out
}

/// Win/loss statistics for Kelly sizing; `None` without both a win and a loss.
pub fn calculate_trade_stats(trades: &[RoundTripTrade]) -> Option<TradeStats> {
    let (avg_win, avg_loss) = calculate_avg_win_loss(trades);
    if avg_win <= 0.0 || avg_loss <= 0.0 {
        return None;
    }
    Some(TradeStats {
        win_rate: calculate_win_rate(trades),
        avg_win,
        avg_loss,
    })
}

pub fn calculate_performance_metrics(
    initial_capital: f64,
    final_equity: f64,
    equity_curve: &[EquityPoint],
    trades: &[RoundTripTrade],
    config: &MetricsConfig,
) -> PerformanceMetrics {
    let total_return = calculate_total_return(initial_capital, final_equity);
    let daily_returns = calculate_daily_returns(equity_curve);
    let annualized_return =
        calculate_annualized_return(total_return, daily_returns.len(), config.trading_days_per_year);
    let sharpe_ratio = calculate_sharpe_ratio(&daily_returns, config.risk_free_rate, config.trading_days_per_year);
    let sortino_ratio = calculate_sortino_ratio(&daily_returns, config.risk_free_rate, config.trading_days_per_year);
    let max_drawdown = calculate_max_drawdown(equity_curve);
    let calmar_ratio = calculate_calmar_ratio(annualized_return, max_drawdown);

    let (avg_win, avg_loss) = calculate_avg_win_loss(trades);
    let streaks = calculate_consecutive_wins_losses(trades);
    let largest_win = trades.iter().map(|t| t.pnl).fold(0.0, f64::max);
    let largest_loss = trades.iter().map(|t| -t.pnl).fold(0.0, f64::max);

    let metrics = PerformanceMetrics {
        initial_capital,
        final_equity,
        total_return,
        annualized_return,
        sharpe_ratio,
        sortino_ratio,
        calmar_ratio,
        max_drawdown,
        avg_drawdown: calculate_avg_drawdown(equity_curve),
        max_drawdown_duration: calculate_max_drawdown_duration(equity_curve),
        total_trades: trades.len(),
        winning_trades: trades.iter().filter(|t| t.is_win()).count(),
        losing_trades: trades.iter().filter(|t| t.is_loss()).count(),
        breakeven_trades: trades.iter().filter(|t| t.pnl == 0.0).count(),
        win_rate: calculate_win_rate(trades),
        profit_factor: calculate_profit_factor(trades, config.profit_factor_cap),
        avg_win,
        avg_loss,
        largest_win,
        largest_loss,
        max_consecutive_wins: streaks.max_consecutive_wins,
        max_consecutive_losses: streaks.max_consecutive_losses,
        expectancy: calculate_expectancy(trades),
        avg_holding_period_hours: calculate_avg_holding_period(trades).num_seconds() as f64 / 3600.0,
        monthly_returns: calculate_monthly_returns(equity_curve),
        drawdowns: extract_drawdown_records(equity_curve),
    };

    debug!(
        total_return = metrics.total_return,
        sharpe = metrics.sharpe_ratio,
        max_drawdown = metrics.max_drawdown,
        trades = metrics.total_trades,
        "computed performance metrics"
    );
    metrics
}
