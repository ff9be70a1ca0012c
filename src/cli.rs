//! CLI definition and dispatch.
//!
//! Results go to stdout as JSON; diagnostics go through `tracing` to stderr.

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};

use crate::adapters::csv_adapter::{read_candles, CsvAdapter, CsvBacktestLog};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::domain::candle::Candle;
use crate::domain::config_validation::{build_metrics_config, resolve_initial_capital};
use crate::domain::error::TradecoreError;
use crate::domain::indicator::{indicator_values, IndicatorConfig};
use crate::domain::metrics::{calculate_performance_metrics, MetricsConfig};
use crate::domain::position::PositionSide;
use crate::domain::strategy::{scan_signals, Strategy};
use crate::domain::validation::{validate_indicator_config, validate_strategy, validate_strategy_value};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::{BacktestLogPort, DataPort};
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "tradecore", about = "Technical indicators, signals and backtest metrics")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Where candles come from: a CSV file, or a symbol in a data directory.
#[derive(clap::Args, Debug, Clone)]
pub struct CandleSource {
    /// Candle CSV file
    #[arg(long, conflicts_with = "symbol")]
    pub candles: Option<PathBuf>,
    /// Symbol to load as `<data-dir>/<symbol>.csv`
    #[arg(long)]
    pub symbol: Option<String>,
    /// Candle directory (defaults to `[data] dir` from the config, then `.`)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute an indicator series
    Indicator {
        #[command(flatten)]
        source: CandleSource,
        /// Indicator config as JSON, e.g. '{"type":"rsi","period":14}'
        #[arg(short, long)]
        indicator: String,
    },
    /// List entry and exit signals for a strategy
    Signals {
        #[command(flatten)]
        source: CandleSource,
        #[arg(short, long)]
        strategy: PathBuf,
        #[arg(long)]
        short: bool,
    },
    /// Compute performance metrics from an equity curve and trade log
    Metrics {
        #[arg(long)]
        equity: PathBuf,
        #[arg(long)]
        trades: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        initial_capital: Option<f64>,
        #[arg(long, default_value = "strategy")]
        name: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a strategy definition
    Validate {
        #[arg(short, long)]
        strategy: PathBuf,
    },
    /// List symbols available in a data directory
    ListSymbols {
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Indicator { source, indicator } => run_indicator(&source, &indicator),
        Command::Signals {
            source,
            strategy,
            short,
        } => run_signals(&source, &strategy, short),
        Command::Metrics {
            equity,
            trades,
            config,
            initial_capital,
            name,
            output,
        } => run_metrics(
            &equity,
            trades.as_ref(),
            config.as_ref(),
            initial_capital,
            &name,
            output.as_ref(),
        ),
        Command::Validate { strategy } => run_validate(&strategy),
        Command::ListSymbols { data_dir, config } => run_list_symbols(data_dir.as_ref(), config.as_ref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, TradecoreError> {
    let config = FileConfigAdapter::from_file(path)?;
    info!("Loaded config from {}", config.source());
    Ok(config)
}

fn load_optional_config(path: Option<&PathBuf>) -> Result<Option<FileConfigAdapter>, TradecoreError> {
    path.map(|p| load_config(p)).transpose()
}

/// Parse a strategy JSON file and reject it unless it validates.
pub fn load_strategy(path: &Path) -> Result<Strategy, TradecoreError> {
    let content = fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&content)?;
    let shape = validate_strategy_value(&value);
    if !shape.valid {
        return Err(TradecoreError::InvalidStrategy { errors: shape.errors });
    }
    let strategy: Strategy = serde_json::from_value(value)?;
    let result = validate_strategy(&strategy);
    if !result.valid {
        return Err(TradecoreError::InvalidStrategy { errors: result.errors });
    }
    Ok(strategy)
}

fn resolve_data_dir(data_dir: Option<&PathBuf>, config: Option<&FileConfigAdapter>) -> PathBuf {
    data_dir
        .cloned()
        .or_else(|| config.and_then(|c| c.get_string("data", "dir")).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn load_candles(source: &CandleSource) -> Result<Vec<Candle>, TradecoreError> {
    let candles = match (&source.candles, &source.symbol) {
        (Some(path), _) => read_candles(path)?,
        (None, Some(symbol)) => {
            let config = load_optional_config(source.config.as_ref())?;
            let dir = resolve_data_dir(source.data_dir.as_ref(), config.as_ref());
            CsvAdapter::new(dir).fetch_candles(symbol)?
        }
        (None, None) => {
            return Err(TradecoreError::Data {
                source_name: "arguments".to_string(),
                reason: "either --candles or --symbol is required".to_string(),
            })
        }
    };
    info!("Loaded {} candles", candles.len());
    Ok(candles)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), TradecoreError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Serialize)]
struct IndicatorPoint {
    timestamp: chrono::DateTime<chrono::Utc>,
    value: Option<f64>,
}

fn run_indicator(source: &CandleSource, indicator_json: &str) -> Result<(), TradecoreError> {
    let config: IndicatorConfig = serde_json::from_str(indicator_json)?;
    let validation = validate_indicator_config(&config);
    if !validation.valid {
        return Err(TradecoreError::InvalidStrategy {
            errors: validation.errors,
        });
    }

    let candles = load_candles(source)?;
    info!("Computing {}", config);
    let values = indicator_values(&candles, &config);
    let points: Vec<IndicatorPoint> = candles
        .iter()
        .zip(values)
        .map(|(c, value)| IndicatorPoint {
            timestamp: c.timestamp,
            value: value.filter(|v| v.is_finite()),
        })
        .collect();
    print_json(&points)
}

fn run_signals(source: &CandleSource, strategy_path: &Path, short: bool) -> Result<(), TradecoreError> {
    let strategy = load_strategy(strategy_path)?;
    info!("Loaded strategy: {}", strategy.name);
    let candles = load_candles(source)?;
    let side = if short { PositionSide::Short } else { PositionSide::Long };

    let events = scan_signals(&candles, &strategy, side);
    info!("{} signals found", events.len());
    print_json(&events)
}

fn run_metrics(
    equity_path: &Path,
    trades_path: Option<&PathBuf>,
    config_path: Option<&PathBuf>,
    initial_capital: Option<f64>,
    name: &str,
    output_path: Option<&PathBuf>,
) -> Result<(), TradecoreError> {
    let config = load_optional_config(config_path)?;
    let metrics_config = match &config {
        Some(c) => build_metrics_config(c)?,
        None => MetricsConfig::default(),
    };

    let log = CsvBacktestLog::new(equity_path.to_path_buf(), trades_path.cloned());
    let curve = log.load_equity_curve()?;
    let trades = log.load_trades()?;
    if curve.is_empty() {
        warn!("equity curve is empty");
    }

    let initial = resolve_initial_capital(
        initial_capital,
        config.as_ref().map(|c| c as &dyn ConfigPort),
        &curve,
    )?;
    let final_equity = curve.last().map(|p| p.value).unwrap_or(initial);

    let metrics = calculate_performance_metrics(initial, final_equity, &curve, &trades, &metrics_config);
    info!(
        "{}: total return {:.2}%, sharpe {:.2}, max drawdown {:.2}%, {} trades",
        name,
        metrics.total_return * 100.0,
        metrics.sharpe_ratio,
        metrics.max_drawdown * 100.0,
        metrics.total_trades
    );

    let pretty = match &config {
        Some(c) => c.get_bool("report", "pretty")?.unwrap_or(true),
        None => true,
    };
    let reporter = JsonReportAdapter::new(pretty);
    let output = output_path
        .map(|p| p.display().to_string())
        .or_else(|| config.as_ref().and_then(|c| c.get_string("report", "output")));

    match output {
        Some(path) => reporter.write(&metrics, name, &path),
        None => {
            println!("{}", reporter.render(&metrics, name)?);
            Ok(())
        }
    }
}

fn run_validate(strategy_path: &Path) -> Result<(), TradecoreError> {
    info!("Validating strategy: {}", strategy_path.display());
    let strategy = load_strategy(strategy_path)?;

    println!("Strategy: {}", strategy.name);
    println!(
        "Entry conditions ({} nodes, depth {}):",
        strategy.entry_conditions.conditions.len(),
        strategy.entry_conditions.depth()
    );
    for indicator in strategy.entry_conditions.indicators() {
        println!("  {}", indicator);
    }
    println!(
        "Exit conditions ({} nodes, depth {}):",
        strategy.exit_conditions.conditions.len(),
        strategy.exit_conditions.depth()
    );
    for indicator in strategy.exit_conditions.indicators() {
        println!("  {}", indicator);
    }
    println!("Strategy is valid.");
    Ok(())
}

fn run_list_symbols(data_dir: Option<&PathBuf>, config_path: Option<&PathBuf>) -> Result<(), TradecoreError> {
    let config = load_optional_config(config_path)?;
    let dir = resolve_data_dir(data_dir, config.as_ref());
    let symbols = CsvAdapter::new(dir.clone()).list_symbols()?;

    if symbols.is_empty() {
        warn!("No symbols found in {}", dir.display());
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        info!("{} symbols found", symbols.len());
    }
    Ok(())
}
