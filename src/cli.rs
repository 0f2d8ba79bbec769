//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::domain::backtest::{filter_by_date_range, BacktestConfig, Engine, DEFAULT_INITIAL_BALANCE};
use crate::domain::config_validation::{
    parse_optional_date, require_double, strategy_name, validate_backtest_config,
    validate_strategy_config, DEFAULT_FAST_PERIOD, DEFAULT_SLOW_PERIOD,
};
use crate::domain::error::TradetermError;
use crate::domain::execution::POINT_VALUE;
use crate::domain::metrics::BacktestResult;
use crate::domain::strategies::price_level::LevelActionKind;
use crate::domain::strategies::{
    LevelAction, PriceLevel, PriceLevelConfig, SmaCrossover, SmaCrossoverConfig, PRICE_LEVEL,
    SMA_CROSSOVER,
};
use crate::domain::strategy::Strategy;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_OUTPUT: &str = "result.json";

#[derive(Parser, Debug)]
#[command(name = "tradeterm", about = "Trading terminal backtest engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest over stored candles
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        timeframe: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List symbols with candle files for a timeframe
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        timeframe: String,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            symbol,
            timeframe,
            output,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config)
            } else {
                run_backtest(&config, symbol.as_deref(), timeframe.as_deref(), output.as_ref())
            }
        }
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { config, timeframe } => run_list_symbols(&config, &timeframe),
    }
}

fn fail(err: TradetermError) -> ExitCode {
    eprintln!("error: {err}");
    (&err).into()
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(fail)
}

pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, TradetermError> {
    Ok(BacktestConfig {
        initial_balance: config.get_double("backtest", "initial_balance", DEFAULT_INITIAL_BALANCE)?,
        point_value: config.get_double("backtest", "point_value", POINT_VALUE)?,
        start_date: parse_optional_date(config, "start_date")?,
        end_date: parse_optional_date(config, "end_date")?,
    })
}

/// Build the strategy named in `[strategy]`.
pub fn build_strategy(
    config: &dyn ConfigPort,
    point_value: f64,
) -> Result<Box<dyn Strategy + Send>, TradetermError> {
    match strategy_name(config).as_str() {
        SMA_CROSSOVER => {
            let fast = config.get_int("strategy", "fast_period", DEFAULT_FAST_PERIOD)?;
            let slow = config.get_int("strategy", "slow_period", DEFAULT_SLOW_PERIOD)?;
            let params = SmaCrossoverConfig {
                fast_period: usize::try_from(fast)
                    .map_err(|_| TradetermError::invalid("strategy", "fast_period", "must be positive"))?,
                slow_period: usize::try_from(slow)
                    .map_err(|_| TradetermError::invalid("strategy", "slow_period", "must be positive"))?,
            };
            Ok(Box::new(SmaCrossover::from_config(&params)?))
        }
        PRICE_LEVEL => {
            let kind: LevelActionKind = config
                .require_string("strategy", "action")?
                .parse()
                .map_err(|reason: String| TradetermError::invalid("strategy", "action", reason))?;

            let action = match kind {
                LevelActionKind::BuyAbove => LevelAction::BuyAbove {
                    level: require_double(config, "strategy", "level")?,
                },
                LevelActionKind::SellBelow => LevelAction::SellBelow {
                    level: require_double(config, "strategy", "level")?,
                },
                LevelActionKind::BuyInZone => LevelAction::BuyInZone {
                    lower: require_double(config, "strategy", "lower")?,
                    upper: require_double(config, "strategy", "upper")?,
                },
                LevelActionKind::SellInZone => LevelAction::SellInZone {
                    lower: require_double(config, "strategy", "lower")?,
                    upper: require_double(config, "strategy", "upper")?,
                },
            };

            Ok(Box::new(PriceLevel::new(PriceLevelConfig {
                action,
                volume: config.get_double("strategy", "volume", 0.01)?,
                stop_loss_pips: config.get_double("strategy", "stop_loss_pips", 0.0)?,
                take_profit_pips: config.get_double("strategy", "take_profit_pips", 0.0)?,
                point_value,
            })?))
        }
        other => Err(TradetermError::UnknownStrategy {
            name: other.to_string(),
        }),
    }
}

/// Symbol and timeframe from the command line, falling back to `[backtest]`.
pub fn resolve_market(
    symbol_override: Option<&str>,
    timeframe_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<(String, String), TradetermError> {
    let symbol = match symbol_override {
        Some(s) => s.trim().to_uppercase(),
        None => config.require_string("backtest", "symbol")?.to_uppercase(),
    };
    let timeframe = match timeframe_override {
        Some(t) => t.trim().to_uppercase(),
        None => config.require_string("backtest", "timeframe")?.to_uppercase(),
    };
    Ok((symbol, timeframe))
}

fn run_backtest(
    config_path: &PathBuf,
    symbol_override: Option<&str>,
    timeframe_override: Option<&str>,
    output_override: Option<&PathBuf>,
) -> ExitCode {
    // Stage 1: Load and validate config
    info!("loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_backtest_config(&adapter) {
        return fail(e);
    }
    if let Err(e) = validate_strategy_config(&adapter) {
        return fail(e);
    }

    // Stage 2: Build engine config and strategy
    let bt_config = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };
    let mut strategy = match build_strategy(&adapter, bt_config.point_value) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };
    info!("strategy: {}", strategy.name());

    // Stage 3: Resolve market and data source
    let (symbol, timeframe) = match resolve_market(symbol_override, timeframe_override, &adapter) {
        Ok(m) => m,
        Err(e) => return fail(e),
    };
    let data_path = match adapter.require_string("data", "path") {
        Ok(p) => PathBuf::from(p),
        Err(e) => return fail(e),
    };
    let output = output_override
        .map(|p| p.display().to_string())
        .or_else(|| adapter.get_string("report", "output"))
        .unwrap_or_else(|| DEFAULT_OUTPUT.to_string());

    let data_port = CsvAdapter::new(data_path);
    let report = JsonReportAdapter::new();

    match run_backtest_pipeline(
        &data_port,
        &mut strategy,
        &bt_config,
        &symbol,
        &timeframe,
        &report,
        &output,
    ) {
        Ok(result) => {
            print_summary(&result, bt_config.initial_balance);
            eprintln!("\nResult written to: {}", output);
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

/// Stages 4-6: fetch candles, run the engine, write the report.
pub fn run_backtest_pipeline<S: Strategy + ?Sized>(
    data_port: &dyn DataPort,
    strategy: &mut S,
    bt_config: &BacktestConfig,
    symbol: &str,
    timeframe: &str,
    report: &dyn ReportPort,
    output_path: &str,
) -> Result<BacktestResult, TradetermError> {
    let candles = data_port.fetch_candles(symbol, timeframe)?;
    let candles = filter_by_date_range(candles, bt_config.start_date, bt_config.end_date);
    if candles.is_empty() {
        return Err(TradetermError::NoData {
            symbol: symbol.to_string(),
            timeframe: timeframe.to_string(),
        });
    }
    info!(
        "running backtest: {} {}, {} candles, {} to {}",
        symbol,
        timeframe,
        candles.len(),
        candles[0].time,
        candles[candles.len() - 1].time
    );

    let started = Instant::now();
    let mut engine = Engine::from_config(bt_config);
    let result = engine.run(&candles, strategy);
    info!("backtest finished in {} ms", started.elapsed().as_millis());

    report.write(&result, output_path)?;
    Ok(result)
}

pub fn print_summary(result: &BacktestResult, initial_balance: f64) {
    eprintln!("\n=== Backtest Results ===");
    eprintln!("Total Trades:     {}", result.total_trades);
    eprintln!(
        "Won / Lost:       {} / {}",
        result.winning_trades, result.losing_trades
    );
    eprintln!("Win Rate:         {:.2}%", result.win_rate);
    eprintln!("Net Profit:       ${:.2}", result.net_profit);
    eprintln!("Gross Profit:     ${:.2}", result.gross_profit);
    eprintln!("Gross Loss:       ${:.2}", result.gross_loss);
    eprintln!("Profit Factor:    {:.2}", result.profit_factor);
    eprintln!("Max Drawdown:     {:.2}%", result.max_drawdown);
    eprintln!("Sharpe Ratio:     {:.2}", result.sharpe_ratio);
    eprintln!(
        "Balance:          ${:.2} -> ${:.2}",
        initial_balance,
        initial_balance + result.net_profit
    );
}

pub fn run_dry_run(config_path: &PathBuf) -> ExitCode {
    info!("loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_backtest_config(&adapter) {
        return fail(e);
    }
    if let Err(e) = validate_strategy_config(&adapter) {
        return fail(e);
    }

    let bt_config = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };
    let strategy = match build_strategy(&adapter, bt_config.point_value) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };
    let (symbol, timeframe) = match resolve_market(None, None, &adapter) {
        Ok(m) => m,
        Err(e) => return fail(e),
    };

    eprintln!("Strategy:         {}", strategy.name());
    eprintln!("Market:           {} {}", symbol, timeframe);
    eprintln!("Initial Balance:  ${:.2}", bt_config.initial_balance);
    eprintln!("Point Value:      {}", bt_config.point_value);
    if let Some(start) = bt_config.start_date {
        eprintln!("Start Date:       {}", start);
    }
    if let Some(end) = bt_config.end_date {
        eprintln!("End Date:         {}", end);
    }
    eprintln!("\nDry run complete: configuration is valid");
    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_backtest_config(&adapter) {
        return fail(e);
    }
    if let Err(e) = validate_strategy_config(&adapter) {
        return fail(e);
    }

    let point_value = match adapter.get_double("backtest", "point_value", POINT_VALUE) {
        Ok(v) => v,
        Err(e) => return fail(e),
    };
    match build_strategy(&adapter, point_value) {
        Ok(strategy) => {
            eprintln!("Strategy {} is valid.", strategy.name());
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

fn run_list_symbols(config_path: &PathBuf, timeframe: &str) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let data_path = match adapter.require_string("data", "path") {
        Ok(p) => PathBuf::from(p),
        Err(e) => return fail(e),
    };

    let timeframe = timeframe.trim().to_uppercase();
    match CsvAdapter::new(data_path).list_symbols(&timeframe) {
        Ok(symbols) if symbols.is_empty() => {
            eprintln!("No symbols found for timeframe {}", timeframe);
            ExitCode::SUCCESS
        }
        Ok(symbols) => {
            for symbol in &symbols {
                println!("{}", symbol);
            }
            eprintln!("{} symbols found", symbols.len());
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}
