//! Configuration validation.
//!
//! Validates all config fields before any candle data is loaded. Each
//! validator reports the first offending key.

use crate::domain::error::TradetermError;
use crate::domain::strategies::price_level::LevelActionKind;
use crate::domain::strategies::{PRICE_LEVEL, SMA_CROSSOVER};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const DEFAULT_FAST_PERIOD: i64 = 10;
pub const DEFAULT_SLOW_PERIOD: i64 = 20;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), TradetermError> {
    validate_initial_balance(config)?;
    validate_point_value(config)?;
    validate_dates(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), TradetermError> {
    match strategy_name(config).as_str() {
        SMA_CROSSOVER => validate_sma_periods(config),
        PRICE_LEVEL => validate_price_level(config),
        other => Err(TradetermError::UnknownStrategy {
            name: other.to_string(),
        }),
    }
}

/// Lower-cased `[strategy] name`, defaulting to the SMA crossover.
pub fn strategy_name(config: &dyn ConfigPort) -> String {
    config
        .get_string("strategy", "name")
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| SMA_CROSSOVER.to_string())
}

/// Optional `YYYY-MM-DD` date under `[backtest]`.
pub fn parse_optional_date(
    config: &dyn ConfigPort,
    key: &str,
) -> Result<Option<NaiveDate>, TradetermError> {
    match config.get_string("backtest", key) {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                TradetermError::invalid(
                    "backtest",
                    key,
                    format!("invalid {key} format, expected YYYY-MM-DD"),
                )
            }),
    }
}

/// Required numeric value; `ConfigMissing` when absent or blank.
pub fn require_double(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<f64, TradetermError> {
    let raw = config.require_string(section, key)?;
    raw.parse::<f64>()
        .map_err(|_| TradetermError::invalid(section, key, format!("'{raw}' is not a number")))
}

fn validate_initial_balance(config: &dyn ConfigPort) -> Result<(), TradetermError> {
    let value = config.get_double("backtest", "initial_balance", 10_000.0)?;
    if !(value > 0.0) {
        return Err(TradetermError::invalid(
            "backtest",
            "initial_balance",
            "initial_balance must be positive",
        ));
    }
    Ok(())
}

fn validate_point_value(config: &dyn ConfigPort) -> Result<(), TradetermError> {
    let value = config.get_double("backtest", "point_value", 0.0001)?;
    if !(value > 0.0) {
        return Err(TradetermError::invalid(
            "backtest",
            "point_value",
            "point_value must be positive",
        ));
    }
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), TradetermError> {
    let start_date = parse_optional_date(config, "start_date")?;
    let end_date = parse_optional_date(config, "end_date")?;

    if let (Some(start), Some(end)) = (start_date, end_date) {
        if start > end {
            return Err(TradetermError::invalid(
                "backtest",
                "start_date",
                "start_date must not be after end_date",
            ));
        }
    }
    Ok(())
}

fn validate_sma_periods(config: &dyn ConfigPort) -> Result<(), TradetermError> {
    let fast = config.get_int("strategy", "fast_period", DEFAULT_FAST_PERIOD)?;
    let slow = config.get_int("strategy", "slow_period", DEFAULT_SLOW_PERIOD)?;

    if fast <= 0 {
        return Err(TradetermError::invalid(
            "strategy",
            "fast_period",
            "fast_period must be positive",
        ));
    }
    if slow <= fast {
        return Err(TradetermError::invalid(
            "strategy",
            "slow_period",
            "slow_period must exceed fast_period",
        ));
    }
    Ok(())
}

fn validate_price_level(config: &dyn ConfigPort) -> Result<(), TradetermError> {
    let action_str = config.require_string("strategy", "action")?;
    let action: LevelActionKind = action_str
        .parse()
        .map_err(|reason: String| TradetermError::invalid("strategy", "action", reason))?;

    if action.is_zone() {
        let lower = require_double(config, "strategy", "lower")?;
        let upper = require_double(config, "strategy", "upper")?;
        if lower >= upper {
            return Err(TradetermError::invalid(
                "strategy",
                "upper",
                "upper must be above lower",
            ));
        }
    } else {
        require_double(config, "strategy", "level")?;
    }

    if !(config.get_double("strategy", "volume", 0.01)? > 0.0) {
        return Err(TradetermError::invalid(
            "strategy",
            "volume",
            "volume must be positive",
        ));
    }

    for key in ["stop_loss_pips", "take_profit_pips"] {
        if config.get_double("strategy", key, 0.0)? < 0.0 {
            return Err(TradetermError::invalid(
                "strategy",
                key,
                format!("{key} must be non-negative"),
            ));
        }
    }
    Ok(())
}
