//! Horizontal price line and price zone triggers.
//!
//! The strategy watches the last close of each prefix and enters when its
//! condition switches from false to true. A condition that keeps holding
//! does not re-enter; it has to clear first.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::candle::Candle;
use crate::domain::error::TradetermError;
use crate::domain::signal::{Side, Signal};
use crate::domain::strategy::Strategy;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum LevelAction {
    BuyAbove { level: f64 },
    SellBelow { level: f64 },
    BuyInZone { lower: f64, upper: f64 },
    SellInZone { lower: f64, upper: f64 },
}

impl LevelAction {
    pub fn side(&self) -> Side {
        match self {
            LevelAction::BuyAbove { .. } | LevelAction::BuyInZone { .. } => Side::Buy,
            LevelAction::SellBelow { .. } | LevelAction::SellInZone { .. } => Side::Sell,
        }
    }

    pub fn is_triggered(&self, close: f64) -> bool {
        match *self {
            LevelAction::BuyAbove { level } => close > level,
            LevelAction::SellBelow { level } => close < level,
            LevelAction::BuyInZone { lower, upper } | LevelAction::SellInZone { lower, upper } => {
                lower <= close && close <= upper
            }
        }
    }

    pub fn kind(&self) -> LevelActionKind {
        match self {
            LevelAction::BuyAbove { .. } => LevelActionKind::BuyAbove,
            LevelAction::SellBelow { .. } => LevelActionKind::SellBelow,
            LevelAction::BuyInZone { .. } => LevelActionKind::BuyInZone,
            LevelAction::SellInZone { .. } => LevelActionKind::SellInZone,
        }
    }
}

/// Action name as written in configuration, without its prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelActionKind {
    BuyAbove,
    SellBelow,
    BuyInZone,
    SellInZone,
}

impl LevelActionKind {
    pub fn is_zone(self) -> bool {
        matches!(self, LevelActionKind::BuyInZone | LevelActionKind::SellInZone)
    }
}

impl FromStr for LevelActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buy_above" => Ok(LevelActionKind::BuyAbove),
            "sell_below" => Ok(LevelActionKind::SellBelow),
            "buy_in_zone" => Ok(LevelActionKind::BuyInZone),
            "sell_in_zone" => Ok(LevelActionKind::SellInZone),
            other => Err(format!(
                "unknown action '{other}' (expected buy_above, sell_below, buy_in_zone or sell_in_zone)"
            )),
        }
    }
}

impl fmt::Display for LevelActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LevelActionKind::BuyAbove => "buy_above",
            LevelActionKind::SellBelow => "sell_below",
            LevelActionKind::BuyInZone => "buy_in_zone",
            LevelActionKind::SellInZone => "sell_in_zone",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceLevelConfig {
    #[serde(flatten)]
    pub action: LevelAction,
    pub volume: f64,
    pub stop_loss_pips: f64,
    pub take_profit_pips: f64,
    pub point_value: f64,
}

#[derive(Debug, Clone)]
pub struct PriceLevel {
    config: PriceLevelConfig,
    was_triggered: bool,
}

impl PriceLevel {
    pub fn new(config: PriceLevelConfig) -> Result<Self, TradetermError> {
        if !(config.volume > 0.0) {
            return Err(TradetermError::StrategyInvalid {
                reason: "volume must be positive".into(),
            });
        }
        if config.stop_loss_pips < 0.0 || config.take_profit_pips < 0.0 {
            return Err(TradetermError::StrategyInvalid {
                reason: "pip distances must be non-negative".into(),
            });
        }
        if !(config.point_value > 0.0) {
            return Err(TradetermError::StrategyInvalid {
                reason: "point_value must be positive".into(),
            });
        }
        if let LevelAction::BuyInZone { lower, upper } | LevelAction::SellInZone { lower, upper } =
            config.action
        {
            if lower >= upper {
                return Err(TradetermError::StrategyInvalid {
                    reason: format!("zone lower ({lower}) must be below upper ({upper})"),
                });
            }
        }
        Ok(PriceLevel {
            config,
            was_triggered: false,
        })
    }

    pub fn config(&self) -> &PriceLevelConfig {
        &self.config
    }

    fn offset(&self, pips: f64) -> f64 {
        pips * self.config.point_value
    }

    /// Signal level for a pip distance; 0 leaves it unset. A configured level
    /// that lands at or below zero is held at the smallest positive price.
    fn signal_level(price: f64, pips: f64, label: &str) -> f64 {
        if !(pips > 0.0) {
            return 0.0;
        }
        if price > 0.0 {
            price
        } else {
            warn!("{label} of {pips} pips falls to {price}, holding it above zero");
            f64::MIN_POSITIVE
        }
    }
}

impl Strategy for PriceLevel {
    fn name(&self) -> &str {
        super::PRICE_LEVEL
    }

    fn on_tick(&mut self, prefix: &[Candle]) -> Option<Signal> {
        let close = prefix.last()?.close;
        let triggered = self.config.action.is_triggered(close);
        let rising_edge = triggered && !self.was_triggered;
        self.was_triggered = triggered;
        if !rising_edge {
            return None;
        }

        debug!("{} triggered at close {}", self.config.action.kind(), close);
        let side = self.config.action.side();
        let sl = self.offset(self.config.stop_loss_pips);
        let tp = self.offset(self.config.take_profit_pips);
        let (stop_loss, take_profit) = match side {
            Side::Buy => (close - sl, close + tp),
            Side::Sell => (close + sl, close - tp),
        };

        Some(Signal {
            side,
            volume: self.config.volume,
            stop_loss: Self::signal_level(stop_loss, self.config.stop_loss_pips, "stop loss"),
            take_profit: Self::signal_level(take_profit, self.config.take_profit_pips, "take profit"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                time: start + Duration::minutes(5 * i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 10,
            })
            .collect()
    }

    fn config(action: LevelAction) -> PriceLevelConfig {
        PriceLevelConfig {
            action,
            volume: 0.1,
            stop_loss_pips: 50.0,
            take_profit_pips: 100.0,
            point_value: 0.0001,
        }
    }

    fn signal_bars(strategy: &mut PriceLevel, candles: &[Candle]) -> Vec<(usize, Signal)> {
        (0..candles.len())
            .filter_map(|i| strategy.on_tick(&candles[..=i]).map(|s| (i, s)))
            .collect()
    }

    #[test]
    fn buy_above_fires_on_cross_only() {
        let mut s = PriceLevel::new(config(LevelAction::BuyAbove { level: 1.0850 })).unwrap();
        let candles = candles_from_closes(&[1.0840, 1.0860, 1.0870, 1.0845, 1.0855]);
        let emitted = signal_bars(&mut s, &candles);

        assert_eq!(emitted.iter().map(|(i, _)| *i).collect::<Vec<_>>(), vec![1, 4]);
        let (_, signal) = &emitted[0];
        assert_eq!(signal.side, Side::Buy);
        assert!((signal.stop_loss - (1.0860 - 0.0050)).abs() < 1e-12);
        assert!((signal.take_profit - (1.0860 + 0.0100)).abs() < 1e-12);
        assert_eq!(signal.volume, 0.1);
    }

    #[test]
    fn sell_below_mirrors_levels() {
        let mut s = PriceLevel::new(config(LevelAction::SellBelow { level: 1.0850 })).unwrap();
        let candles = candles_from_closes(&[1.0860, 1.0840]);
        let emitted = signal_bars(&mut s, &candles);

        assert_eq!(emitted.len(), 1);
        let (i, signal) = &emitted[0];
        assert_eq!(*i, 1);
        assert_eq!(signal.side, Side::Sell);
        assert!((signal.stop_loss - 1.0890).abs() < 1e-12);
        assert!((signal.take_profit - 1.0740).abs() < 1e-12);
    }

    #[test]
    fn zone_is_inclusive() {
        let action = LevelAction::BuyInZone {
            lower: 1.0800,
            upper: 1.0900,
        };
        assert!(action.is_triggered(1.0800));
        assert!(action.is_triggered(1.0900));
        assert!(!action.is_triggered(1.0901));
        assert!(!action.is_triggered(1.0799));
    }

    #[test]
    fn condition_true_on_first_bar_fires() {
        let mut s = PriceLevel::new(config(LevelAction::SellInZone {
            lower: 1.0,
            upper: 2.0,
        }))
        .unwrap();
        let candles = candles_from_closes(&[1.5, 1.6, 1.7]);
        let emitted = signal_bars(&mut s, &candles);
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].0, 0);
        assert_eq!(emitted[0].1.side, Side::Sell);
    }

    #[test]
    fn zero_pips_disable_levels() {
        let mut cfg = config(LevelAction::BuyAbove { level: 1.0 });
        cfg.stop_loss_pips = 0.0;
        cfg.take_profit_pips = 0.0;
        let mut s = PriceLevel::new(cfg).unwrap();
        let signal = s.on_tick(&candles_from_closes(&[1.5])).unwrap();
        assert_eq!(signal.stop_loss, 0.0);
        assert_eq!(signal.take_profit, 0.0);
    }

    #[test]
    fn take_profit_below_zero_stays_set() {
        let mut cfg = config(LevelAction::SellBelow { level: 0.0010 });
        cfg.stop_loss_pips = 0.0;
        cfg.take_profit_pips = 50.0;
        let mut s = PriceLevel::new(cfg).unwrap();
        let signal = s.on_tick(&candles_from_closes(&[0.0005])).unwrap();

        assert_eq!(signal.stop_loss, 0.0);
        assert!(signal.take_profit > 0.0);
        assert!(signal.has_take_profit());
    }

    #[test]
    fn stop_loss_below_zero_stays_set() {
        let mut cfg = config(LevelAction::BuyAbove { level: 0.0010 });
        cfg.stop_loss_pips = 50.0;
        let mut s = PriceLevel::new(cfg).unwrap();
        let candles = candles_from_closes(&[0.0005, 0.0020]);
        let emitted = signal_bars(&mut s, &candles);

        assert_eq!(emitted.len(), 1);
        let signal = &emitted[0].1;
        assert!(signal.stop_loss > 0.0 && signal.stop_loss < 0.0020);
        assert!(signal.has_stop_loss());
        assert!((signal.take_profit - 0.0120).abs() < 1e-12);
    }

    #[test]
    fn rejects_inverted_zone() {
        let result = PriceLevel::new(config(LevelAction::BuyInZone {
            lower: 2.0,
            upper: 1.0,
        }));
        assert!(result.is_err());
    }

    #[test]
    fn rejects_non_positive_volume() {
        let mut cfg = config(LevelAction::BuyAbove { level: 1.0 });
        cfg.volume = 0.0;
        assert!(PriceLevel::new(cfg).is_err());
    }

    #[test]
    fn rejects_negative_pips() {
        let mut cfg = config(LevelAction::BuyAbove { level: 1.0 });
        cfg.stop_loss_pips = -1.0;
        assert!(PriceLevel::new(cfg).is_err());
    }

    #[test]
    fn action_kind_parses_config_names() {
        assert_eq!("buy_above".parse::<LevelActionKind>(), Ok(LevelActionKind::BuyAbove));
        assert_eq!(" SELL_BELOW ".parse::<LevelActionKind>(), Ok(LevelActionKind::SellBelow));
        assert_eq!("buy_in_zone".parse::<LevelActionKind>(), Ok(LevelActionKind::BuyInZone));
        assert_eq!("sell_in_zone".parse::<LevelActionKind>(), Ok(LevelActionKind::SellInZone));
        assert!("trendline".parse::<LevelActionKind>().is_err());
        assert!(LevelActionKind::BuyInZone.is_zone());
        assert!(!LevelActionKind::BuyAbove.is_zone());
        assert_eq!(LevelActionKind::SellInZone.to_string(), "sell_in_zone");
    }

    #[test]
    fn config_serializes_with_action_tag() {
        let value = serde_json::to_value(config(LevelAction::BuyAbove { level: 1.2 })).unwrap();
        assert_eq!(value["action"], "buy_above");
        assert_eq!(value["level"], 1.2);
        assert_eq!(value["stopLossPips"], 50.0);
    }
}
