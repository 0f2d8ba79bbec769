//! Dual simple-moving-average crossover.
//!
//! Emits BUY when the fast SMA crosses above the slow SMA and SELL when it
//! crosses below. The equality side of each comparison lives with the
//! previous bar: a touch on the previous bar followed by strict separation
//! on the current bar is a crossover.

use serde::{Deserialize, Serialize};

use crate::domain::candle::Candle;
use crate::domain::error::TradetermError;
use crate::domain::indicator::sma;
use crate::domain::signal::{Side, Signal};
use crate::domain::strategy::Strategy;

pub const SIGNAL_VOLUME: f64 = 0.01;
pub const STOP_LOSS_DISTANCE: f64 = 0.001;
pub const TAKE_PROFIT_DISTANCE: f64 = 0.002;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmaCrossoverConfig {
    pub fast_period: usize,
    pub slow_period: usize,
}

impl Default for SmaCrossoverConfig {
    fn default() -> Self {
        SmaCrossoverConfig {
            fast_period: 10,
            slow_period: 20,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SmaCrossover {
    fast: usize,
    slow: usize,
}

impl SmaCrossover {
    pub fn new(fast: usize, slow: usize) -> Result<Self, TradetermError> {
        if fast == 0 {
            return Err(TradetermError::StrategyInvalid {
                reason: "fast_period must be positive".into(),
            });
        }
        if slow <= fast {
            return Err(TradetermError::StrategyInvalid {
                reason: format!("slow_period ({slow}) must exceed fast_period ({fast})"),
            });
        }
        Ok(SmaCrossover { fast, slow })
    }

    pub fn from_config(config: &SmaCrossoverConfig) -> Result<Self, TradetermError> {
        Self::new(config.fast_period, config.slow_period)
    }

    pub fn fast_period(&self) -> usize {
        self.fast
    }

    pub fn slow_period(&self) -> usize {
        self.slow
    }
}

impl Strategy for SmaCrossover {
    fn name(&self) -> &str {
        super::SMA_CROSSOVER
    }

    fn on_tick(&mut self, prefix: &[Candle]) -> Option<Signal> {
        let n = prefix.len();
        if n < self.slow + 1 {
            return None;
        }

        let previous = &prefix[..n - 1];
        let fast_now = sma(prefix, self.fast)?;
        let slow_now = sma(prefix, self.slow)?;
        let fast_prev = sma(previous, self.fast)?;
        let slow_prev = sma(previous, self.slow)?;

        let close = prefix[n - 1].close;

        if fast_prev <= slow_prev && fast_now > slow_now {
            return Some(Signal {
                side: Side::Buy,
                volume: SIGNAL_VOLUME,
                stop_loss: close - STOP_LOSS_DISTANCE,
                take_profit: close + TAKE_PROFIT_DISTANCE,
            });
        }

        if fast_prev >= slow_prev && fast_now < slow_now {
            return Some(Signal {
                side: Side::Sell,
                volume: SIGNAL_VOLUME,
                stop_loss: close + STOP_LOSS_DISTANCE,
                take_profit: close - TAKE_PROFIT_DISTANCE,
            });
        }

        None
    }
}
