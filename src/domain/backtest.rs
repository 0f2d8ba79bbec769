//! Backtest engine and bar-by-bar simulation loop.
//!
//! For every bar the strategy sees the prefix ending at that bar. A signal
//! opens a trade at the bar's close which is resolved immediately by
//! scanning forward (see [`execution`](super::execution)). Trades may
//! overlap freely; there is no position cap and no shared state between
//! trades.

use chrono::NaiveDate;
use log::{debug, info};

use super::candle::Candle;
use super::execution::{resolve_trade, POINT_VALUE};
use super::metrics::BacktestResult;
use super::strategy::Strategy;
use super::trade::Trade;

pub const DEFAULT_INITIAL_BALANCE: f64 = 10_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_balance: f64,
    pub point_value: f64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_balance: DEFAULT_INITIAL_BALANCE,
            point_value: POINT_VALUE,
            start_date: None,
            end_date: None,
        }
    }
}

/// Keep candles whose date falls inside the inclusive `[start, end]` range.
/// A missing bound leaves that side open.
pub fn filter_by_date_range(
    candles: Vec<Candle>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Vec<Candle> {
    candles
        .into_iter()
        .filter(|c| {
            let date = c.time.date_naive();
            start.is_none_or(|s| date >= s) && end.is_none_or(|e| date <= e)
        })
        .collect()
}

/// Account state mutated by the simulator during a run.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineState {
    pub initial_balance: f64,
    pub current_balance: f64,
    pub equity: f64,
    pub max_equity: f64,
    pub ledger: Vec<Trade>,
    pub point_value: f64,
}

impl EngineState {
    pub fn new(initial_balance: f64, point_value: f64) -> Self {
        EngineState {
            initial_balance,
            current_balance: initial_balance,
            equity: initial_balance,
            max_equity: initial_balance,
            ledger: Vec::new(),
            point_value,
        }
    }

    fn record(&mut self, trade: Trade) {
        self.current_balance += trade.profit;
        self.ledger.push(trade);
    }

    fn update_equity(&mut self) {
        self.equity = self.current_balance;
        if self.equity > self.max_equity {
            self.max_equity = self.equity;
        }
    }
}

#[derive(Debug, Clone)]
pub struct Engine {
    state: EngineState,
}

impl Engine {
    pub fn new(initial_balance: f64) -> Self {
        Self::with_point_value(initial_balance, POINT_VALUE)
    }

    pub fn with_point_value(initial_balance: f64, point_value: f64) -> Self {
        Engine {
            state: EngineState::new(initial_balance, point_value),
        }
    }

    pub fn from_config(config: &BacktestConfig) -> Self {
        Self::with_point_value(config.initial_balance, config.point_value)
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// Replay `candles` through `strategy` and compute the statistics.
    ///
    /// State is reset first, so running the same engine twice on the same
    /// input with a fresh strategy gives identical results.
    pub fn run<S: Strategy + ?Sized>(&mut self, candles: &[Candle], strategy: &mut S) -> BacktestResult {
        self.state = EngineState::new(self.state.initial_balance, self.state.point_value);

        for i in 0..candles.len() {
            if let Some(signal) = strategy.on_tick(&candles[..=i]) {
                match resolve_trade(&signal, &candles[i..], self.state.point_value) {
                    Some((trade, reason)) => {
                        debug!(
                            "{} {} at {} -> {} at {} ({}), profit {:.2}",
                            strategy.name(),
                            trade.side,
                            trade.entry_price,
                            reason,
                            trade.exit_price,
                            trade.exit_time,
                            trade.profit
                        );
                        self.state.record(trade);
                    }
                    None => {
                        debug!(
                            "{} {} signal at bar {} dropped: no exit before end of series",
                            strategy.name(),
                            signal.side,
                            i
                        );
                    }
                }
            }

            self.state.update_equity();
        }

        info!(
            "backtest {}: {} bars, {} trades, balance {:.2} -> {:.2}",
            strategy.name(),
            candles.len(),
            self.state.ledger.len(),
            self.state.initial_balance,
            self.state.current_balance
        );

        BacktestResult::compute(
            &self.state.ledger,
            self.state.initial_balance,
            self.state.current_balance,
        )
    }
}
