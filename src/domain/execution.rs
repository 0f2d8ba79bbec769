//! Trade resolution: forward exit search and profit computation.
//!
//! Entry happens at the close of the signalling bar. The exit is found by
//! scanning the bars that follow it, checking stop-loss before take-profit
//! on each bar, and falling back to a timeout close after
//! [`MAX_BARS_HELD`] bars.
//!
//! This looks ahead into bars the strategy has not seen yet, which is fine
//! for offline backtests only.

use chrono::{DateTime, Utc};
use std::fmt;

use super::candle::Candle;
use super::signal::{Side, Signal};
use super::trade::Trade;

/// Forex pip size.
pub const POINT_VALUE: f64 = 0.0001;
/// Monetary value of one pip per unit of volume.
pub const PIP_MULTIPLIER: f64 = 10.0;
/// Bars after entry at which an unresolved trade is closed at market.
pub const MAX_BARS_HELD: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    Timeout,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExitReason::StopLoss => "stop_loss",
            ExitReason::TakeProfit => "take_profit",
            ExitReason::Timeout => "timeout",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Exit {
    /// Offset of the exit bar from the entry bar.
    pub bars_held: usize,
    pub time: DateTime<Utc>,
    pub price: f64,
    pub reason: ExitReason,
}

pub fn stop_loss_hit(signal: &Signal, candle: &Candle) -> bool {
    if !signal.has_stop_loss() {
        return false;
    }
    match signal.side {
        Side::Buy => candle.low <= signal.stop_loss,
        Side::Sell => candle.high >= signal.stop_loss,
    }
}

pub fn take_profit_hit(signal: &Signal, candle: &Candle) -> bool {
    if !signal.has_take_profit() {
        return false;
    }
    match signal.side {
        Side::Buy => candle.high >= signal.take_profit,
        Side::Sell => candle.low <= signal.take_profit,
    }
}

/// Scan `window[1..]` for the exit of a trade entered at `window[0]`.
///
/// Returns `None` when the window runs out before any exit condition fires,
/// including when fewer than two bars are available.
pub fn find_exit(signal: &Signal, window: &[Candle]) -> Option<Exit> {
    if window.len() < 2 {
        return None;
    }

    for (offset, candle) in window.iter().enumerate().skip(1) {
        // Stop-loss first: a bar straddling both levels resolves against the trader.
        if stop_loss_hit(signal, candle) {
            return Some(Exit {
                bars_held: offset,
                time: candle.time,
                price: signal.stop_loss,
                reason: ExitReason::StopLoss,
            });
        }
        if take_profit_hit(signal, candle) {
            return Some(Exit {
                bars_held: offset,
                time: candle.time,
                price: signal.take_profit,
                reason: ExitReason::TakeProfit,
            });
        }
        if offset >= MAX_BARS_HELD {
            return Some(Exit {
                bars_held: offset,
                time: candle.time,
                price: candle.close,
                reason: ExitReason::Timeout,
            });
        }
    }

    None
}

/// Price movement in pips, positive when the trade made money.
pub fn profit_pips(side: Side, entry_price: f64, exit_price: f64, point_value: f64) -> f64 {
    let price_diff = match side {
        Side::Buy => exit_price - entry_price,
        Side::Sell => entry_price - exit_price,
    };
    price_diff / point_value
}

pub fn profit_from_pips(pips: f64, volume: f64) -> f64 {
    pips * volume * PIP_MULTIPLIER
}

/// Resolve a signal emitted at `window[0]` into a completed trade.
pub fn resolve_trade(
    signal: &Signal,
    window: &[Candle],
    point_value: f64,
) -> Option<(Trade, ExitReason)> {
    let entry = window.first()?;
    let exit = find_exit(signal, window)?;

    let pips = profit_pips(signal.side, entry.close, exit.price, point_value);
    let trade = Trade {
        entry_time: entry.time,
        exit_time: exit.time,
        side: signal.side,
        entry_price: entry.close,
        exit_price: exit.price,
        volume: signal.volume,
        profit: profit_from_pips(pips, signal.volume),
        profit_pips: pips,
    };
    Some((trade, exit.reason))
}
