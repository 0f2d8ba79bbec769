//! Strategy output: trade direction and entry request.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to enter a position at the current bar's close.
///
/// `stop_loss` and `take_profit` are absolute prices; 0 disables the level.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub side: Side,
    pub volume: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
}

impl Signal {
    pub fn has_stop_loss(&self) -> bool {
        self.stop_loss > 0.0
    }

    pub fn has_take_profit(&self) -> bool {
        self.take_profit > 0.0
    }
}
