//! Completed trades as recorded in the ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::signal::Side;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub entry_time: DateTime<Utc>,
    pub exit_time: DateTime<Utc>,
    #[serde(rename = "type")]
    pub side: Side,
    pub entry_price: f64,
    pub exit_price: f64,
    pub volume: f64,
    pub profit: f64,
    pub profit_pips: f64,
}

impl Trade {
    pub fn is_win(&self) -> bool {
        self.profit > 0.0
    }
}
