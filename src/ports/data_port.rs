//! Candle source port trait.

use crate::domain::candle::Candle;
use crate::domain::error::TradetermError;

pub trait DataPort {
    /// All candles for `symbol` on `timeframe`, ordered by time.
    fn fetch_candles(&self, symbol: &str, timeframe: &str) -> Result<Vec<Candle>, TradetermError>;

    fn list_symbols(&self, timeframe: &str) -> Result<Vec<String>, TradetermError>;
}
