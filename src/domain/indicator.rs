//! Price indicators computed over candle prefixes.

use super::candle::Candle;

/// Simple moving average of the close of the last `period` candles.
///
/// Returns `None` when fewer than `period` candles are available or
/// `period` is zero.
pub fn sma(candles: &[Candle], period: usize) -> Option<f64> {
    if period == 0 || candles.len() < period {
        return None;
    }
    let sum: f64 = candles[candles.len() - period..]
        .iter()
        .map(|c| c.close)
        .sum();
    Some(sum / period as f64)
}
