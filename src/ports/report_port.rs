//! Report generation port trait.

use crate::domain::error::TradetermError;
use crate::domain::metrics::BacktestResult;

/// Port for writing backtest results.
pub trait ReportPort {
    fn write(&self, result: &BacktestResult, output_path: &str) -> Result<(), TradetermError>;
}
