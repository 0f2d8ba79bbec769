//! Performance statistics over a completed trade ledger.

use serde::{Deserialize, Serialize};

use super::trade::Trade;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Backtest outcome in its wire format.
///
/// Serializes with the camelCase field names downstream UIs read;
/// `net_profit` goes out as `profit`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestResult {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate: f64,
    pub gross_profit: f64,
    pub gross_loss: f64,
    #[serde(rename = "profit")]
    pub net_profit: f64,
    pub profit_factor: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub equity_curve: Vec<f64>,
    pub trades: Vec<Trade>,
}

impl BacktestResult {
    pub fn compute(trades: &[Trade], initial_balance: f64, current_balance: f64) -> Self {
        if trades.is_empty() {
            return BacktestResult::default();
        }

        let mut winning_trades = 0usize;
        let mut losing_trades = 0usize;
        let mut gross_profit = 0.0_f64;
        let mut gross_loss = 0.0_f64;
        let mut returns = Vec::with_capacity(trades.len());
        let mut equity_curve = Vec::with_capacity(trades.len() + 1);
        equity_curve.push(initial_balance);

        for trade in trades {
            // Breakeven trades count as losses.
            if trade.is_win() {
                winning_trades += 1;
                gross_profit += trade.profit;
            } else {
                losing_trades += 1;
                gross_loss += trade.profit.abs();
            }

            let last_equity = equity_curve[equity_curve.len() - 1];
            returns.push(trade.profit / last_equity);
            equity_curve.push(last_equity + trade.profit);
        }

        let total_trades = trades.len();
        let win_rate = 100.0 * winning_trades as f64 / total_trades as f64;

        let profit_factor = if gross_loss > 0.0 {
            gross_profit / gross_loss
        } else {
            0.0
        };

        BacktestResult {
            total_trades,
            winning_trades,
            losing_trades,
            win_rate,
            gross_profit,
            gross_loss,
            net_profit: current_balance - initial_balance,
            profit_factor,
            max_drawdown: compute_max_drawdown(&equity_curve),
            sharpe_ratio: compute_sharpe_ratio(&returns),
            equity_curve,
            trades: trades.to_vec(),
        }
    }
}

/// Largest peak-to-trough decline of the curve, in percent of the peak.
pub fn compute_max_drawdown(equity_curve: &[f64]) -> f64 {
    let Some(&first) = equity_curve.first() else {
        return 0.0;
    };

    let mut peak = first;
    let mut max_dd = 0.0_f64;

    for &equity in equity_curve {
        if equity > peak {
            peak = equity;
        }
        if peak > 0.0 {
            let dd = 100.0 * (peak - equity) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }

    max_dd
}

/// Annualized Sharpe ratio of per-trade returns, population variance.
///
/// Zero when there are fewer than two returns or no dispersion.
pub fn compute_sharpe_ratio(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    if stddev == 0.0 {
        return 0.0;
    }

    mean / stddev * TRADING_DAYS_PER_YEAR.sqrt()
}
