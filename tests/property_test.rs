//! Property tests for the engine and statistics over generated series.

mod common;

use common::*;
use proptest::prelude::*;
// proptest's Strategy trait clashes with the domain one by name.
use proptest::strategy::Strategy as Strategy_;
use std::collections::HashMap;
use tradeterm::domain::backtest::Engine;
use tradeterm::domain::execution::POINT_VALUE;
use tradeterm::domain::metrics::{compute_max_drawdown, compute_sharpe_ratio, BacktestResult};
use tradeterm::domain::strategy::Strategy;

/// Emits a planned signal at given bar indices.
#[derive(Debug, Clone)]
struct Plan {
    signals: HashMap<usize, Signal>,
}

impl Strategy for Plan {
    fn name(&self) -> &str {
        "plan"
    }

    fn on_tick(&mut self, prefix: &[Candle]) -> Option<Signal> {
        self.signals.get(&(prefix.len() - 1)).cloned()
    }
}

fn candles_from_steps(steps: &[(f64, f64)]) -> Vec<Candle> {
    let mut close = 1.1000;
    steps
        .iter()
        .enumerate()
        .map(|(i, &(step, wick))| {
            let open = close;
            close += step;
            bar(
                i,
                open,
                open.max(close) + wick,
                open.min(close) - wick,
                close,
            )
        })
        .collect()
}

/// Small steps and volumes keep equity positive over any plan.
fn series() -> impl Strategy_<Value = Vec<Candle>> {
    prop::collection::vec((-0.0005f64..0.0005, 0.0f64..0.0003), 0..150)
        .prop_map(|steps| candles_from_steps(&steps))
}

fn plan(len: usize) -> impl Strategy_<Value = Plan> {
    prop::collection::vec(
        (0..len.max(1), any::<bool>(), 0u32..40, 0u32..40, 1u32..=10),
        0..25,
    )
    .prop_map(move |entries| {
        let mut signals = HashMap::new();
        for (index, is_buy, sl_pips, tp_pips, lots) in entries {
            // Placeholder levels; resolved against the entry close in `anchor`.
            signals.insert(
                index,
                Signal {
                    side: if is_buy { Side::Buy } else { Side::Sell },
                    volume: lots as f64 / 100.0,
                    stop_loss: sl_pips as f64,
                    take_profit: tp_pips as f64,
                },
            );
        }
        Plan { signals }
    })
}

/// Convert planned pip distances into price levels around each entry close.
fn anchor(plan: Plan, candles: &[Candle]) -> Plan {
    let signals = plan
        .signals
        .into_iter()
        .filter(|(i, _)| *i < candles.len())
        .map(|(i, mut s)| {
            let close = candles[i].close;
            let sl = s.stop_loss * POINT_VALUE;
            let tp = s.take_profit * POINT_VALUE;
            let (stop_loss, take_profit) = match s.side {
                Side::Buy => (close - sl, close + tp),
                Side::Sell => (close + sl, close - tp),
            };
            s.stop_loss = if sl > 0.0 { stop_loss } else { 0.0 };
            s.take_profit = if tp > 0.0 { take_profit } else { 0.0 };
            (i, s)
        })
        .collect();
    Plan { signals }
}

fn series_and_plan() -> impl Strategy_<Value = (Vec<Candle>, Plan)> {
    series().prop_flat_map(|candles| {
        let len = candles.len();
        (Just(candles), plan(len))
    })
    .prop_map(|(candles, plan)| {
        let plan = anchor(plan, &candles);
        (candles, plan)
    })
}

fn run(candles: &[Candle], plan: &Plan) -> BacktestResult {
    Engine::new(INITIAL_BALANCE).run(candles, &mut plan.clone())
}

proptest! {
    #[test]
    fn equity_curve_tracks_ledger((candles, plan) in series_and_plan()) {
        let result = run(&candles, &plan);

        if result.trades.is_empty() {
            prop_assert_eq!(&result, &BacktestResult::default());
        } else {
            prop_assert_eq!(result.equity_curve.len(), result.trades.len() + 1);
            prop_assert_eq!(result.equity_curve[0], INITIAL_BALANCE);
            for k in 1..result.equity_curve.len() {
                let expected = result.equity_curve[k - 1] + result.trades[k - 1].profit;
                prop_assert!((result.equity_curve[k] - expected).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn counts_and_profit_add_up((candles, plan) in series_and_plan()) {
        let result = run(&candles, &plan);

        prop_assert_eq!(result.total_trades, result.trades.len());
        prop_assert_eq!(result.winning_trades + result.losing_trades, result.total_trades);
        let sum: f64 = result.trades.iter().map(|t| t.profit).sum();
        prop_assert!((result.net_profit - sum).abs() < 1e-6);
        prop_assert!(result.gross_profit >= 0.0);
        prop_assert!(result.gross_loss >= 0.0);
        prop_assert!(result.profit_factor >= 0.0);
    }

    #[test]
    fn drawdown_is_a_percentage((candles, plan) in series_and_plan()) {
        let result = run(&candles, &plan);
        prop_assert!((0.0..=100.0).contains(&result.max_drawdown));
        prop_assert!(result.sharpe_ratio.is_finite());
    }

    #[test]
    fn trades_are_ordered_and_forward((candles, plan) in series_and_plan()) {
        let result = run(&candles, &plan);

        prop_assert!(result.trades.windows(2).all(|w| w[0].entry_time <= w[1].entry_time));
        for trade in &result.trades {
            prop_assert!(trade.exit_time > trade.entry_time);
        }
    }

    #[test]
    fn runs_are_idempotent((candles, plan) in series_and_plan()) {
        let first = run(&candles, &plan);
        let second = run(&candles, &plan);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn drawdown_bounded_for_positive_curves(curve in prop::collection::vec(1.0f64..1e6, 0..60)) {
        let dd = compute_max_drawdown(&curve);
        prop_assert!((0.0..=100.0).contains(&dd));
    }

    #[test]
    fn sharpe_is_finite(returns in prop::collection::vec(-0.5f64..0.5, 0..60)) {
        prop_assert!(compute_sharpe_ratio(&returns).is_finite());
    }
}
