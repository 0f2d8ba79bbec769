#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::cell::RefCell;
use std::collections::HashMap;
pub use tradeterm::domain::candle::Candle;
use tradeterm::domain::error::TradetermError;
use tradeterm::domain::metrics::BacktestResult;
pub use tradeterm::domain::signal::{Side, Signal};
use tradeterm::domain::strategy::Strategy;
use tradeterm::ports::data_port::DataPort;
use tradeterm::ports::report_port::ReportPort;

pub const INITIAL_BALANCE: f64 = 10_000.0;

pub struct MockDataPort {
    pub data: HashMap<(String, String), Vec<Candle>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_candles(mut self, symbol: &str, timeframe: &str, candles: Vec<Candle>) -> Self {
        self.data
            .insert((symbol.to_string(), timeframe.to_string()), candles);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_candles(&self, symbol: &str, timeframe: &str) -> Result<Vec<Candle>, TradetermError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(TradetermError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(&(symbol.to_string(), timeframe.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    fn list_symbols(&self, timeframe: &str) -> Result<Vec<String>, TradetermError> {
        let mut symbols: Vec<String> = self
            .data
            .keys()
            .filter(|(_, tf)| tf == timeframe)
            .map(|(s, _)| s.clone())
            .collect();
        symbols.sort();
        Ok(symbols)
    }
}

/// Captures every write instead of touching the filesystem.
pub struct MockReportPort {
    pub calls: RefCell<Vec<(BacktestResult, String)>>,
}

impl MockReportPort {
    pub fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl ReportPort for MockReportPort {
    fn write(&self, result: &BacktestResult, output_path: &str) -> Result<(), TradetermError> {
        self.calls
            .borrow_mut()
            .push((result.clone(), output_path.to_string()));
        Ok(())
    }
}

/// Emits a fixed signal at the listed bar indices.
#[derive(Clone)]
pub struct Scripted {
    pub at: Vec<usize>,
    pub signal: Signal,
}

impl Scripted {
    pub fn new(at: Vec<usize>, signal: Signal) -> Self {
        Self { at, signal }
    }
}

impl Strategy for Scripted {
    fn name(&self) -> &str {
        "scripted"
    }

    fn on_tick(&mut self, prefix: &[Candle]) -> Option<Signal> {
        self.at
            .contains(&(prefix.len() - 1))
            .then(|| self.signal.clone())
    }
}

/// Never signals.
pub struct Silent;

impl Strategy for Silent {
    fn name(&self) -> &str {
        "silent"
    }

    fn on_tick(&mut self, _prefix: &[Candle]) -> Option<Signal> {
        None
    }
}

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

pub fn bar(i: usize, open: f64, high: f64, low: f64, close: f64) -> Candle {
    Candle {
        time: base_time() + Duration::hours(i as i64),
        open,
        high,
        low,
        close,
        volume: 100,
    }
}

pub fn flat_bar(i: usize, price: f64) -> Candle {
    bar(i, price, price, price, price)
}

pub fn flat_series(count: usize, price: f64) -> Vec<Candle> {
    (0..count).map(|i| flat_bar(i, price)).collect()
}

pub fn series_from_closes(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| flat_bar(i, c))
        .collect()
}

/// Gently oscillating series with enough swing to produce crossovers.
pub fn wave_series(count: usize) -> Vec<Candle> {
    (0..count)
        .map(|i| {
            let x = i as f64;
            let close = 1.1000 + 0.0040 * (x / 7.0).sin() + 0.0010 * (x / 3.0).cos();
            bar(i, close, close + 0.0008, close - 0.0008, close)
        })
        .collect()
}

pub fn buy(volume: f64, stop_loss: f64, take_profit: f64) -> Signal {
    Signal {
        side: Side::Buy,
        volume,
        stop_loss,
        take_profit,
    }
}

pub fn sell(volume: f64, stop_loss: f64, take_profit: f64) -> Signal {
    Signal {
        side: Side::Sell,
        volume,
        stop_loss,
        take_profit,
    }
}
