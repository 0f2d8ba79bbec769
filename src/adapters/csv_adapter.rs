//! CSV file candle adapter.
//!
//! One file per symbol and timeframe, `<SYMBOL>_<TIMEFRAME>.csv`, with a
//! header row followed by `time,open,high,low,close,volume` records.

use crate::domain::candle::Candle;
use crate::domain::error::TradetermError;
use crate::ports::data_port::DataPort;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use csv::StringRecord;
use log::warn;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str, timeframe: &str) -> PathBuf {
        self.base_path.join(format!("{}_{}.csv", symbol, timeframe))
    }
}

/// Parse a bar timestamp as RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DD`
/// or integer Unix seconds. Naive forms are taken as UTC.
pub fn parse_time(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(value) {
        return Some(t.with_timezone(&Utc));
    }
    if let Ok(t) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(t.and_utc());
    }
    if let Ok(d) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0).map(|t| t.and_utc());
    }
    value
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
}

fn field<'a>(record: &'a StringRecord, index: usize, name: &str) -> Result<&'a str, TradetermError> {
    record.get(index).ok_or_else(|| TradetermError::Data {
        reason: format!("missing {} column", name),
    })
}

fn parse_price(record: &StringRecord, index: usize, name: &str) -> Result<f64, TradetermError> {
    field(record, index, name)?
        .trim()
        .parse()
        .map_err(|e| TradetermError::Data {
            reason: format!("invalid {} value: {}", name, e),
        })
}

fn parse_record(record: &StringRecord) -> Result<Candle, TradetermError> {
    let time_str = field(record, 0, "time")?;
    let time = parse_time(time_str).ok_or_else(|| TradetermError::Data {
        reason: format!("invalid time value: {}", time_str),
    })?;

    let volume: i64 = field(record, 5, "volume")?
        .trim()
        .parse()
        .map_err(|e| TradetermError::Data {
            reason: format!("invalid volume value: {}", e),
        })?;

    Ok(Candle {
        time,
        open: parse_price(record, 1, "open")?,
        high: parse_price(record, 2, "high")?,
        low: parse_price(record, 3, "low")?,
        close: parse_price(record, 4, "close")?,
        volume,
    })
}

impl DataPort for CsvAdapter {
    fn fetch_candles(&self, symbol: &str, timeframe: &str) -> Result<Vec<Candle>, TradetermError> {
        let path = self.csv_path(symbol, timeframe);
        let content = fs::read_to_string(&path).map_err(|e| TradetermError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut candles = Vec::new();

        for (row, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| TradetermError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;
            let candle = parse_record(&record)?;

            if !candle.is_consistent() {
                warn!(
                    "{}: row {} ({}) has inconsistent OHLCV values",
                    path.display(),
                    row + 1,
                    candle.time
                );
            }
            candles.push(candle);
        }

        candles.sort_by_key(|c| c.time);
        Ok(candles)
    }

    fn list_symbols(&self, timeframe: &str) -> Result<Vec<String>, TradetermError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| TradetermError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let suffix = format!("_{}.csv", timeframe);
        let mut symbols = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| TradetermError::Data {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(symbol) = name_str.strip_suffix(&suffix) {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
