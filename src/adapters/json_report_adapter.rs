//! JSON report adapter implementing ReportPort.
//!
//! Writes the result in the wire format consumed by the terminal UI.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::error::TradetermError;
use crate::domain::metrics::BacktestResult;
use crate::ports::report_port::ReportPort;

#[derive(Debug, Clone)]
pub struct JsonReportAdapter {
    pub pretty: bool,
}

impl Default for JsonReportAdapter {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl JsonReportAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

pub fn to_json_string(result: &BacktestResult, pretty: bool) -> Result<String, TradetermError> {
    let json = if pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    Ok(json)
}

impl ReportPort for JsonReportAdapter {
    fn write(&self, result: &BacktestResult, output_path: &str) -> Result<(), TradetermError> {
        let path = Path::new(output_path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut writer = BufWriter::new(File::create(path)?);
        if self.pretty {
            serde_json::to_writer_pretty(&mut writer, result)?;
        } else {
            serde_json::to_writer(&mut writer, result)?;
        }
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}
