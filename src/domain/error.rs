//! Domain error types.

/// Top-level error type for tradeterm.
///
/// The engine itself never fails; these cover configuration, candle
/// sources and report output around it.
#[derive(Debug, thiserror::Error)]
pub enum TradetermError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("candle data error: {reason}")]
    Data { reason: String },

    #[error("no candles for {symbol} {timeframe}")]
    NoData { symbol: String, timeframe: String },

    #[error("unknown strategy: {name}")]
    UnknownStrategy { name: String },

    #[error("invalid strategy parameters: {reason}")]
    StrategyInvalid { reason: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TradetermError {
    pub fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        TradetermError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub fn missing(section: &str, key: &str) -> Self {
        TradetermError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }
    }
}

impl From<serde_json::Error> for TradetermError {
    fn from(err: serde_json::Error) -> Self {
        TradetermError::Report {
            reason: err.to_string(),
        }
    }
}

impl From<&TradetermError> for std::process::ExitCode {
    fn from(err: &TradetermError) -> Self {
        let code: u8 = match err {
            TradetermError::Io(_) | TradetermError::Report { .. } => 1,
            TradetermError::ConfigParse { .. }
            | TradetermError::ConfigMissing { .. }
            | TradetermError::ConfigInvalid { .. } => 2,
            TradetermError::Data { .. } => 3,
            TradetermError::UnknownStrategy { .. } | TradetermError::StrategyInvalid { .. } => 4,
            TradetermError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
