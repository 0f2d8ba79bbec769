//! Configuration access port trait.

use crate::domain::error::TradetermError;

/// Sectioned key/value configuration, as read from an INI file.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    /// Integer value, `default` when absent, `ConfigInvalid` when malformed.
    fn get_int(&self, section: &str, key: &str, default: i64) -> Result<i64, TradetermError>;

    /// Float value, `default` when absent, `ConfigInvalid` when malformed.
    fn get_double(&self, section: &str, key: &str, default: f64) -> Result<f64, TradetermError>;

    /// Non-blank string value, or `ConfigMissing`.
    fn require_string(&self, section: &str, key: &str) -> Result<String, TradetermError> {
        self.get_string(section, key)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| TradetermError::missing(section, key))
    }
}
