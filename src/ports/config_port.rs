//! Configuration access port.
//!
//! A missing key is `None`. A present value that does not parse is a
//! `ConfigInvalid` error naming its section and key.

use crate::domain::error::TradecoreError;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    fn get_f64(&self, section: &str, key: &str) -> Result<Option<f64>, TradecoreError> {
        typed(self.get_string(section, key), section, key, "a number", |raw| {
            raw.parse::<f64>().ok()
        })
    }

    /// Accepts `true/false`, `yes/no`, `on/off` and `1/0`, case-insensitively.
    fn get_bool(&self, section: &str, key: &str) -> Result<Option<bool>, TradecoreError> {
        typed(self.get_string(section, key), section, key, "a boolean", |raw| {
            match raw.to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Some(true),
                "false" | "no" | "off" | "0" => Some(false),
                _ => None,
            }
        })
    }
}

fn typed<T>(
    raw: Option<String>,
    section: &str,
    key: &str,
    expected: &str,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Result<Option<T>, TradecoreError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    parse(raw.trim())
        .map(Some)
        .ok_or_else(|| TradecoreError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("'{}' is not {}", raw, expected),
        })
}
