//! INI file configuration adapter.
//!
//! Section and key names are case-insensitive. Empty values count as missing.

use crate::domain::error::TradecoreError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;
use tracing::debug;

pub struct FileConfigAdapter {
    ini: Ini,
    source: String,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TradecoreError> {
        let source = path.as_ref().display().to_string();
        let mut ini = Ini::new();
        ini.load(path.as_ref())
            .map_err(|reason| TradecoreError::ConfigParse {
                file: source.clone(),
                reason,
            })?;
        debug!(file = %source, sections = ?ini.sections(), "loaded config");
        Ok(Self { ini, source })
    }

    pub fn from_string(content: &str) -> Result<Self, TradecoreError> {
        let source = "<string>".to_string();
        let mut ini = Ini::new();
        ini.read(content.to_string())
            .map_err(|reason| TradecoreError::ConfigParse {
                file: source.clone(),
                reason,
            })?;
        Ok(Self { ini, source })
    }

    /// Where this config was read from, for diagnostics.
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.ini
            .get(section, key)
            .filter(|value| !value.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[data]
dir = /var/data/candles

[Metrics]
Initial_Capital = 100000.5
risk_free_rate = 0.02
profit_factor_cap =
trading_days_per_year = lots

[report]
output = results/report.json
pretty = No
compact = maybe
"#;

    fn sample() -> FileConfigAdapter {
        FileConfigAdapter::from_string(SAMPLE).unwrap()
    }

    #[test]
    fn reads_strings_case_insensitively() {
        let config = sample();
        assert_eq!(config.get_string("data", "dir"), Some("/var/data/candles".to_string()));
        assert_eq!(config.get_string("metrics", "initial_capital"), Some("100000.5".to_string()));
        assert_eq!(config.get_string("report", "missing"), None);
        assert_eq!(config.get_string("missing_section", "dir"), None);
    }

    #[test]
    fn empty_value_is_missing() {
        let config = sample();
        assert_eq!(config.get_string("metrics", "profit_factor_cap"), None);
        assert_eq!(config.get_f64("metrics", "profit_factor_cap").unwrap(), None);
    }

    #[test]
    fn parses_numbers() {
        let config = sample();
        assert_eq!(config.get_f64("metrics", "initial_capital").unwrap(), Some(100000.5));
        assert_eq!(config.get_f64("metrics", "risk_free_rate").unwrap(), Some(0.02));
        assert_eq!(config.get_f64("metrics", "absent").unwrap(), None);
    }

    #[test]
    fn bad_number_names_the_key() {
        let err = sample().get_f64("metrics", "trading_days_per_year").unwrap_err();
        match err {
            TradecoreError::ConfigInvalid { section, key, reason } => {
                assert_eq!(section, "metrics");
                assert_eq!(key, "trading_days_per_year");
                assert!(reason.contains("lots"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn parses_booleans() {
        let config = FileConfigAdapter::from_string("[report]\na = TRUE\nb = on\nc = 0\n").unwrap();
        assert_eq!(config.get_bool("report", "a").unwrap(), Some(true));
        assert_eq!(config.get_bool("report", "b").unwrap(), Some(true));
        assert_eq!(config.get_bool("report", "c").unwrap(), Some(false));
        assert_eq!(sample().get_bool("report", "pretty").unwrap(), Some(false));
        assert!(sample().get_bool("report", "compact").is_err());
    }

    #[test]
    fn from_file_records_source() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[report]\noutput = /tmp/metrics.json\n").unwrap();
        let config = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(config.source(), file.path().display().to_string());
        assert_eq!(config.get_string("report", "output"), Some("/tmp/metrics.json".to_string()));
        assert_eq!(sample().source(), "<string>");
    }

    #[test]
    fn missing_file_is_a_parse_error() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/config.ini");
        assert!(matches!(result, Err(TradecoreError::ConfigParse { .. })));
    }
}
