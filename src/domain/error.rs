//! Error type for the I/O edges of the crate.
//!
//! The numeric core never fails; these errors come from adapters and the CLI.

/// Top-level error type for tradecore.
#[derive(Debug, thiserror::Error)]
pub enum TradecoreError {
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

    #[error("data error in {source_name}: {reason}")]
    Data { source_name: String, reason: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("invalid strategy: {}", .errors.join("; "))]
    InvalidStrategy { errors: Vec<String> },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&TradecoreError> for std::process::ExitCode {
    fn from(err: &TradecoreError) -> Self {
        let code: u8 = match err {
            TradecoreError::Io(_) => 1,
            TradecoreError::ConfigParse { .. }
            | TradecoreError::ConfigMissing { .. }
            | TradecoreError::ConfigInvalid { .. } => 2,
            TradecoreError::Data { .. } | TradecoreError::NoData { .. } => 3,
            TradecoreError::Json(_) | TradecoreError::InvalidStrategy { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::ExitCode;

    #[test]
    fn invalid_strategy_lists_every_error() {
        let err = TradecoreError::InvalidStrategy {
            errors: vec!["name must not be empty".into(), "bad period".into()],
        };
        assert_eq!(err.to_string(), "invalid strategy: name must not be empty; bad period");
    }

    #[test]
    fn exit_codes_group_by_kind() {
        let missing = TradecoreError::ConfigMissing {
            section: "metrics".into(),
            key: "initial_capital".into(),
        };
        // ExitCode has no PartialEq
        assert_eq!(format!("{:?}", ExitCode::from(&missing)), format!("{:?}", ExitCode::from(2)));
        let no_data = TradecoreError::NoData { symbol: "BHP".into() };
        assert_eq!(format!("{:?}", ExitCode::from(&no_data)), format!("{:?}", ExitCode::from(3)));
    }
}
