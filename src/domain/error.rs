//! Domain error types.

use crate::domain::universe::UniverseError;

/// Failure of a pure pattern predicate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PatternError {
    #[error("have {bars} bars, need {required}")]
    InsufficientData { bars: usize, required: usize },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },
}

/// Top-level error type for barscreen.
#[derive(Debug, thiserror::Error)]
pub enum ScreenerError {
    #[error("insufficient data for {symbol}: have {bars} bars, need {required}")]
    InsufficientData {
        symbol: String,
        bars: usize,
        required: usize,
    },

    #[error("data unavailable for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

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

    #[error(transparent)]
    Universe(#[from] UniverseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ScreenerError {
    pub fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        ScreenerError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub fn data_unavailable(symbol: &str, reason: impl Into<String>) -> Self {
        ScreenerError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }

    /// Attach a symbol to a predicate failure.
    pub fn from_pattern(symbol: &str, err: PatternError) -> Self {
        match err {
            PatternError::InsufficientData { bars, required } => ScreenerError::InsufficientData {
                symbol: symbol.to_string(),
                bars,
                required,
            },
            PatternError::InvalidParameter { name, reason } => {
                ScreenerError::InvalidParameter { name, reason }
            }
        }
    }
}

impl From<&ScreenerError> for std::process::ExitCode {
    fn from(err: &ScreenerError) -> Self {
        let code: u8 = match err {
            ScreenerError::Io(_) => 1,
            ScreenerError::ConfigParse { .. }
            | ScreenerError::ConfigMissing { .. }
            | ScreenerError::ConfigInvalid { .. } => 2,
            ScreenerError::InvalidParameter { .. } => 3,
            ScreenerError::Universe(_) => 4,
            ScreenerError::DataUnavailable { .. } | ScreenerError::InsufficientData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
