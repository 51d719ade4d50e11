//! Domain error types.

/// Top-level error type for retrocast.
#[derive(Debug, thiserror::Error)]
pub enum RetrocastError {
    #[error("unsupported indicator: {name}")]
    InvalidIndicator { name: String },

    #[error("invalid parameters for {indicator}: {reason}")]
    InvalidParameters { indicator: String, reason: String },

    #[error("invalid scenario field {field}: {reason}")]
    InvalidScenario { field: String, reason: String },

    #[error("data source {source_name} unavailable: {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    #[error("no data for {ticker} from {source_name}")]
    NoData { ticker: String, source_name: String },

    #[error("malformed price data: {reason}")]
    DataFormat { reason: String },

    #[error("not enough data: got {bars} bars, need at least {minimum}; try a wider date range or a different ticker")]
    InsufficientData { bars: usize, minimum: usize },

    #[error("storage error: {reason}")]
    Storage { reason: String },

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
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RetrocastError {
    pub(crate) fn params(indicator: &str, reason: impl Into<String>) -> Self {
        RetrocastError::InvalidParameters {
            indicator: indicator.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn scenario(field: &str, reason: impl Into<String>) -> Self {
        RetrocastError::InvalidScenario {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&RetrocastError> for std::process::ExitCode {
    fn from(err: &RetrocastError) -> Self {
        let code: u8 = match err {
            RetrocastError::Io(_) | RetrocastError::Serialization(_) => 1,
            RetrocastError::ConfigParse { .. }
            | RetrocastError::ConfigMissing { .. }
            | RetrocastError::ConfigInvalid { .. }
            | RetrocastError::InvalidScenario { .. } => 2,
            RetrocastError::Storage { .. } => 3,
            RetrocastError::InvalidIndicator { .. } | RetrocastError::InvalidParameters { .. } => 4,
            RetrocastError::NoData { .. }
            | RetrocastError::DataFormat { .. }
            | RetrocastError::InsufficientData { .. }
            | RetrocastError::SourceUnavailable { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
