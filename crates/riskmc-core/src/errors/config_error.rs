//! Configuration errors.

use super::error_code::{self, ErrorCategory, RiskErrorCode};

/// Errors raised while loading configuration or configuring a run.
/// All are non-recoverable and reported before any sampling.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("Config parse error in {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Config validation failed for {field}: {message}")]
    ValidationFailed { field: String, message: String },

    #[error("Iteration count {requested} is below the floor of {floor}")]
    IterationsBelowFloor { requested: u32, floor: u32 },

    #[error("Correlation matrix is {matrix}x{matrix} but the run has {risks} risks")]
    MatrixSizeMismatch { matrix: usize, risks: usize },

    #[error("A simulation run needs at least one risk")]
    EmptyRiskSet,

    #[error("Duplicate risk id '{id}'")]
    DuplicateRiskId { id: String },

    #[error("Invalid config value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl RiskErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        error_code::CONFIG_ERROR
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }

    fn field(&self) -> Option<String> {
        match self {
            Self::FileNotFound { path } | Self::ParseError { path, .. } => Some(path.clone()),
            Self::ValidationFailed { field, .. } | Self::InvalidValue { field, .. } => {
                Some(field.clone())
            }
            Self::IterationsBelowFloor { .. } => Some("simulation.iterations".to_string()),
            Self::MatrixSizeMismatch { .. } => Some("correlation_matrix".to_string()),
            Self::EmptyRiskSet => Some("risks".to_string()),
            Self::DuplicateRiskId { id } => Some(format!("risks[{id}].id")),
        }
    }
}
