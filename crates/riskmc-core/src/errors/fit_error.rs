//! Distribution fitting errors.

use super::error_code::{self, ErrorCategory, RiskErrorCode};
use super::{PatternStoreError, ValidationError};

/// Errors raised while estimating distribution parameters from samples.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FitError {
    #[error("Insufficient data: {required} samples required, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("Sample {index} is not finite")]
    NonFiniteSample { index: usize },

    #[error("Cannot fit {family}: {reason}")]
    Degenerate { family: &'static str, reason: String },

    #[error("Fitted parameters rejected: {0}")]
    Invalid(#[from] ValidationError),

    #[error("Historical data source failed: {0}")]
    Source(#[from] PatternStoreError),
}

impl RiskErrorCode for FitError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientData { .. } => error_code::INSUFFICIENT_DATA,
            Self::Invalid(e) => e.error_code(),
            Self::Source(e) => e.error_code(),
            _ => error_code::FIT_ERROR,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::InsufficientData { .. } => ErrorCategory::InsufficientData,
            Self::Source(e) => e.category(),
            _ => ErrorCategory::Validation,
        }
    }

    fn field(&self) -> Option<String> {
        match self {
            Self::NonFiniteSample { index } => Some(format!("samples[{index}]")),
            Self::InsufficientData { .. } => Some("samples".to_string()),
            Self::Degenerate { family, .. } => Some((*family).to_string()),
            Self::Invalid(e) => e.field(),
            Self::Source(e) => e.field(),
        }
    }
}
