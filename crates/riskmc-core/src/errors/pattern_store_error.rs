//! Historical pattern store errors.

use super::error_code::{self, ErrorCategory, RiskErrorCode};

/// Errors surfaced by a `HistoricalPatternStore` implementation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PatternStoreError {
    #[error("Pattern store '{store}' is unavailable: {reason}")]
    Unavailable { store: String, reason: String },

    #[error("No historical outcomes for archetype '{archetype}'")]
    NotFound { archetype: String },
}

impl RiskErrorCode for PatternStoreError {
    fn error_code(&self) -> &'static str {
        error_code::DATA_UNAVAILABLE
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Unavailable { .. } => ErrorCategory::DataUnavailable,
            Self::NotFound { .. } => ErrorCategory::InsufficientData,
        }
    }

    fn field(&self) -> Option<String> {
        match self {
            Self::Unavailable { store, .. } => Some(store.clone()),
            Self::NotFound { archetype } => Some(format!("archetype[{archetype}]")),
        }
    }
}
