//! Results analysis errors.

use super::error_code::{self, ErrorCategory, RiskErrorCode};
use super::SimulationError;

/// Errors raised by the pure statistics over a result vector, and by the
/// re-runs behind risk-contribution analysis.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Outcome vector is empty")]
    EmptyVector,

    #[error("Outcome vector contains a non-finite value at index {index}")]
    NonFiniteValue { index: usize },

    #[error("Level {level} is outside {range}")]
    InvalidLevel { level: f64, range: &'static str },

    #[error("Comparison needs at least 2 values per sample, got {actual}")]
    InsufficientSamples { actual: usize },

    #[error("Both samples have zero variance; the t statistic is undefined")]
    ZeroVariance,

    #[error("Histogram needs at least one bin")]
    NoBins,

    #[error("Contribution re-run failed: {0}")]
    Simulation(#[from] SimulationError),
}

impl RiskErrorCode for AnalysisError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Simulation(e) => e.error_code(),
            _ => error_code::ANALYSIS_ERROR,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Simulation(e) => e.category(),
            Self::InsufficientSamples { .. } => ErrorCategory::InsufficientData,
            Self::ZeroVariance => ErrorCategory::Computation,
            _ => ErrorCategory::Validation,
        }
    }

    fn field(&self) -> Option<String> {
        match self {
            Self::NonFiniteValue { index } => Some(format!("values[{index}]")),
            Self::InvalidLevel { .. } => Some("levels".to_string()),
            Self::NoBins => Some("bins".to_string()),
            Self::Simulation(e) => e.field(),
            _ => None,
        }
    }
}
