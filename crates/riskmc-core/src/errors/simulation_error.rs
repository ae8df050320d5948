//! Run-level errors aggregating subsystem failures.

use super::error_code::{self, ErrorCategory, RiskErrorCode};
use super::{ComputationError, ConfigError, CorrelationError, ValidationError};

/// Errors that can terminate a simulation run.
/// Aggregates subsystem errors via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Correlation error: {0}")]
    Correlation(#[from] CorrelationError),

    #[error("Computation error: {0}")]
    Computation(#[from] ComputationError),

    #[error(
        "Time budget of {budget_ms} ms exhausted after {completed} iterations \
         (minimum {required})"
    )]
    TimedOut {
        completed: usize,
        required: usize,
        budget_ms: u64,
    },

    #[error("Simulation cancelled")]
    Cancelled,
}

impl RiskErrorCode for SimulationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Config(e) => e.error_code(),
            Self::Validation(e) => e.error_code(),
            Self::Correlation(e) => e.error_code(),
            Self::Computation(e) => e.error_code(),
            Self::TimedOut { .. } => error_code::TIMED_OUT,
            Self::Cancelled => error_code::CANCELLED,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(e) => e.category(),
            Self::Validation(e) => e.category(),
            Self::Correlation(e) => e.category(),
            Self::Computation(e) => e.category(),
            Self::TimedOut { .. } => ErrorCategory::TimedOut,
            Self::Cancelled => ErrorCategory::Cancelled,
        }
    }

    fn field(&self) -> Option<String> {
        match self {
            Self::Config(e) => e.field(),
            Self::Validation(e) => e.field(),
            Self::Correlation(e) => e.field(),
            Self::Computation(e) => e.field(),
            Self::TimedOut { .. } => Some("simulation.time_budget_secs".to_string()),
            Self::Cancelled => None,
        }
    }
}
