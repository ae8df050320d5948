//! Numerical failures discovered while sampling.

use super::error_code::{self, ErrorCategory, RiskErrorCode};
use super::CorrelationError;

/// A numerical failure that aborts the run. Never replaced with a default.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ComputationError {
    #[error("Risk '{risk_id}' produced a non-finite draw ({value}) at iteration {iteration}")]
    NonFiniteSample {
        risk_id: String,
        iteration: usize,
        value: f64,
    },

    #[error("{outcome} total is not finite at iteration {iteration}")]
    NonFiniteTotal { outcome: &'static str, iteration: usize },

    #[error("Correlation decomposition failed: {0}")]
    Decomposition(#[from] CorrelationError),

    #[error("Worker pool could not be built: {0}")]
    WorkerPool(String),
}

impl RiskErrorCode for ComputationError {
    fn error_code(&self) -> &'static str {
        error_code::COMPUTATION_ERROR
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Computation
    }

    fn field(&self) -> Option<String> {
        match self {
            Self::NonFiniteSample { risk_id, .. } => Some(format!("risks[{risk_id}].distribution")),
            Self::NonFiniteTotal { outcome, .. } => Some((*outcome).to_string()),
            Self::Decomposition(e) => e.field(),
            Self::WorkerPool(_) => Some("simulation.threads".to_string()),
        }
    }
}
