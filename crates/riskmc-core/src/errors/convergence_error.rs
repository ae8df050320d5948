//! Convergence qualification errors.

use super::error_code::{self, ErrorCategory, RiskErrorCode};

/// A run reached its iteration count without satisfying the convergence
/// tolerance. The values are still available on the result; this error is
/// only produced when a caller asks for a converged result.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error(
    "Run did not converge after {iterations} iterations \
     (last relative change {last_relative_change:.6}, tolerance {tolerance})"
)]
pub struct ConvergenceError {
    pub iterations: usize,
    pub last_relative_change: f64,
    pub tolerance: f64,
}

impl RiskErrorCode for ConvergenceError {
    fn error_code(&self) -> &'static str {
        error_code::CONVERGENCE_ERROR
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Convergence
    }

    fn field(&self) -> Option<String> {
        Some("simulation.iterations".to_string())
    }
}
