//! Correlation matrix errors.

use super::error_code::{self, ErrorCategory, RiskErrorCode};

/// Errors raised while validating or decomposing a correlation matrix.
/// Pair-level variants carry the offending `(row, col)` indices.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CorrelationError {
    #[error("Correlation matrix must be square: row {row} has {len} entries, expected {expected}")]
    NotSquare { row: usize, len: usize, expected: usize },

    #[error("Correlation matrix is empty")]
    Empty,

    #[error("Entry ({row}, {col}) = {value} is outside [-1, 1]")]
    OutOfRange { row: usize, col: usize, value: f64 },

    #[error("Entry ({row}, {col}) is not finite")]
    NonFinite { row: usize, col: usize },

    #[error("Diagonal entry ({index}, {index}) = {value}, expected 1")]
    DiagonalNotOne { index: usize, value: f64 },

    #[error("Matrix is not symmetric at ({row}, {col}): {upper} vs {lower}")]
    Asymmetric {
        row: usize,
        col: usize,
        upper: f64,
        lower: f64,
    },

    #[error("Matrix is not positive semi-definite (Cholesky pivot {pivot} = {value})")]
    NotPositiveSemiDefinite { pivot: usize, value: f64 },

    #[error("Vector of length {actual} does not match factor dimension {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Correlation coefficient {value} for group '{group}' is outside [-1, 1]")]
    InvalidGroupCoefficient { group: String, value: f64 },
}

impl CorrelationError {
    /// The offending `(row, col)` pair, when the failure is pair-specific.
    pub fn pair(&self) -> Option<(usize, usize)> {
        match self {
            Self::OutOfRange { row, col, .. }
            | Self::NonFinite { row, col }
            | Self::Asymmetric { row, col, .. } => Some((*row, *col)),
            Self::DiagonalNotOne { index, .. } => Some((*index, *index)),
            _ => None,
        }
    }
}

impl RiskErrorCode for CorrelationError {
    fn error_code(&self) -> &'static str {
        error_code::CORRELATION_ERROR
    }

    fn category(&self) -> ErrorCategory {
        match self {
            // Only discoverable by running the factorization.
            Self::NotPositiveSemiDefinite { .. } => ErrorCategory::Computation,
            _ => ErrorCategory::Validation,
        }
    }

    fn field(&self) -> Option<String> {
        match self.pair() {
            Some((row, col)) => Some(format!("correlation_matrix[{row}][{col}]")),
            None => match self {
                Self::NotPositiveSemiDefinite { pivot, .. } => {
                    Some(format!("correlation_matrix[{pivot}][{pivot}]"))
                }
                Self::InvalidGroupCoefficient { group, .. } => {
                    Some(format!("correlation_group[{group}]"))
                }
                _ => Some("correlation_matrix".to_string()),
            },
        }
    }
}
