//! Machine-readable error codes and categories.

use serde::{Deserialize, Serialize};

/// Failure category used by callers and the recovery layer to decide what
/// to do with an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Invalid run setup. Rejected before sampling.
    Configuration,
    /// Invalid distribution parameters or correlation entries.
    Validation,
    /// Numerical failure during a run.
    Computation,
    /// Run finished without meeting the convergence tolerance.
    Convergence,
    /// Time budget exhausted before the minimum iteration count.
    TimedOut,
    /// Caller requested cancellation.
    Cancelled,
    /// Too few samples to estimate parameters.
    InsufficientData,
    /// An external data source could not be reached.
    DataUnavailable,
}

impl ErrorCategory {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Validation => "validation",
            Self::Computation => "computation",
            Self::Convergence => "convergence",
            Self::TimedOut => "timed_out",
            Self::Cancelled => "cancelled",
            Self::InsufficientData => "insufficient_data",
            Self::DataUnavailable => "data_unavailable",
        }
    }

    /// Whether the engine itself can recover (retry, fall back, or accept a
    /// qualified result) without the caller resubmitting input.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Convergence | Self::InsufficientData | Self::DataUnavailable
        )
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Trait implemented by every riskmc error enum.
///
/// Gives callers a stable code, a category, and the field at fault so a UI
/// can render guidance without parsing messages.
pub trait RiskErrorCode {
    /// Returns the error code string (e.g., "CORRELATION_ERROR").
    fn error_code(&self) -> &'static str;

    /// Returns the failure category.
    fn category(&self) -> ErrorCategory;

    /// Returns the offending field or parameter, when one can be named.
    fn field(&self) -> Option<String> {
        None
    }

    /// Returns the formatted error string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }

    /// Build a serializable report of this error.
    fn report(&self) -> ErrorReport
    where
        Self: std::fmt::Display,
    {
        ErrorReport {
            code: self.error_code(),
            category: self.category(),
            message: self.to_string(),
            field: self.field(),
        }
    }
}

/// Serializable snapshot of an error for the reporting boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub code: &'static str,
    pub category: ErrorCategory,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

// Error code constants.
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
pub const INSUFFICIENT_DATA: &str = "INSUFFICIENT_DATA";
pub const FIT_ERROR: &str = "FIT_ERROR";
pub const CORRELATION_ERROR: &str = "CORRELATION_ERROR";
pub const COMPUTATION_ERROR: &str = "COMPUTATION_ERROR";
pub const CONVERGENCE_ERROR: &str = "CONVERGENCE_ERROR";
pub const TIMED_OUT: &str = "TIMED_OUT";
pub const CANCELLED: &str = "CANCELLED";
pub const ANALYSIS_ERROR: &str = "ANALYSIS_ERROR";
pub const SCENARIO_ERROR: &str = "SCENARIO_ERROR";
pub const UNDEFINED_ROI: &str = "UNDEFINED_ROI";
pub const DATA_UNAVAILABLE: &str = "DATA_UNAVAILABLE";
