//! Distribution and risk parameter validation errors.

use super::error_code::{self, ErrorCategory, RiskErrorCode};

/// Raised when a distribution or risk is constructed with parameters that
/// violate its mathematical constraints. Parameters are never clamped.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{family}.{parameter} = {value}: {reason}")]
    InvalidParameter {
        family: &'static str,
        parameter: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("{family} requires {lower_name} <= {upper_name}, got {lower} > {upper}")]
    OrderingViolation {
        family: &'static str,
        lower_name: &'static str,
        upper_name: &'static str,
        lower: f64,
        upper: f64,
    },

    #[error("risk '{risk_id}': {field} = {value}: {reason}")]
    InvalidRiskField {
        risk_id: String,
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("risk id must not be empty")]
    EmptyRiskId,
}

impl RiskErrorCode for ValidationError {
    fn error_code(&self) -> &'static str {
        error_code::VALIDATION_ERROR
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Validation
    }

    fn field(&self) -> Option<String> {
        match self {
            Self::InvalidParameter {
                family, parameter, ..
            } => Some(format!("{family}.{parameter}")),
            Self::OrderingViolation {
                family, lower_name, ..
            } => Some(format!("{family}.{lower_name}")),
            Self::InvalidRiskField { risk_id, field, .. } => Some(format!("risks[{risk_id}].{field}")),
            Self::EmptyRiskId => Some("id".to_string()),
        }
    }
}
