//! Scenario generation and mitigation errors.

use super::error_code::{self, ErrorCategory, RiskErrorCode};
use super::{AnalysisError, SimulationError, ValidationError};

/// Errors raised while deriving, running, or evaluating scenarios.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("Modification references unknown risk '{id}'")]
    UnknownRisk { id: String },

    #[error("Invalid {field} for risk '{id}': {value}")]
    InvalidModification {
        id: String,
        field: &'static str,
        value: f64,
    },

    #[error("Perturbation fraction {value} must be finite and greater than -1")]
    InvalidPerturbation { value: f64 },

    #[error("ROI is undefined when the cost of mitigation is zero")]
    UndefinedRoi,

    #[error("Mitigation cost {value} must be finite and non-negative")]
    InvalidMitigationCost { value: f64 },

    #[error("Modified risk is invalid: {0}")]
    Validation(#[from] ValidationError),

    #[error("Scenario run failed: {0}")]
    Simulation(#[from] SimulationError),

    #[error("Scenario analysis failed: {0}")]
    Analysis(#[from] AnalysisError),
}

impl RiskErrorCode for ScenarioError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UndefinedRoi => error_code::UNDEFINED_ROI,
            Self::Validation(e) => e.error_code(),
            Self::Simulation(e) => e.error_code(),
            Self::Analysis(e) => e.error_code(),
            _ => error_code::SCENARIO_ERROR,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(e) => e.category(),
            Self::Simulation(e) => e.category(),
            Self::Analysis(e) => e.category(),
            Self::UndefinedRoi => ErrorCategory::Computation,
            _ => ErrorCategory::Validation,
        }
    }

    fn field(&self) -> Option<String> {
        match self {
            Self::UnknownRisk { id } => Some(format!("modifications[{id}]")),
            Self::InvalidModification { id, field, .. } => Some(format!("modifications[{id}].{field}")),
            Self::InvalidPerturbation { .. } => Some("perturbation_fraction".to_string()),
            Self::UndefinedRoi | Self::InvalidMitigationCost { .. } => {
                Some("cost_of_mitigation".to_string())
            }
            Self::Validation(e) => e.field(),
            Self::Simulation(e) => e.field(),
            Self::Analysis(e) => e.field(),
        }
    }
}
