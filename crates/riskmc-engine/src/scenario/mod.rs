//! Scenario Generator: derived runs, sensitivity and mitigation ROI.

pub mod derive;
pub mod mitigation;
pub mod sensitivity;

pub use derive::{Modification, Scenario};
pub use mitigation::{evaluate_mitigation, MitigationEvaluation, MitigationStrategy};
pub use sensitivity::{
    sensitivity_analysis, sensitivity_analysis_with, SensitivityEntry, SensitivityFailure,
    SensitivityReport,
};
