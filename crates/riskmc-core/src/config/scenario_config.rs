//! Scenario generator configuration.

use serde::{Deserialize, Serialize};

use crate::constants;

/// Configuration for sensitivity analysis and scenario runs.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Fraction by which sensitivity analysis perturbs each risk. Default: 0.10.
    pub perturbation_fraction: Option<f64>,
    /// Run sensitivity perturbations on the rayon pool. Default: true.
    pub parallel: Option<bool>,
}

impl ScenarioConfig {
    /// Returns the effective perturbation fraction, defaulting to 0.10.
    pub fn effective_perturbation_fraction(&self) -> f64 {
        self.perturbation_fraction
            .unwrap_or(constants::DEFAULT_PERTURBATION_FRACTION)
    }

    /// Returns whether scenario runs are parallel, defaulting to true.
    pub fn effective_parallel(&self) -> bool {
        self.parallel.unwrap_or(true)
    }
}
