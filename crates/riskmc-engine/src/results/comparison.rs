//! Welch's unequal-variance t-test between two outcome vectors.

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};

use riskmc_core::errors::AnalysisError;

use super::summary::{mean, variance};
use crate::simulation::{OutcomeType, SimulationResult};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub n_a: usize,
    pub n_b: usize,
    pub mean_a: f64,
    pub mean_b: f64,
    /// mean_b − mean_a.
    pub mean_difference: f64,
    pub std_error: f64,
    pub t_statistic: f64,
    /// Welch–Satterthwaite degrees of freedom.
    pub degrees_of_freedom: f64,
    /// Two-sided.
    pub p_value: f64,
}

impl ComparisonReport {
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

/// Compare one outcome of two results. Neither result is modified.
pub fn compare(
    a: &SimulationResult,
    b: &SimulationResult,
    outcome: OutcomeType,
) -> Result<ComparisonReport, AnalysisError> {
    welch_t_test(a.outcome(outcome), b.outcome(outcome))
}

pub fn welch_t_test(a: &[f64], b: &[f64]) -> Result<ComparisonReport, AnalysisError> {
    for sample in [a, b] {
        if sample.len() < 2 {
            return Err(AnalysisError::InsufficientSamples { actual: sample.len() });
        }
    }
    let (n_a, n_b) = (a.len() as f64, b.len() as f64);
    let (mean_a, mean_b) = (mean(a)?, mean(b)?);
    let (se_a, se_b) = (variance(a)? / n_a, variance(b)? / n_b);
    let std_error = (se_a + se_b).sqrt();
    if std_error == 0.0 {
        return Err(AnalysisError::ZeroVariance);
    }

    let mean_difference = mean_b - mean_a;
    let t_statistic = mean_difference / std_error;
    let degrees_of_freedom =
        (se_a + se_b).powi(2) / (se_a.powi(2) / (n_a - 1.0) + se_b.powi(2) / (n_b - 1.0));
    let t = StudentsT::new(0.0, 1.0, degrees_of_freedom).map_err(|_| AnalysisError::ZeroVariance)?;
    let p_value = (2.0 * t.sf(t_statistic.abs())).min(1.0);

    Ok(ComparisonReport {
        n_a: a.len(),
        n_b: b.len(),
        mean_a,
        mean_b,
        mean_difference,
        std_error,
        t_statistic,
        degrees_of_freedom,
        p_value,
    })
}
