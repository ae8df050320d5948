//! Results analysis configuration.

use serde::{Deserialize, Serialize};

use crate::constants;

/// Configuration for the results analyzer.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Percentile levels in (0, 100). Default: 10, 25, 50, 75, 90, 95, 99.
    #[serde(default)]
    pub percentile_levels: Vec<f64>,
    /// Confidence interval levels in (0, 1). Default: 0.80, 0.90, 0.95.
    #[serde(default)]
    pub confidence_levels: Vec<f64>,
    /// Number of ranked risk contributions returned. Default: 10.
    pub top_n_contributions: Option<usize>,
    /// Allowed deviation of summed contribution shares from 1.0. Default: 0.05.
    pub normalization_tolerance: Option<f64>,
    /// Significance level for scenario comparison. Default: 0.05.
    pub significance_alpha: Option<f64>,
}

impl AnalysisConfig {
    /// Returns the effective percentile levels.
    pub fn effective_percentile_levels(&self) -> Vec<f64> {
        if self.percentile_levels.is_empty() {
            constants::DEFAULT_PERCENTILE_LEVELS.to_vec()
        } else {
            self.percentile_levels.clone()
        }
    }

    /// Returns the effective confidence levels.
    pub fn effective_confidence_levels(&self) -> Vec<f64> {
        if self.confidence_levels.is_empty() {
            constants::DEFAULT_CONFIDENCE_LEVELS.to_vec()
        } else {
            self.confidence_levels.clone()
        }
    }

    /// Returns the effective top-N, defaulting to 10.
    pub fn effective_top_n(&self) -> usize {
        self.top_n_contributions
            .unwrap_or(constants::DEFAULT_TOP_N_CONTRIBUTIONS)
    }

    /// Returns the effective normalization tolerance, defaulting to 0.05.
    pub fn effective_normalization_tolerance(&self) -> f64 {
        self.normalization_tolerance
            .unwrap_or(constants::DEFAULT_NORMALIZATION_TOLERANCE)
    }

    /// Returns the effective significance level, defaulting to 0.05.
    pub fn effective_significance_alpha(&self) -> f64 {
        self.significance_alpha
            .unwrap_or(constants::DEFAULT_SIGNIFICANCE_ALPHA)
    }
}
