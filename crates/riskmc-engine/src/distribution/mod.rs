//! Distribution Modeler: sampleable probability distributions.
//!
//! Closed enum over five families with validated construction, three-point
//! estimates, fitting from historical samples, and deterministic
//! inverse-transform sampling for the Gaussian copula.

pub mod calibration;
pub mod fit;
pub mod three_point;
pub mod types;

pub use calibration::{CalibratedDistribution, CalibrationRequest, CalibrationSource, Calibrator};
pub use fit::{fit, fit_best, fit_family, ks_statistic, FitReport};
pub use three_point::{from_three_point, ThreePointEstimate};
pub use types::{DistributionFamily, DistributionSpec, ProbabilityDistribution, Sampler};

use riskmc_core::errors::ValidationError;

/// Validate a raw spec and build a distribution from it.
pub fn build(spec: DistributionSpec) -> Result<ProbabilityDistribution, ValidationError> {
    ProbabilityDistribution::try_from(spec)
}

/// Inverse-transform draw for a uniform variate in [0, 1).
pub fn sample(distribution: &ProbabilityDistribution, u: f64) -> f64 {
    distribution.sample(u)
}
