//! Correlation Analyzer: matrix validation, Cholesky factorisation and the
//! Gaussian-copula transform of independent normals.

pub mod cholesky;
pub mod matrix;

pub use cholesky::{decompose, CholeskyFactor};
pub use matrix::{validate, CorrelationMatrix};

use riskmc_core::errors::CorrelationError;

/// Multiply independent standard normals by the lower factor.
pub fn correlate(z: &[f64], factor: &CholeskyFactor) -> Result<Vec<f64>, CorrelationError> {
    factor.correlate(z)
}

/// Standard normal CDF, Φ(z) = erfc(-z / √2) / 2.
pub fn standard_normal_cdf(z: f64) -> f64 {
    0.5 * statrs::function::erf::erfc(-z / std::f64::consts::SQRT_2)
}
