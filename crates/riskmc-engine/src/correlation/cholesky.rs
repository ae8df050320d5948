//! Cholesky factorisation for positive semi-definite correlation matrices.

use serde::Serialize;

use riskmc_core::constants::CHOLESKY_PIVOT_EPSILON;
use riskmc_core::errors::CorrelationError;

use super::matrix::CorrelationMatrix;

/// Off-diagonal residual tolerated below a zero pivot.
const ZERO_PIVOT_RESIDUAL: f64 = 1e-8;

/// Lower-triangular L with L·Lᵗ = M.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CholeskyFactor {
    dim: usize,
    /// Row-major, upper triangle zero.
    lower: Vec<f64>,
}

/// Decompose a validated matrix. Computed once per run.
pub fn decompose(matrix: &CorrelationMatrix) -> Result<CholeskyFactor, CorrelationError> {
    let n = matrix.dim();
    let flat: Vec<f64> = (0..n).flat_map(|i| matrix.row(i).to_vec()).collect();
    factorize(&flat, n)
}

/// Column-by-column Cholesky–Banachiewicz.
///
/// A pivot within `CHOLESKY_PIVOT_EPSILON` of zero (perfect correlation)
/// yields a zero column, provided the entries below it are consistent.
pub(crate) fn factorize(a: &[f64], n: usize) -> Result<CholeskyFactor, CorrelationError> {
    let mut l = vec![0.0; n * n];
    for j in 0..n {
        let sum: f64 = (0..j).map(|k| l[j * n + k] * l[j * n + k]).sum();
        let pivot = a[j * n + j] - sum;
        if pivot < -CHOLESKY_PIVOT_EPSILON || pivot.is_nan() {
            return Err(CorrelationError::NotPositiveSemiDefinite { pivot: j, value: pivot });
        }

        if pivot <= CHOLESKY_PIVOT_EPSILON {
            for i in (j + 1)..n {
                let residual = a[i * n + j] - (0..j).map(|k| l[i * n + k] * l[j * n + k]).sum::<f64>();
                if residual.abs() > ZERO_PIVOT_RESIDUAL {
                    return Err(CorrelationError::NotPositiveSemiDefinite { pivot: j, value: pivot });
                }
            }
            continue;
        }

        let diag = pivot.sqrt();
        l[j * n + j] = diag;
        for i in (j + 1)..n {
            let dot: f64 = (0..j).map(|k| l[i * n + k] * l[j * n + k]).sum();
            l[i * n + j] = (a[i * n + j] - dot) / diag;
        }
    }
    Ok(CholeskyFactor { dim: n, lower: l })
}

impl CholeskyFactor {
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.lower[row * self.dim + col]
    }

    /// L·z.
    pub fn correlate(&self, z: &[f64]) -> Result<Vec<f64>, CorrelationError> {
        let mut out = vec![0.0; self.dim];
        self.correlate_into(z, &mut out)?;
        Ok(out)
    }

    /// L·z written into `out`, reusing its allocation across iterations.
    pub fn correlate_into(&self, z: &[f64], out: &mut [f64]) -> Result<(), CorrelationError> {
        if z.len() != self.dim || out.len() != self.dim {
            return Err(CorrelationError::DimensionMismatch {
                expected: self.dim,
                actual: if z.len() != self.dim { z.len() } else { out.len() },
            });
        }
        for (i, slot) in out.iter_mut().enumerate() {
            let row = &self.lower[i * self.dim..i * self.dim + i + 1];
            *slot = row.iter().zip(z).map(|(l, z)| l * z).sum();
        }
        Ok(())
    }

    /// L·Lᵗ, row-major.
    pub fn reconstruct(&self) -> Vec<Vec<f64>> {
        let n = self.dim;
        (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| (0..=i.min(j)).map(|k| self.get(i, k) * self.get(j, k)).sum())
                    .collect()
            })
            .collect()
    }
}
