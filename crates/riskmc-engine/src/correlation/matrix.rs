//! Validated correlation matrices.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use riskmc_core::constants::CORRELATION_EPSILON;
use riskmc_core::errors::CorrelationError;

use super::cholesky;
use crate::model::Risk;

/// A square, symmetric, unit-diagonal, positive semi-definite matrix.
///
/// Construction runs the full validation, so a value of this type is always
/// safe to decompose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct CorrelationMatrix {
    dim: usize,
    /// Row-major entries.
    entries: Vec<f64>,
}

impl CorrelationMatrix {
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self, CorrelationError> {
        validate(&rows)?;
        let dim = rows.len();
        Ok(Self {
            dim,
            entries: rows.into_iter().flatten().collect(),
        })
    }

    /// Independent risks.
    pub fn identity(dim: usize) -> Self {
        let mut entries = vec![0.0; dim * dim];
        for i in 0..dim {
            entries[i * dim + i] = 1.0;
        }
        Self { dim, entries }
    }

    /// Risks sharing a `correlation_group` get `coefficient`; all other
    /// off-diagonal entries are zero.
    pub fn from_groups(risks: &[Arc<Risk>], coefficient: f64) -> Result<Self, CorrelationError> {
        let n = risks.len();
        let mut by_group: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (i, risk) in risks.iter().enumerate() {
            if let Some(group) = risk.correlation_group() {
                by_group.entry(group).or_default().push(i);
            }
        }
        if !coefficient.is_finite() || !(-1.0..=1.0).contains(&coefficient) {
            let group = by_group.keys().next().copied().unwrap_or_default().to_string();
            return Err(CorrelationError::InvalidGroupCoefficient {
                group,
                value: coefficient,
            });
        }

        let mut rows = vec![vec![0.0; n]; n];
        for (i, row) in rows.iter_mut().enumerate() {
            row[i] = 1.0;
        }
        for members in by_group.values() {
            for &a in members {
                for &b in members {
                    if a != b {
                        rows[a][b] = coefficient;
                    }
                }
            }
        }
        Self::new(rows)
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        (row < self.dim && col < self.dim).then(|| self.entries[row * self.dim + col])
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.entries[row * self.dim..(row + 1) * self.dim]
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.entries.chunks(self.dim.max(1)).map(<[f64]>::to_vec).collect()
    }
}

impl TryFrom<Vec<Vec<f64>>> for CorrelationMatrix {
    type Error = CorrelationError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        Self::new(rows)
    }
}

impl From<CorrelationMatrix> for Vec<Vec<f64>> {
    fn from(matrix: CorrelationMatrix) -> Self {
        matrix.to_rows()
    }
}

/// Check shape, entries, symmetry and positive semi-definiteness.
///
/// Entry checks run in row-major order, so the first offending pair is the
/// one reported.
pub fn validate(rows: &[Vec<f64>]) -> Result<(), CorrelationError> {
    let n = rows.len();
    if n == 0 {
        return Err(CorrelationError::Empty);
    }
    for (row, values) in rows.iter().enumerate() {
        if values.len() != n {
            return Err(CorrelationError::NotSquare {
                row,
                len: values.len(),
                expected: n,
            });
        }
    }

    for (row, values) in rows.iter().enumerate() {
        for (col, &value) in values.iter().enumerate() {
            if !value.is_finite() {
                return Err(CorrelationError::NonFinite { row, col });
            }
            if !(-1.0..=1.0).contains(&value) {
                return Err(CorrelationError::OutOfRange { row, col, value });
            }
        }
    }

    for (index, values) in rows.iter().enumerate() {
        if (values[index] - 1.0).abs() > CORRELATION_EPSILON {
            return Err(CorrelationError::DiagonalNotOne {
                index,
                value: values[index],
            });
        }
    }

    for row in 0..n {
        for col in (row + 1)..n {
            let (upper, lower) = (rows[row][col], rows[col][row]);
            if (upper - lower).abs() >= CORRELATION_EPSILON {
                return Err(CorrelationError::Asymmetric {
                    row,
                    col,
                    upper,
                    lower,
                });
            }
        }
    }

    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    cholesky::factorize(&flat, n).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::ProbabilityDistribution;

    #[test]
    fn test_out_of_range_names_pair() {
        let err = CorrelationMatrix::new(vec![vec![1.0, 1.5], vec![1.5, 1.0]]).unwrap_err();
        assert_eq!(err.pair(), Some((0, 1)));
    }

    #[test]
    fn test_asymmetric_rejected() {
        let err = validate(&[vec![1.0, 0.3], vec![0.2, 1.0]]).unwrap_err();
        assert!(matches!(err, CorrelationError::Asymmetric { row: 0, col: 1, .. }));
    }

    #[test]
    fn test_not_psd_rejected() {
        let rows = vec![
            vec![1.0, 0.9, -0.9],
            vec![0.9, 1.0, 0.9],
            vec![-0.9, 0.9, 1.0],
        ];
        assert!(matches!(
            validate(&rows),
            Err(CorrelationError::NotPositiveSemiDefinite { .. })
        ));
    }

    #[test]
    fn test_perfect_correlation_is_accepted() {
        assert!(CorrelationMatrix::new(vec![vec![1.0, 1.0], vec![1.0, 1.0]]).is_ok());
    }

    #[test]
    fn test_from_groups() {
        let dist = ProbabilityDistribution::uniform(0.0, 1.0).unwrap();
        let risks: Vec<Arc<Risk>> = ["a", "b", "c"]
            .iter()
            .zip([Some("supply"), None, Some("supply")])
            .map(|(id, group)| {
                let risk = Risk::cost(*id, dist).unwrap();
                Arc::new(match group {
                    Some(g) => risk.with_correlation_group(g),
                    None => risk,
                })
            })
            .collect();
        let m = CorrelationMatrix::from_groups(&risks, 0.4).unwrap();
        assert_eq!(m.get(0, 2), Some(0.4));
        assert_eq!(m.get(0, 1), Some(0.0));
        assert_eq!(m.get(1, 1), Some(1.0));
    }
}
