//! Percentiles by linear interpolation over the sorted outcome vector.

use serde::Serialize;

use riskmc_core::errors::AnalysisError;

/// A finite, non-empty outcome vector sorted ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct SortedSamples {
    sorted: Vec<f64>,
}

impl SortedSamples {
    pub fn new(values: &[f64]) -> Result<Self, AnalysisError> {
        if values.is_empty() {
            return Err(AnalysisError::EmptyVector);
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(AnalysisError::NonFiniteValue { index });
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        Ok(Self { sorted })
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.sorted
    }

    pub fn min(&self) -> f64 {
        self.sorted[0]
    }

    pub fn max(&self) -> f64 {
        self.sorted[self.sorted.len() - 1]
    }

    /// Quantile at `p` in [0, 1], interpolating between order statistics
    /// at position p·(n − 1).
    pub fn quantile(&self, p: f64) -> f64 {
        let n = self.sorted.len();
        if n == 1 {
            return self.sorted[0];
        }
        let h = p.clamp(0.0, 1.0) * (n - 1) as f64;
        let lo = h.floor() as usize;
        if lo + 1 >= n {
            return self.sorted[n - 1];
        }
        let g = h - lo as f64;
        (1.0 - g) * self.sorted[lo] + g * self.sorted[lo + 1]
    }

    /// Percentile at `level` in (0, 100).
    pub fn percentile(&self, level: f64) -> Result<f64, AnalysisError> {
        check_percentile_level(level)?;
        Ok(self.at_percent(level))
    }

    /// Unchecked percentile lookup shared with the interval bounds.
    pub(crate) fn at_percent(&self, level: f64) -> f64 {
        self.quantile(level / 100.0)
    }

    /// Fraction of samples strictly above `threshold`.
    pub fn exceedance(&self, threshold: f64) -> f64 {
        let at_or_below = self.sorted.partition_point(|&v| v <= threshold);
        (self.sorted.len() - at_or_below) as f64 / self.sorted.len() as f64
    }
}

/// Percentile values keyed by level, in the order requested.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PercentileTable {
    pub entries: Vec<PercentileEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PercentileEntry {
    pub level: f64,
    pub value: f64,
}

impl PercentileTable {
    pub fn get(&self, level: f64) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| (e.level - level).abs() < 1e-9)
            .map(|e| e.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PercentileEntry> {
        self.entries.iter()
    }
}

/// Percentiles of `values` at each of `levels` (each in (0, 100)).
pub fn percentiles(values: &[f64], levels: &[f64]) -> Result<PercentileTable, AnalysisError> {
    percentiles_sorted(&SortedSamples::new(values)?, levels)
}

pub fn percentiles_sorted(
    samples: &SortedSamples,
    levels: &[f64],
) -> Result<PercentileTable, AnalysisError> {
    let entries = levels
        .iter()
        .map(|&level| {
            Ok(PercentileEntry {
                level,
                value: samples.percentile(level)?,
            })
        })
        .collect::<Result<Vec<_>, AnalysisError>>()?;
    Ok(PercentileTable { entries })
}

fn check_percentile_level(level: f64) -> Result<(), AnalysisError> {
    if level > 0.0 && level < 100.0 {
        Ok(())
    } else {
        Err(AnalysisError::InvalidLevel {
            level,
            range: "(0, 100)",
        })
    }
}
