//! Confidence intervals by symmetric tail exclusion.

use serde::Serialize;

use riskmc_core::errors::AnalysisError;

use super::percentiles::SortedSamples;

/// Central interval holding `level` of the mass: a 90 % interval spans
/// P5 to P95.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceInterval {
    pub level: f64,
    pub lower: f64,
    pub upper: f64,
}

impl ConfidenceInterval {
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.lower..=self.upper).contains(&value)
    }

    /// True when `other` lies entirely inside this interval.
    pub fn encloses(&self, other: &ConfidenceInterval) -> bool {
        self.lower <= other.lower && other.upper <= self.upper
    }
}

/// Intervals for each of `levels` (each in (0, 1)).
pub fn confidence_intervals(
    values: &[f64],
    levels: &[f64],
) -> Result<Vec<ConfidenceInterval>, AnalysisError> {
    intervals_sorted(&SortedSamples::new(values)?, levels)
}

pub fn intervals_sorted(
    samples: &SortedSamples,
    levels: &[f64],
) -> Result<Vec<ConfidenceInterval>, AnalysisError> {
    levels
        .iter()
        .map(|&level| {
            if !(level > 0.0 && level < 1.0) {
                return Err(AnalysisError::InvalidLevel {
                    level,
                    range: "(0, 1)",
                });
            }
            let tail = tail_percent(level);
            Ok(ConfidenceInterval {
                level,
                lower: samples.at_percent(tail),
                upper: samples.at_percent(100.0 - tail),
            })
        })
        .collect()
}

/// Lower tail in percent, snapped to a 1e-9 grid so that a 90 % level
/// lands on exactly 5.0 and 95.0.
fn tail_percent(level: f64) -> f64 {
    let tail = (1.0 - level) * 50.0;
    (tail * 1e9).round() / 1e9
}
