//! Descriptive statistics, summaries and reporting snapshots.

use serde::Serialize;

use riskmc_core::config::AnalysisConfig;
use riskmc_core::errors::AnalysisError;
use riskmc_core::types::DegradationEvent;

use super::contributions::ContributionReport;
use super::intervals::{intervals_sorted, ConfidenceInterval};
use super::percentiles::{percentiles_sorted, PercentileTable, SortedSamples};
use crate::simulation::{OutcomeType, RunState, SimulationResult};

fn check(values: &[f64]) -> Result<(), AnalysisError> {
    if values.is_empty() {
        return Err(AnalysisError::EmptyVector);
    }
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(AnalysisError::NonFiniteValue { index }),
        None => Ok(()),
    }
}

pub fn mean(values: &[f64]) -> Result<f64, AnalysisError> {
    check(values)?;
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample variance (n − 1). Zero for a single value.
pub fn variance(values: &[f64]) -> Result<f64, AnalysisError> {
    let m = mean(values)?;
    if values.len() < 2 {
        return Ok(0.0);
    }
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Ok(ss / (values.len() - 1) as f64)
}

/// Probability that the outcome exceeds `threshold`.
pub fn exceedance_probability(values: &[f64], threshold: f64) -> Result<f64, AnalysisError> {
    Ok(SortedSamples::new(values)?.exceedance(threshold))
}

/// Equal-width bins over [min, max]; the maximum falls in the last bin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub lower: f64,
    pub upper: f64,
    pub bin_width: f64,
    pub counts: Vec<usize>,
}

pub fn histogram(values: &[f64], bins: usize) -> Result<Histogram, AnalysisError> {
    if bins == 0 {
        return Err(AnalysisError::NoBins);
    }
    check(values)?;
    let lower = values.iter().copied().fold(f64::INFINITY, f64::min);
    let upper = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let bin_width = (upper - lower) / bins as f64;

    let mut counts = vec![0; bins];
    for &v in values {
        let bin = if bin_width > 0.0 {
            (((v - lower) / bin_width) as usize).min(bins - 1)
        } else {
            0
        };
        counts[bin] += 1;
    }
    Ok(Histogram {
        lower,
        upper,
        bin_width,
        counts,
    })
}

/// Statistics for one outcome vector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeSummary {
    pub outcome: OutcomeType,
    pub iterations: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub percentiles: PercentileTable,
    pub intervals: Vec<ConfidenceInterval>,
}

impl OutcomeSummary {
    pub fn from_values(
        outcome: OutcomeType,
        values: &[f64],
        config: &AnalysisConfig,
    ) -> Result<Self, AnalysisError> {
        let sorted = SortedSamples::new(values)?;
        Ok(Self {
            outcome,
            iterations: values.len(),
            mean: mean(values)?,
            std_dev: variance(values)?.sqrt(),
            min: sorted.min(),
            max: sorted.max(),
            percentiles: percentiles_sorted(&sorted, &config.effective_percentile_levels())?,
            intervals: intervals_sorted(&sorted, &config.effective_confidence_levels())?,
        })
    }

    pub fn interval(&self, level: f64) -> Option<&ConfidenceInterval> {
        self.intervals.iter().find(|ci| (ci.level - level).abs() < 1e-9)
    }
}

/// Both outcomes of a result plus its run qualifiers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticalSummary {
    pub cost: OutcomeSummary,
    pub schedule: OutcomeSummary,
    pub state: RunState,
    pub converged: bool,
    pub truncated: bool,
    pub degraded: bool,
    pub seed: u64,
    pub iterations: usize,
}

impl StatisticalSummary {
    pub fn from_result(result: &SimulationResult, config: &AnalysisConfig) -> Result<Self, AnalysisError> {
        Ok(Self {
            cost: OutcomeSummary::from_values(OutcomeType::Cost, result.cost(), config)?,
            schedule: OutcomeSummary::from_values(OutcomeType::Schedule, result.schedule(), config)?,
            state: result.state(),
            converged: result.is_converged(),
            truncated: result.truncated(),
            degraded: result.is_degraded(),
            seed: result.seed(),
            iterations: result.iterations(),
        })
    }

    pub fn outcome(&self, outcome: OutcomeType) -> &OutcomeSummary {
        match outcome {
            OutcomeType::Cost => &self.cost,
            OutcomeType::Schedule => &self.schedule,
        }
    }
}

/// Read-only view handed to the reporting collaborator.
#[derive(Debug, Clone, Serialize)]
pub struct ResultSnapshot<'a> {
    pub summary: StatisticalSummary,
    pub cost: &'a [f64],
    pub schedule: &'a [f64],
    pub contributions: Vec<ContributionReport>,
    pub degradations: &'a [DegradationEvent],
}

impl<'a> ResultSnapshot<'a> {
    pub fn new(result: &'a SimulationResult, config: &AnalysisConfig) -> Result<Self, AnalysisError> {
        Ok(Self {
            summary: StatisticalSummary::from_result(result, config)?,
            cost: result.cost(),
            schedule: result.schedule(),
            contributions: Vec::new(),
            degradations: result.degradations(),
        })
    }

    pub fn with_contributions(mut self, report: ContributionReport) -> Self {
        self.contributions.push(report);
        self
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_variance() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&values).unwrap(), 5.0);
        assert!((variance(&values).unwrap() - 32.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_histogram_places_max_in_last_bin() {
        let h = histogram(&[0.0, 1.0, 2.0, 3.0, 4.0], 4).unwrap();
        assert_eq!(h.counts, vec![1, 1, 1, 2]);
        assert_eq!(h.counts.iter().sum::<usize>(), 5);
    }

    #[test]
    fn test_histogram_constant_values() {
        let h = histogram(&[3.0; 10], 5).unwrap();
        assert_eq!(h.counts[0], 10);
        assert!(matches!(histogram(&[1.0], 0), Err(AnalysisError::NoBins)));
    }
}
