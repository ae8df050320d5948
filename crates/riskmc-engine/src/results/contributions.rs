//! Variance-reduction contribution ranking.
//!
//! Each risk is frozen at its expected impact in one re-run with the
//! baseline's seed, so every other risk sees the same random numbers. The
//! drop in outcome variance is that risk's contribution.

use std::cmp::Ordering;
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use riskmc_core::config::AnalysisConfig;
use riskmc_core::errors::AnalysisError;
use riskmc_core::tracing::metrics;
use riskmc_core::types::RiskId;

use super::summary::variance;
use crate::simulation::{OutcomeType, SimulationResult, SimulationRun};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskContribution {
    pub risk_id: RiskId,
    /// max(Var_full − Var_frozen, 0).
    pub variance_reduction: f64,
    /// Reduction as a share of the total. Normalised when the report is.
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContributionReport {
    pub outcome: OutcomeType,
    pub total_variance: f64,
    /// Sum of raw shares before any normalisation.
    pub raw_share_sum: f64,
    /// True when raw shares summed to 1 within tolerance and were rescaled
    /// to sum exactly to 1. False shares are raw reduction / total variance.
    pub normalized: bool,
    /// Ranked descending, truncated to the requested top N.
    pub contributions: Vec<RiskContribution>,
    /// Risks ranked below the top N.
    pub omitted: usize,
}

impl ContributionReport {
    pub fn get(&self, id: &str) -> Option<&RiskContribution> {
        self.contributions.iter().find(|c| c.risk_id.as_str() == id)
    }
}

/// Rank risks by how much of `outcome`'s variance each one drives.
///
/// `baseline` must come from `run`; its seed and iteration count are reused.
/// Re-runs are independent, and the first failure is reported after all of
/// them finish.
pub fn risk_contributions(
    run: &SimulationRun,
    baseline: &SimulationResult,
    outcome: OutcomeType,
    config: &AnalysisConfig,
) -> Result<ContributionReport, AnalysisError> {
    let started = Instant::now();
    let total_variance = variance(baseline.outcome(outcome))?;

    let replay = if baseline.iterations() == baseline.iterations_requested() {
        None
    } else {
        let config = run.config().clone().with_iterations(baseline.iterations() as u32);
        Some(run.reconfigure(&config)?)
    };
    let replay = replay.as_ref().unwrap_or(run);

    let reruns: Vec<Result<f64, AnalysisError>> = (0..run.risks().len())
        .into_par_iter()
        .map(|index| {
            let frozen = replay.run_frozen(index, baseline.seed())?;
            variance(frozen.outcome(outcome))
        })
        .collect();

    let mut contributions = Vec::with_capacity(reruns.len());
    for (risk, rerun) in run.risks().iter().zip(reruns) {
        let frozen_variance = rerun?;
        contributions.push(RiskContribution {
            risk_id: risk.id().clone(),
            variance_reduction: (total_variance - frozen_variance).max(0.0),
            share: 0.0,
        });
    }

    let raw_share_sum = if total_variance > 0.0 {
        for c in contributions.iter_mut() {
            c.share = c.variance_reduction / total_variance;
        }
        contributions.iter().map(|c| c.share).sum()
    } else {
        0.0
    };
    let normalized = raw_share_sum > 0.0
        && (raw_share_sum - 1.0).abs() <= config.effective_normalization_tolerance();
    if normalized {
        for c in contributions.iter_mut() {
            c.share /= raw_share_sum;
        }
    } else {
        debug!(raw_share_sum, "contribution shares reported unnormalised");
    }

    contributions.sort_by(|a, b| {
        b.share
            .partial_cmp(&a.share)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.risk_id.cmp(&b.risk_id))
    });
    let top_n = config.effective_top_n();
    let omitted = contributions.len().saturating_sub(top_n);
    contributions.truncate(top_n);

    info!(
        metric = metrics::CONTRIBUTION_TIME_MS,
        value = started.elapsed().as_millis() as u64,
        outcome = %outcome,
        normalized,
        "risk contributions computed"
    );

    Ok(ContributionReport {
        outcome,
        total_variance,
        raw_share_sum,
        normalized,
        contributions,
        omitted,
    })
}
