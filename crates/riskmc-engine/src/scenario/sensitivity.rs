//! One-at-a-time sensitivity of an outcome to each risk.

use std::cmp::Ordering;
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use riskmc_core::config::ScenarioConfig;
use riskmc_core::errors::{ErrorReport, RiskErrorCode, ScenarioError};
use riskmc_core::tracing::metrics;
use riskmc_core::types::RiskId;

use super::derive::{Modification, Scenario};
use crate::model::Risk;
use crate::results::mean;
use crate::simulation::{OutcomeType, SimulationRun};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensitivityEntry {
    pub risk_id: RiskId,
    /// mean(perturbed) − mean(base).
    pub outcome_delta: f64,
    /// outcome_delta relative to the base mean; zero when the base mean is.
    pub relative_delta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensitivityFailure {
    pub risk_id: RiskId,
    pub error: ErrorReport,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensitivityReport {
    pub outcome: OutcomeType,
    pub fraction: f64,
    pub seed: u64,
    pub base_mean: f64,
    /// Ranked by |outcome_delta|, largest first.
    pub entries: Vec<SensitivityEntry>,
    /// Risks whose perturbed run failed. Siblings are unaffected.
    pub failures: Vec<SensitivityFailure>,
}

/// Perturb each risk's distribution by `1 + fraction` in turn and rank the
/// shift in the outcome mean. Every perturbation starts from the untouched
/// base and replays the base seed.
pub fn sensitivity_analysis(
    base_run: &SimulationRun,
    fraction: f64,
    outcome: OutcomeType,
) -> Result<SensitivityReport, ScenarioError> {
    analyze(base_run, fraction, outcome, true)
}

/// As `sensitivity_analysis`, with the fraction and parallelism taken from
/// configuration.
pub fn sensitivity_analysis_with(
    base_run: &SimulationRun,
    config: &ScenarioConfig,
    outcome: OutcomeType,
) -> Result<SensitivityReport, ScenarioError> {
    analyze(
        base_run,
        config.effective_perturbation_fraction(),
        outcome,
        config.effective_parallel(),
    )
}

fn analyze(
    base_run: &SimulationRun,
    fraction: f64,
    outcome: OutcomeType,
    parallel: bool,
) -> Result<SensitivityReport, ScenarioError> {
    if !fraction.is_finite() || fraction <= -1.0 {
        return Err(ScenarioError::InvalidPerturbation { value: fraction });
    }
    let started = Instant::now();
    let base = base_run.run()?;
    let seed = base.seed();
    let base_mean = mean(base.outcome(outcome))?;

    let perturb = |risk: &std::sync::Arc<Risk>| -> Result<SensitivityEntry, ScenarioError> {
        let distribution = risk.distribution().scaled(1.0 + fraction)?;
        let scenario = Scenario::derive(
            base_run,
            format!("sensitivity:{}", risk.id()),
            &[Modification::ReplaceDistribution {
                risk_id: risk.id().to_string(),
                distribution,
            }],
        )?;
        let perturbed = scenario.run().run_with_seed(seed)?;
        let outcome_delta = mean(perturbed.outcome(outcome))? - base_mean;
        Ok(SensitivityEntry {
            risk_id: risk.id().clone(),
            outcome_delta,
            relative_delta: if base_mean == 0.0 { 0.0 } else { outcome_delta / base_mean.abs() },
        })
    };

    let results: Vec<Result<SensitivityEntry, ScenarioError>> = if parallel {
        base_run.risks().par_iter().map(perturb).collect()
    } else {
        base_run.risks().iter().map(perturb).collect()
    };

    let mut entries = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for (risk, result) in base_run.risks().iter().zip(results) {
        match result {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                warn!(risk = %risk.id(), error = %e, "sensitivity run failed");
                failures.push(SensitivityFailure {
                    risk_id: risk.id().clone(),
                    error: e.report(),
                });
            }
        }
    }
    entries.sort_by(|a, b| {
        b.outcome_delta
            .abs()
            .partial_cmp(&a.outcome_delta.abs())
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.risk_id.cmp(&b.risk_id))
    });

    info!(
        metric = metrics::SENSITIVITY_TIME_MS,
        value = started.elapsed().as_millis() as u64,
        risks = base_run.risks().len(),
        failures = failures.len(),
        "sensitivity analysis complete"
    );

    Ok(SensitivityReport {
        outcome,
        fraction,
        seed,
        base_mean,
        entries,
        failures,
    })
}
