//! Mitigation strategies and their return on investment.

use serde::{Deserialize, Serialize};
use tracing::info;

use riskmc_core::errors::ScenarioError;

use super::derive::{Modification, Scenario};
use crate::results::{compare, mean, ComparisonReport};
use crate::simulation::OutcomeType;

/// Changes bought at a known cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MitigationStrategy {
    pub name: String,
    pub cost_of_mitigation: f64,
    pub modifications: Vec<Modification>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MitigationEvaluation {
    pub strategy: String,
    pub outcome: OutcomeType,
    pub seed: u64,
    pub baseline_mean: f64,
    pub mitigated_mean: f64,
    /// mean(mitigated) − mean(baseline); negative when the outcome improves.
    pub expected_value_delta: f64,
    /// expected_value_delta / cost_of_mitigation.
    pub roi: f64,
    /// Welch test of mitigated against baseline. `None` when both vectors
    /// are constant.
    pub comparison: Option<ComparisonReport>,
}

/// Run `scenario` with and without `strategy` on the same seed.
///
/// A zero cost is rejected before anything runs.
pub fn evaluate_mitigation(
    scenario: &Scenario,
    strategy: &MitigationStrategy,
    outcome: OutcomeType,
) -> Result<MitigationEvaluation, ScenarioError> {
    let cost = strategy.cost_of_mitigation;
    if !cost.is_finite() || cost < 0.0 {
        return Err(ScenarioError::InvalidMitigationCost { value: cost });
    }
    if cost == 0.0 {
        return Err(ScenarioError::UndefinedRoi);
    }

    let mitigated_scenario = Scenario::derive(scenario.run(), &strategy.name, &strategy.modifications)?;
    let baseline = scenario.run().run()?;
    let mitigated = mitigated_scenario.run().run_with_seed(baseline.seed())?;

    let baseline_mean = mean(baseline.outcome(outcome))?;
    let mitigated_mean = mean(mitigated.outcome(outcome))?;
    let expected_value_delta = mitigated_mean - baseline_mean;
    let roi = expected_value_delta / cost;

    info!(
        strategy = %strategy.name,
        outcome = %outcome,
        expected_value_delta,
        roi,
        "mitigation evaluated"
    );

    Ok(MitigationEvaluation {
        strategy: strategy.name.clone(),
        outcome,
        seed: baseline.seed(),
        baseline_mean,
        mitigated_mean,
        expected_value_delta,
        roi,
        comparison: compare(&baseline, &mitigated, outcome).ok(),
    })
}
