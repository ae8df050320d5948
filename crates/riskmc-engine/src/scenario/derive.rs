//! Scenarios derived from a base run.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use riskmc_core::errors::ScenarioError;
use riskmc_core::types::RiskId;

use crate::distribution::ProbabilityDistribution;
use crate::model::Risk;
use crate::simulation::SimulationRun;

/// A change to one risk of the base set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Modification {
    ReplaceDistribution {
        risk_id: String,
        distribution: ProbabilityDistribution,
    },
    /// Multiply the risk's impact multiplier.
    ScaleImpact { risk_id: String, factor: f64 },
    /// Multiply the occurrence probability; the product must stay in [0, 1].
    ScaleProbability { risk_id: String, factor: f64 },
}

impl Modification {
    pub fn risk_id(&self) -> &str {
        match self {
            Self::ReplaceDistribution { risk_id, .. }
            | Self::ScaleImpact { risk_id, .. }
            | Self::ScaleProbability { risk_id, .. } => risk_id,
        }
    }

    fn apply(&self, risk: &Risk) -> Result<Risk, ScenarioError> {
        let invalid = |field: &'static str, value: f64| ScenarioError::InvalidModification {
            id: risk.id().to_string(),
            field,
            value,
        };
        match *self {
            Self::ReplaceDistribution { distribution, .. } => Ok(risk.with_distribution(distribution)),
            Self::ScaleImpact { factor, .. } => {
                if !factor.is_finite() || factor < 0.0 {
                    return Err(invalid("impact_multiplier", factor));
                }
                Ok(risk.clone().with_impact_multiplier(risk.impact_multiplier() * factor)?)
            }
            Self::ScaleProbability { factor, .. } => {
                let p = risk.occurrence_probability() * factor;
                if !factor.is_finite() || !(0.0..=1.0).contains(&p) {
                    return Err(invalid("occurrence_probability", p));
                }
                Ok(risk.clone().with_occurrence_probability(p)?)
            }
        }
    }
}

/// A named run derived from a base run. Unmodified risks are the base's
/// own `Arc`s; modified ones are fresh values. The base is never touched.
#[derive(Debug, Clone)]
pub struct Scenario {
    name: String,
    run: SimulationRun,
    modified: Vec<RiskId>,
}

impl Scenario {
    /// The base run itself, unmodified.
    pub fn baseline(run: &SimulationRun) -> Self {
        Self {
            name: "baseline".to_string(),
            run: run.clone(),
            modified: Vec::new(),
        }
    }

    /// Apply `modifications` in order; several may target the same risk.
    pub fn derive(
        base_run: &SimulationRun,
        name: impl Into<String>,
        modifications: &[Modification],
    ) -> Result<Self, ScenarioError> {
        let name = name.into();
        let mut risks: Vec<Arc<Risk>> = base_run.risks().to_vec();
        let mut modified: Vec<RiskId> = Vec::new();

        for modification in modifications {
            let index = base_run
                .index_of(modification.risk_id())
                .ok_or_else(|| ScenarioError::UnknownRisk {
                    id: modification.risk_id().to_string(),
                })?;
            risks[index] = Arc::new(modification.apply(&risks[index])?);
            if !modified.contains(risks[index].id()) {
                modified.push(risks[index].id().clone());
            }
        }

        debug!(scenario = %name, modified = modified.len(), "scenario derived");
        Ok(Self {
            name,
            run: base_run.with_risks(risks)?,
            modified,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn run(&self) -> &SimulationRun {
        &self.run
    }

    pub fn modified(&self) -> &[RiskId] {
        &self.modified
    }
}
