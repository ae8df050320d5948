//! Risks as they enter a simulation run.

use serde::{Deserialize, Serialize};

use riskmc_core::errors::ValidationError;
use riskmc_core::types::RiskId;

use crate::distribution::{DistributionSpec, ProbabilityDistribution};

/// Which outcome totals a risk contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    Cost,
    Schedule,
    /// Contributes the same draw to both totals.
    Combined,
}

impl RiskCategory {
    pub fn affects_cost(&self) -> bool {
        matches!(self, Self::Cost | Self::Combined)
    }

    pub fn affects_schedule(&self) -> bool {
        matches!(self, Self::Schedule | Self::Combined)
    }
}

/// How a distribution draw becomes an impact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImpactType {
    /// The draw is the impact, in outcome units.
    #[default]
    Absolute,
    /// The draw is a multiplier on `baseline_impact`.
    Relative,
}

/// Compound time-based escalation: factor = (1 + annual_rate)^years.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Escalation {
    pub annual_rate: f64,
    pub years: f64,
}

impl Escalation {
    pub fn factor(&self) -> f64 {
        (1.0 + self.annual_rate).powf(self.years)
    }
}

/// A risk record as delivered by the register collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskRecord {
    pub id: String,
    pub category: RiskCategory,
    #[serde(default)]
    pub impact_type: ImpactType,
    pub distribution_spec: DistributionSpec,
    pub baseline_impact: f64,
    #[serde(default)]
    pub correlation_group: Option<String>,
    #[serde(default)]
    pub occurrence_probability: Option<f64>,
    #[serde(default)]
    pub escalation: Option<Escalation>,
}

/// An immutable, validated risk.
///
/// Runs hold risks behind `Arc`; a register update produces a new value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Risk {
    id: RiskId,
    category: RiskCategory,
    impact_type: ImpactType,
    distribution: ProbabilityDistribution,
    baseline_impact: f64,
    correlation_group: Option<String>,
    occurrence_probability: f64,
    impact_multiplier: f64,
    escalation: Option<Escalation>,
}

impl Risk {
    pub fn new(
        id: impl Into<RiskId>,
        category: RiskCategory,
        impact_type: ImpactType,
        distribution: ProbabilityDistribution,
        baseline_impact: f64,
    ) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValidationError::EmptyRiskId);
        }
        if !baseline_impact.is_finite() {
            return Err(field_error(&id, "baseline_impact", baseline_impact, "must be finite"));
        }
        Ok(Self {
            id,
            category,
            impact_type,
            distribution,
            baseline_impact,
            correlation_group: None,
            occurrence_probability: 1.0,
            impact_multiplier: 1.0,
            escalation: None,
        })
    }

    /// Shorthand for an absolute cost risk.
    pub fn cost(id: impl Into<RiskId>, distribution: ProbabilityDistribution) -> Result<Self, ValidationError> {
        Self::new(id, RiskCategory::Cost, ImpactType::Absolute, distribution, 0.0)
    }

    /// Shorthand for an absolute schedule risk.
    pub fn schedule(id: impl Into<RiskId>, distribution: ProbabilityDistribution) -> Result<Self, ValidationError> {
        Self::new(id, RiskCategory::Schedule, ImpactType::Absolute, distribution, 0.0)
    }

    /// Validate a register record.
    pub fn from_record(record: RiskRecord) -> Result<Self, ValidationError> {
        let distribution = ProbabilityDistribution::try_from(record.distribution_spec)?;
        let mut risk = Self::new(
            record.id,
            record.category,
            record.impact_type,
            distribution,
            record.baseline_impact,
        )?;
        risk.correlation_group = record.correlation_group;
        if let Some(p) = record.occurrence_probability {
            risk = risk.with_occurrence_probability(p)?;
        }
        if let Some(e) = record.escalation {
            risk = risk.with_escalation(e)?;
        }
        Ok(risk)
    }

    pub fn with_correlation_group(mut self, group: impl Into<String>) -> Self {
        self.correlation_group = Some(group.into());
        self
    }

    pub fn with_occurrence_probability(mut self, p: f64) -> Result<Self, ValidationError> {
        if !(0.0..=1.0).contains(&p) {
            return Err(field_error(&self.id, "occurrence_probability", p, "must be in [0, 1]"));
        }
        self.occurrence_probability = p;
        Ok(self)
    }

    pub fn with_impact_multiplier(mut self, k: f64) -> Result<Self, ValidationError> {
        if !k.is_finite() || k < 0.0 {
            return Err(field_error(&self.id, "impact_multiplier", k, "must be finite and non-negative"));
        }
        self.impact_multiplier = k;
        Ok(self)
    }

    pub fn with_escalation(mut self, escalation: Escalation) -> Result<Self, ValidationError> {
        if !escalation.annual_rate.is_finite() || escalation.annual_rate <= -1.0 {
            return Err(field_error(
                &self.id,
                "escalation.annual_rate",
                escalation.annual_rate,
                "must be finite and greater than -1",
            ));
        }
        if !escalation.years.is_finite() || escalation.years < 0.0 {
            return Err(field_error(
                &self.id,
                "escalation.years",
                escalation.years,
                "must be finite and non-negative",
            ));
        }
        self.escalation = Some(escalation);
        Ok(self)
    }

    /// Copy with a different distribution; every other field is kept.
    pub fn with_distribution(&self, distribution: ProbabilityDistribution) -> Self {
        Self {
            distribution,
            ..self.clone()
        }
    }

    pub fn id(&self) -> &RiskId {
        &self.id
    }

    pub fn category(&self) -> RiskCategory {
        self.category
    }

    pub fn impact_type(&self) -> ImpactType {
        self.impact_type
    }

    pub fn distribution(&self) -> &ProbabilityDistribution {
        &self.distribution
    }

    pub fn baseline_impact(&self) -> f64 {
        self.baseline_impact
    }

    pub fn correlation_group(&self) -> Option<&str> {
        self.correlation_group.as_deref()
    }

    pub fn occurrence_probability(&self) -> f64 {
        self.occurrence_probability
    }

    pub fn impact_multiplier(&self) -> f64 {
        self.impact_multiplier
    }

    pub fn escalation(&self) -> Option<&Escalation> {
        self.escalation.as_ref()
    }

    /// Product of every deterministic factor applied to a draw.
    pub fn impact_scale(&self) -> f64 {
        let base = match self.impact_type {
            ImpactType::Absolute => 1.0,
            ImpactType::Relative => self.baseline_impact,
        };
        base * self.impact_multiplier * self.escalation.map_or(1.0, |e| e.factor())
    }

    /// Impact of one draw, given whether the risk occurred.
    pub fn impact(&self, draw: f64, occurred: bool) -> f64 {
        if occurred {
            draw * self.impact_scale()
        } else {
            0.0
        }
    }

    /// Expected impact over draws and occurrence.
    pub fn expected_impact(&self) -> f64 {
        self.occurrence_probability * self.distribution.mean() * self.impact_scale()
    }
}

fn field_error(id: &RiskId, field: &'static str, value: f64, reason: &'static str) -> ValidationError {
    ValidationError::InvalidRiskField {
        risk_id: id.to_string(),
        field,
        value,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normal() -> ProbabilityDistribution {
        ProbabilityDistribution::normal(10_000.0, 2_000.0).unwrap()
    }

    #[test]
    fn test_relative_impact_scales_baseline() {
        let risk = Risk::new(
            "steel-price",
            RiskCategory::Cost,
            ImpactType::Relative,
            ProbabilityDistribution::uniform(0.0, 0.2).unwrap(),
            50_000.0,
        )
        .unwrap();
        assert!((risk.impact(0.1, true) - 5_000.0).abs() < 1e-9);
        assert_eq!(risk.impact(0.1, false), 0.0);
    }

    #[test]
    fn test_escalation_compounds() {
        let risk = Risk::cost("labour", normal())
            .unwrap()
            .with_escalation(Escalation { annual_rate: 0.05, years: 2.0 })
            .unwrap();
        assert!((risk.impact_scale() - 1.1025).abs() < 1e-12);
    }

    #[test]
    fn test_occurrence_probability_bounds() {
        assert!(Risk::cost("a", normal()).unwrap().with_occurrence_probability(1.2).is_err());
        let risk = Risk::cost("a", normal()).unwrap().with_occurrence_probability(0.25).unwrap();
        assert!((risk.expected_impact() - 2_500.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_id_rejected() {
        assert_eq!(Risk::cost("  ", normal()).unwrap_err(), ValidationError::EmptyRiskId);
    }

    #[test]
    fn test_from_record_validates_distribution() {
        let record = RiskRecord {
            id: "permits".into(),
            category: RiskCategory::Schedule,
            impact_type: ImpactType::Absolute,
            distribution_spec: DistributionSpec::Triangular { min: 10.0, mode: 2.0, max: 30.0 },
            baseline_impact: 0.0,
            correlation_group: Some("regulatory".into()),
            occurrence_probability: None,
            escalation: None,
        };
        assert!(Risk::from_record(record).is_err());
    }
}
