//! Three-point (optimistic / likely / pessimistic) estimates.

use serde::{Deserialize, Serialize};

use riskmc_core::errors::ValidationError;

use super::types::ProbabilityDistribution;

/// An expert three-point estimate, the usual fallback when no history exists.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThreePointEstimate {
    pub optimistic: f64,
    pub likely: f64,
    pub pessimistic: f64,
}

impl ThreePointEstimate {
    pub fn new(optimistic: f64, likely: f64, pessimistic: f64) -> Self {
        Self {
            optimistic,
            likely,
            pessimistic,
        }
    }

    pub fn to_distribution(&self) -> Result<ProbabilityDistribution, ValidationError> {
        from_three_point(self.optimistic, self.likely, self.pessimistic)
    }
}

/// Build a triangular distribution from a three-point estimate.
///
/// Fails if `optimistic > likely` or `likely > pessimistic`; the estimate is
/// never reordered.
pub fn from_three_point(
    optimistic: f64,
    likely: f64,
    pessimistic: f64,
) -> Result<ProbabilityDistribution, ValidationError> {
    for (name, value) in [
        ("optimistic", optimistic),
        ("likely", likely),
        ("pessimistic", pessimistic),
    ] {
        if !value.is_finite() {
            return Err(ValidationError::InvalidParameter {
                family: "three_point",
                parameter: name,
                value,
                reason: "must be finite",
            });
        }
    }
    if optimistic > likely {
        return Err(ValidationError::OrderingViolation {
            family: "three_point",
            lower_name: "optimistic",
            upper_name: "likely",
            lower: optimistic,
            upper: likely,
        });
    }
    if likely > pessimistic {
        return Err(ValidationError::OrderingViolation {
            family: "three_point",
            lower_name: "likely",
            upper_name: "pessimistic",
            lower: likely,
            upper: pessimistic,
        });
    }
    ProbabilityDistribution::triangular(optimistic, likely, pessimistic)
}
