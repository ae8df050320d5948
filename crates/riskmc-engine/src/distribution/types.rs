//! Distribution types: the closed set of supported families.

use serde::{Deserialize, Serialize};
use statrs::distribution::{Beta, ContinuousCDF, LogNormal, Normal};

use riskmc_core::errors::ValidationError;

/// The five supported distribution families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionFamily {
    Normal,
    Triangular,
    Uniform,
    Beta,
    #[serde(rename = "lognormal")]
    LogNormal,
}

impl DistributionFamily {
    /// All families, in the order `fit` tries them.
    pub const ALL: &'static [DistributionFamily] = &[
        Self::Normal,
        Self::Triangular,
        Self::Uniform,
        Self::Beta,
        Self::LogNormal,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Triangular => "triangular",
            Self::Uniform => "uniform",
            Self::Beta => "beta",
            Self::LogNormal => "lognormal",
        }
    }
}

impl std::fmt::Display for DistributionFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw, unvalidated distribution parameters as they arrive from a caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum DistributionSpec {
    Normal { mean: f64, std_dev: f64 },
    Triangular { min: f64, mode: f64, max: f64 },
    Uniform { low: f64, high: f64 },
    Beta { alpha: f64, beta: f64, scale: f64 },
    #[serde(rename = "lognormal")]
    LogNormal { mu: f64, sigma: f64 },
}

impl DistributionSpec {
    pub fn family(&self) -> DistributionFamily {
        match self {
            Self::Normal { .. } => DistributionFamily::Normal,
            Self::Triangular { .. } => DistributionFamily::Triangular,
            Self::Uniform { .. } => DistributionFamily::Uniform,
            Self::Beta { .. } => DistributionFamily::Beta,
            Self::LogNormal { .. } => DistributionFamily::LogNormal,
        }
    }

    /// Check the family's mathematical constraints.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let family = self.family().name();
        match *self {
            Self::Normal { mean, std_dev } => {
                finite(family, "mean", mean)?;
                positive(family, "std_dev", std_dev)
            }
            Self::Triangular { min, mode, max } => {
                finite(family, "min", min)?;
                finite(family, "mode", mode)?;
                finite(family, "max", max)?;
                ordered(family, ("min", min), ("mode", mode))?;
                ordered(family, ("mode", mode), ("max", max))?;
                if min == max {
                    return Err(ValidationError::InvalidParameter {
                        family,
                        parameter: "max",
                        value: max,
                        reason: "must be greater than min",
                    });
                }
                Ok(())
            }
            Self::Uniform { low, high } => {
                finite(family, "low", low)?;
                finite(family, "high", high)?;
                ordered(family, ("low", low), ("high", high))?;
                if low == high {
                    return Err(ValidationError::InvalidParameter {
                        family,
                        parameter: "high",
                        value: high,
                        reason: "must be greater than low",
                    });
                }
                Ok(())
            }
            Self::Beta { alpha, beta, scale } => {
                positive(family, "alpha", alpha)?;
                positive(family, "beta", beta)?;
                positive(family, "scale", scale)
            }
            Self::LogNormal { mu, sigma } => {
                finite(family, "mu", mu)?;
                positive(family, "sigma", sigma)
            }
        }
    }
}

fn finite(family: &'static str, parameter: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::InvalidParameter {
            family,
            parameter,
            value,
            reason: "must be finite",
        })
    }
}

fn positive(family: &'static str, parameter: &'static str, value: f64) -> Result<(), ValidationError> {
    finite(family, parameter, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidParameter {
            family,
            parameter,
            value,
            reason: "must be greater than zero",
        })
    }
}

fn ordered(
    family: &'static str,
    (lower_name, lower): (&'static str, f64),
    (upper_name, upper): (&'static str, f64),
) -> Result<(), ValidationError> {
    if lower <= upper {
        Ok(())
    } else {
        Err(ValidationError::OrderingViolation {
            family,
            lower_name,
            upper_name,
            lower,
            upper,
        })
    }
}

/// A validated, sampleable probability distribution.
///
/// Only constructible through validation, so every value held by a risk
/// satisfies its family's constraints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DistributionSpec", into = "DistributionSpec")]
pub struct ProbabilityDistribution {
    spec: DistributionSpec,
}

impl TryFrom<DistributionSpec> for ProbabilityDistribution {
    type Error = ValidationError;

    fn try_from(spec: DistributionSpec) -> Result<Self, Self::Error> {
        spec.validate()?;
        Ok(Self { spec })
    }
}

impl From<ProbabilityDistribution> for DistributionSpec {
    fn from(dist: ProbabilityDistribution) -> Self {
        dist.spec
    }
}

impl ProbabilityDistribution {
    pub fn normal(mean: f64, std_dev: f64) -> Result<Self, ValidationError> {
        Self::try_from(DistributionSpec::Normal { mean, std_dev })
    }

    pub fn triangular(min: f64, mode: f64, max: f64) -> Result<Self, ValidationError> {
        Self::try_from(DistributionSpec::Triangular { min, mode, max })
    }

    pub fn uniform(low: f64, high: f64) -> Result<Self, ValidationError> {
        Self::try_from(DistributionSpec::Uniform { low, high })
    }

    pub fn beta(alpha: f64, beta: f64, scale: f64) -> Result<Self, ValidationError> {
        Self::try_from(DistributionSpec::Beta { alpha, beta, scale })
    }

    pub fn lognormal(mu: f64, sigma: f64) -> Result<Self, ValidationError> {
        Self::try_from(DistributionSpec::LogNormal { mu, sigma })
    }

    pub fn spec(&self) -> &DistributionSpec {
        &self.spec
    }

    pub fn family(&self) -> DistributionFamily {
        self.spec.family()
    }

    /// Analytical mean.
    pub fn mean(&self) -> f64 {
        match self.spec {
            DistributionSpec::Normal { mean, .. } => mean,
            DistributionSpec::Triangular { min, mode, max } => (min + mode + max) / 3.0,
            DistributionSpec::Uniform { low, high } => (low + high) / 2.0,
            DistributionSpec::Beta { alpha, beta, scale } => scale * alpha / (alpha + beta),
            DistributionSpec::LogNormal { mu, sigma } => (mu + sigma * sigma / 2.0).exp(),
        }
    }

    /// Analytical variance.
    pub fn variance(&self) -> f64 {
        match self.spec {
            DistributionSpec::Normal { std_dev, .. } => std_dev * std_dev,
            DistributionSpec::Triangular { min: a, mode: c, max: b } => {
                (a * a + b * b + c * c - a * b - a * c - b * c) / 18.0
            }
            DistributionSpec::Uniform { low, high } => (high - low).powi(2) / 12.0,
            DistributionSpec::Beta { alpha, beta, scale } => {
                let sum = alpha + beta;
                scale * scale * alpha * beta / (sum * sum * (sum + 1.0))
            }
            DistributionSpec::LogNormal { mu, sigma } => {
                let s2 = sigma * sigma;
                (s2.exp() - 1.0) * (2.0 * mu + s2).exp()
            }
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Cumulative distribution function.
    pub fn cdf(&self, x: f64) -> f64 {
        match self.sampler() {
            Ok(sampler) => sampler.cdf(x),
            Err(_) => f64::NAN,
        }
    }

    /// Deterministic inverse-transform draw for a uniform variate `u` in [0, 1).
    ///
    /// Returns NaN for `u` outside [0, 1]; the engine reports that as a
    /// computation failure.
    pub fn sample(&self, u: f64) -> f64 {
        match self.sampler() {
            Ok(sampler) => sampler.sample(u),
            Err(_) => f64::NAN,
        }
    }

    /// The same family rescaled by `factor` (> 0): every draw is multiplied
    /// by `factor`.
    pub fn scaled(&self, factor: f64) -> Result<Self, ValidationError> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(ValidationError::InvalidParameter {
                family: self.family().name(),
                parameter: "scale_factor",
                value: factor,
                reason: "must be finite and greater than zero",
            });
        }
        let spec = match self.spec {
            DistributionSpec::Normal { mean, std_dev } => DistributionSpec::Normal {
                mean: mean * factor,
                std_dev: std_dev * factor,
            },
            DistributionSpec::Triangular { min, mode, max } => DistributionSpec::Triangular {
                min: min * factor,
                mode: mode * factor,
                max: max * factor,
            },
            DistributionSpec::Uniform { low, high } => DistributionSpec::Uniform {
                low: low * factor,
                high: high * factor,
            },
            DistributionSpec::Beta { alpha, beta, scale } => DistributionSpec::Beta {
                alpha,
                beta,
                scale: scale * factor,
            },
            DistributionSpec::LogNormal { mu, sigma } => DistributionSpec::LogNormal {
                mu: mu + factor.ln(),
                sigma,
            },
        };
        Self::try_from(spec)
    }

    /// Prepare a sampler with the `statrs` objects built once.
    pub fn sampler(&self) -> Result<Sampler, ValidationError> {
        let family = self.family().name();
        let rejected = |parameter: &'static str, value: f64| ValidationError::InvalidParameter {
            family,
            parameter,
            value,
            reason: "rejected by statrs",
        };
        Ok(match self.spec {
            DistributionSpec::Normal { mean, std_dev } => Sampler::Normal(
                Normal::new(mean, std_dev).map_err(|_| rejected("std_dev", std_dev))?,
            ),
            DistributionSpec::Triangular { min, mode, max } => Sampler::Triangular { min, mode, max },
            DistributionSpec::Uniform { low, high } => Sampler::Uniform { low, high },
            DistributionSpec::Beta { alpha, beta, scale } => Sampler::Beta {
                dist: Beta::new(alpha, beta).map_err(|_| rejected("alpha", alpha))?,
                scale,
            },
            DistributionSpec::LogNormal { mu, sigma } => Sampler::LogNormal(
                LogNormal::new(mu, sigma).map_err(|_| rejected("sigma", sigma))?,
            ),
        })
    }
}

/// Inverse-CDF sampler with per-family state prepared ahead of the
/// iteration loop. Shared read-only across worker threads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sampler {
    Normal(Normal),
    Triangular { min: f64, mode: f64, max: f64 },
    Uniform { low: f64, high: f64 },
    Beta { dist: Beta, scale: f64 },
    LogNormal(LogNormal),
}

/// Smallest probability handed to an unbounded inverse CDF.
const OPEN_UNIT_EPSILON: f64 = 1e-15;

impl Sampler {
    /// Map a uniform variate to a draw. NaN for `u` outside [0, 1].
    pub fn sample(&self, u: f64) -> f64 {
        if !(0.0..=1.0).contains(&u) {
            return f64::NAN;
        }
        match *self {
            Self::Normal(ref dist) => dist.inverse_cdf(open_unit(u)),
            Self::Triangular { min, mode, max } => {
                let range = max - min;
                let split = (mode - min) / range;
                if u < split {
                    min + (u * range * (mode - min)).sqrt()
                } else {
                    max - ((1.0 - u) * range * (max - mode)).sqrt()
                }
            }
            Self::Uniform { low, high } => low + u * (high - low),
            Self::Beta { ref dist, scale } => scale * dist.inverse_cdf(u),
            Self::LogNormal(ref dist) => dist.inverse_cdf(open_unit(u)),
        }
    }

    pub fn cdf(&self, x: f64) -> f64 {
        match *self {
            Self::Normal(ref dist) => dist.cdf(x),
            Self::Triangular { min, mode, max } => {
                if x <= min {
                    0.0
                } else if x >= max {
                    1.0
                } else if x <= mode {
                    (x - min).powi(2) / ((max - min) * (mode - min))
                } else {
                    1.0 - (max - x).powi(2) / ((max - min) * (max - mode))
                }
            }
            Self::Uniform { low, high } => ((x - low) / (high - low)).clamp(0.0, 1.0),
            Self::Beta { ref dist, scale } => dist.cdf((x / scale).clamp(0.0, 1.0)),
            Self::LogNormal(ref dist) => {
                if x <= 0.0 {
                    0.0
                } else {
                    dist.cdf(x)
                }
            }
        }
    }
}

fn open_unit(u: f64) -> f64 {
    u.clamp(OPEN_UNIT_EPSILON, 1.0 - OPEN_UNIT_EPSILON)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangular_rejects_min_above_mode() {
        let err = ProbabilityDistribution::triangular(10.0, 5.0, 20.0).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::OrderingViolation { lower_name: "min", upper_name: "mode", .. }
        ));
    }

    #[test]
    fn test_normal_rejects_zero_std_dev() {
        assert!(ProbabilityDistribution::normal(1.0, 0.0).is_err());
        assert!(ProbabilityDistribution::normal(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_beta_rejects_non_positive_shape() {
        assert!(ProbabilityDistribution::beta(0.0, 2.0, 1.0).is_err());
        assert!(ProbabilityDistribution::beta(2.0, -1.0, 1.0).is_err());
        assert!(ProbabilityDistribution::beta(2.0, 2.0, 0.0).is_err());
    }

    #[test]
    fn test_triangular_inverse_cdf_endpoints() {
        let d = ProbabilityDistribution::triangular(5000.0, 8000.0, 15000.0).unwrap();
        assert_eq!(d.sample(0.0), 5000.0);
        assert!((d.sample(0.999_999) - 15000.0).abs() < 20.0);
        // CDF at the mode equals (mode - min) / (max - min).
        assert!((d.cdf(8000.0) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_sample_inverts_cdf() {
        let dists = [
            ProbabilityDistribution::normal(100.0, 15.0).unwrap(),
            ProbabilityDistribution::triangular(1.0, 3.0, 9.0).unwrap(),
            ProbabilityDistribution::uniform(2.0, 10.0).unwrap(),
            ProbabilityDistribution::beta(2.0, 5.0, 40.0).unwrap(),
            ProbabilityDistribution::lognormal(1.0, 0.5).unwrap(),
        ];
        for d in &dists {
            for u in [0.05, 0.25, 0.5, 0.75, 0.95] {
                let x = d.sample(u);
                assert!((d.cdf(x) - u).abs() < 1e-4, "{:?} at u={u}", d.family());
            }
        }
    }

    #[test]
    fn test_sample_out_of_unit_interval_is_nan() {
        let d = ProbabilityDistribution::uniform(0.0, 1.0).unwrap();
        assert!(d.sample(1.5).is_nan());
        assert!(d.sample(-0.1).is_nan());
    }

    #[test]
    fn test_scaled_multiplies_mean() {
        let d = ProbabilityDistribution::lognormal(0.5, 0.3).unwrap();
        let s = d.scaled(1.1).unwrap();
        assert!((s.mean() - d.mean() * 1.1).abs() < 1e-9);
        assert!(d.scaled(0.0).is_err());
    }

    #[test]
    fn test_serde_rejects_invalid_parameters() {
        let bad = r#"{"family":"triangular","min":10.0,"mode":5.0,"max":20.0}"#;
        assert!(serde_json::from_str::<ProbabilityDistribution>(bad).is_err());
        let good = r#"{"family":"lognormal","mu":0.0,"sigma":1.0}"#;
        let d: ProbabilityDistribution = serde_json::from_str(good).unwrap();
        assert_eq!(d.family(), DistributionFamily::LogNormal);
    }
}
