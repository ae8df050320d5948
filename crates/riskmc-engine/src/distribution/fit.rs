//! Parameter estimation from historical samples.
//!
//! Method of moments for triangular and beta, maximum likelihood (with the
//! unbiased variance) for normal and lognormal, and the minimum-variance
//! unbiased endpoints for uniform. `fit` picks the family with the smallest
//! Kolmogorov-Smirnov distance.

use serde::Serialize;
use tracing::debug;

use riskmc_core::constants::MIN_FIT_SAMPLES;
use riskmc_core::errors::FitError;

use super::types::{DistributionFamily, ProbabilityDistribution};

/// A fitted distribution with its goodness-of-fit score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitReport {
    pub distribution: ProbabilityDistribution,
    /// Kolmogorov-Smirnov statistic against the samples (lower is better).
    pub ks_statistic: f64,
    pub sample_count: usize,
}

/// Fit the best-matching family to `samples`.
pub fn fit(samples: &[f64]) -> Result<ProbabilityDistribution, FitError> {
    fit_best(samples).map(|report| report.distribution)
}

/// Fit every family and return the one with the smallest KS statistic.
///
/// Families whose fit fails (e.g., lognormal on negative data) are skipped.
/// If all fail, the normal family's error is returned.
pub fn fit_best(samples: &[f64]) -> Result<FitReport, FitError> {
    check_samples(samples)?;

    let mut best: Option<FitReport> = None;
    let mut first_error = None;
    for family in DistributionFamily::ALL {
        match fit_family(*family, samples) {
            Ok(distribution) => {
                let ks_statistic = ks_statistic(&distribution, samples);
                debug!(family = family.name(), ks_statistic, "candidate fit");
                let better = best
                    .as_ref()
                    .map_or(true, |b| ks_statistic < b.ks_statistic);
                if better {
                    best = Some(FitReport {
                        distribution,
                        ks_statistic,
                        sample_count: samples.len(),
                    });
                }
            }
            Err(e) => {
                debug!(family = family.name(), error = %e, "family rejected");
                first_error.get_or_insert(e);
            }
        }
    }

    match (best, first_error) {
        (Some(report), _) => Ok(report),
        (None, Some(e)) => Err(e),
        (None, None) => Err(FitError::Degenerate {
            family: "any",
            reason: "no family could be fitted".to_string(),
        }),
    }
}

/// Fit a specific family to `samples`.
pub fn fit_family(
    family: DistributionFamily,
    samples: &[f64],
) -> Result<ProbabilityDistribution, FitError> {
    check_samples(samples)?;
    let n = samples.len() as f64;
    let (mean, var) = moments(samples);
    let (lo, hi) = extent(samples);

    let dist = match family {
        DistributionFamily::Normal => {
            if var <= 0.0 {
                return Err(zero_variance(family));
            }
            ProbabilityDistribution::normal(mean, var.sqrt())?
        }
        DistributionFamily::Uniform => {
            if hi <= lo {
                return Err(zero_variance(family));
            }
            let pad = (hi - lo) / (n - 1.0);
            ProbabilityDistribution::uniform(lo - pad, hi + pad)?
        }
        DistributionFamily::Triangular => {
            if hi <= lo {
                return Err(zero_variance(family));
            }
            let pad = (hi - lo) / (n - 1.0);
            let (min, max) = (lo - pad, hi + pad);
            // Mean of a triangular is (min + mode + max) / 3.
            let mode = (3.0 * mean - min - max).clamp(min, max);
            ProbabilityDistribution::triangular(min, mode, max)?
        }
        DistributionFamily::LogNormal => {
            require_positive(family, samples)?;
            let logs: Vec<f64> = samples.iter().map(|x| x.ln()).collect();
            let (mu, log_var) = moments(&logs);
            if log_var <= 0.0 {
                return Err(zero_variance(family));
            }
            ProbabilityDistribution::lognormal(mu, log_var.sqrt())?
        }
        DistributionFamily::Beta => {
            require_positive(family, samples)?;
            // Upper bound estimated from the sample maximum.
            let scale = hi * (n + 1.0) / n;
            let scaled: Vec<f64> = samples.iter().map(|x| x / scale).collect();
            let (m, v) = moments(&scaled);
            if v <= 0.0 {
                return Err(zero_variance(family));
            }
            if v >= m * (1.0 - m) {
                return Err(FitError::Degenerate {
                    family: family.name(),
                    reason: format!("sample variance {v:.6} too large for mean {m:.6}"),
                });
            }
            let common = m * (1.0 - m) / v - 1.0;
            ProbabilityDistribution::beta(m * common, (1.0 - m) * common, scale)?
        }
    };
    Ok(dist)
}

/// Kolmogorov-Smirnov distance between the empirical CDF of `samples` and
/// `dist`.
pub fn ks_statistic(dist: &ProbabilityDistribution, samples: &[f64]) -> f64 {
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len() as f64;
    sorted
        .iter()
        .enumerate()
        .map(|(i, &x)| {
            let f = dist.cdf(x);
            let below = f - i as f64 / n;
            let above = (i + 1) as f64 / n - f;
            below.max(above)
        })
        .fold(0.0, f64::max)
}

fn check_samples(samples: &[f64]) -> Result<(), FitError> {
    if samples.len() < MIN_FIT_SAMPLES {
        return Err(FitError::InsufficientData {
            required: MIN_FIT_SAMPLES,
            actual: samples.len(),
        });
    }
    if let Some(index) = samples.iter().position(|x| !x.is_finite()) {
        return Err(FitError::NonFiniteSample { index });
    }
    Ok(())
}

/// Mean and unbiased (n - 1) variance.
fn moments(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, var)
}

fn extent(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

fn require_positive(family: DistributionFamily, samples: &[f64]) -> Result<(), FitError> {
    if samples.iter().all(|x| *x > 0.0) {
        Ok(())
    } else {
        Err(FitError::Degenerate {
            family: family.name(),
            reason: "samples must be strictly positive".to_string(),
        })
    }
}

fn zero_variance(family: DistributionFamily) -> FitError {
    FitError::Degenerate {
        family: family.name(),
        reason: "samples have zero variance".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_requires_five_samples() {
        let err = fit(&[1.0, 2.0, 3.0, 4.0]).unwrap_err();
        assert_eq!(
            err,
            FitError::InsufficientData {
                required: 5,
                actual: 4
            }
        );
    }

    #[test]
    fn test_fit_normal_recovers_moments() {
        let samples = [8.0, 9.0, 10.0, 11.0, 12.0];
        let d = fit_family(DistributionFamily::Normal, &samples).unwrap();
        assert!((d.mean() - 10.0).abs() < 1e-12);
        assert!((d.variance() - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_fit_rejects_constant_samples() {
        let samples = [3.0; 8];
        assert!(matches!(
            fit_family(DistributionFamily::Normal, &samples),
            Err(FitError::Degenerate { .. })
        ));
        assert!(fit(&samples).is_err());
    }

    #[test]
    fn test_lognormal_skipped_for_negative_data() {
        let samples = [-4.0, -1.0, 0.5, 2.0, 3.5, 6.0];
        assert!(fit_family(DistributionFamily::LogNormal, &samples).is_err());
        let report = fit_best(&samples).unwrap();
        assert_ne!(report.distribution.family(), DistributionFamily::LogNormal);
    }

    #[test]
    fn test_non_finite_sample_reported_by_index() {
        let samples = [1.0, 2.0, f64::NAN, 4.0, 5.0];
        assert_eq!(fit(&samples).unwrap_err(), FitError::NonFiniteSample { index: 2 });
    }

    #[test]
    fn test_fitted_triangular_keeps_ordering() {
        let samples = [1.0, 1.2, 1.1, 1.3, 9.0, 1.05];
        let d = fit_family(DistributionFamily::Triangular, &samples).unwrap();
        assert!(d.spec().validate().is_ok());
    }
}
