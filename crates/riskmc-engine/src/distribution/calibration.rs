//! Calibration of distributions from historical outcomes.
//!
//! A `Calibrator` is an explicit context object: it borrows the caller's
//! pattern store and recovery policy, so there is no process-wide state.
//! Chain: history (retried) → fitted family → three-point fallback.
//! Every fallback produces a `DegradationEvent` the caller attaches to the run.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use riskmc_core::errors::{FitError, RiskErrorCode};
use riskmc_core::tracing::metrics;
use riskmc_core::traits::{HistoricalPatternStore, OutcomeMetric};
use riskmc_core::types::DegradationEvent;

use super::fit::{fit_best, fit_family, ks_statistic};
use super::three_point::ThreePointEstimate;
use super::types::{DistributionFamily, ProbabilityDistribution};
use crate::recovery::{retry_with, RecoveryPolicy, RecoveryStrategy};

/// What to calibrate and what to use when history cannot be.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationRequest {
    pub archetype: String,
    pub metric: OutcomeMetric,
    /// Family to fit. `None` picks the best-fitting family.
    pub family: Option<DistributionFamily>,
    pub fallback: ThreePointEstimate,
}

/// Where a calibrated distribution came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum CalibrationSource {
    Historical { sample_count: usize, ks_statistic: f64 },
    Fallback,
}

/// A calibrated distribution and, in degraded mode, why it was degraded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalibratedDistribution {
    pub distribution: ProbabilityDistribution,
    pub source: CalibrationSource,
    pub degradation: Option<DegradationEvent>,
}

impl CalibratedDistribution {
    pub fn is_degraded(&self) -> bool {
        self.degradation.is_some()
    }
}

/// Calibration context bound to a historical pattern store.
pub struct Calibrator<'a> {
    store: &'a dyn HistoricalPatternStore,
    policy: RecoveryPolicy,
}

impl<'a> Calibrator<'a> {
    pub fn new(store: &'a dyn HistoricalPatternStore, policy: RecoveryPolicy) -> Self {
        Self { store, policy }
    }

    /// Fit a distribution to the archetype's history.
    ///
    /// The fallback estimate is validated up front; an invalid fallback is a
    /// validation error even when history would have sufficed.
    pub fn calibrate(&self, request: &CalibrationRequest) -> Result<CalibratedDistribution, FitError> {
        let fallback = request.fallback.to_distribution()?;

        let history = retry_with(&self.policy, "historical_outcomes", |_| {
            self.store.outcomes(&request.archetype, request.metric)
        });

        let fitted = history.map_err(FitError::from).and_then(|samples| {
            let distribution = match request.family {
                Some(family) => fit_family(family, &samples)?,
                None => fit_best(&samples)?.distribution,
            };
            Ok((distribution, samples))
        });

        match fitted {
            Ok((distribution, samples)) => {
                let ks = ks_statistic(&distribution, &samples);
                info!(
                    archetype = %request.archetype,
                    outcome_metric = request.metric.name(),
                    family = distribution.family().name(),
                    metric = metrics::CALIBRATION_SAMPLES,
                    value = samples.len(),
                    "calibrated from history"
                );
                Ok(CalibratedDistribution {
                    distribution,
                    source: CalibrationSource::Historical {
                        sample_count: samples.len(),
                        ks_statistic: ks,
                    },
                    degradation: None,
                })
            }
            Err(e) => match self.policy.after_retries(e.category()) {
                RecoveryStrategy::Fallback => {
                    warn!(
                        archetype = %request.archetype,
                        store = self.store.name(),
                        error = %e,
                        "history unusable, falling back to three-point estimate"
                    );
                    Ok(CalibratedDistribution {
                        distribution: fallback,
                        source: CalibrationSource::Fallback,
                        degradation: Some(DegradationEvent::new(
                            "calibration",
                            e.coded_string(),
                            "three_point_estimate",
                        )),
                    })
                }
                _ => Err(e),
            },
        }
    }

    /// Write a completed project's outcome back to the store.
    pub fn record_outcome(
        &self,
        archetype: &str,
        metric: OutcomeMetric,
        value: f64,
    ) -> Result<(), FitError> {
        if !value.is_finite() {
            return Err(FitError::NonFiniteSample { index: 0 });
        }
        retry_with(&self.policy, "record_outcome", |attempt| {
            tracing::debug!(metric = metrics::RETRY_ATTEMPT, attempt, "recording outcome");
            self.store.record(archetype, metric, value)
        })
        .map_err(FitError::from)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use super::*;

    use riskmc_core::errors::PatternStoreError;
    use riskmc_core::traits::InMemoryPatternStore;
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    /// A store that fails a fixed number of times before answering.
    struct FlakyStore {
        failures_left: AtomicU32,
        inner: InMemoryPatternStore,
    }

    impl HistoricalPatternStore for FlakyStore {
        fn name(&self) -> &str {
            "flaky"
        }

        fn outcomes(&self, archetype: &str, metric: OutcomeMetric) -> Result<Vec<f64>, PatternStoreError> {
            if self.failures_left.load(Ordering::SeqCst) > 0 {
                self.failures_left.fetch_sub(1, Ordering::SeqCst);
                return Err(PatternStoreError::Unavailable {
                    store: "flaky".into(),
                    reason: "timeout".into(),
                });
            }
            self.inner.outcomes(archetype, metric)
        }

        fn record(&self, archetype: &str, metric: OutcomeMetric, value: f64) -> Result<(), PatternStoreError> {
            self.inner.record(archetype, metric, value)
        }
    }

    fn request(archetype: &str) -> CalibrationRequest {
        CalibrationRequest {
            archetype: archetype.into(),
            metric: OutcomeMetric::CostVariance,
            family: Some(DistributionFamily::Normal),
            fallback: ThreePointEstimate::new(-5.0, 5.0, 30.0),
        }
    }

    fn history() -> InMemoryPatternStore {
        InMemoryPatternStore::new().with_outcomes(
            "warehouse",
            OutcomeMetric::CostVariance,
            [4.0, 9.5, 12.0, 7.5, 15.0, 3.0, 10.0],
        )
    }

    fn fast_policy() -> RecoveryPolicy {
        RecoveryPolicy::default().with_backoff(Duration::ZERO)
    }

    /// Collects the field names of every event it sees.
    struct FieldNames(Arc<Mutex<Vec<Vec<String>>>>);

    impl<S: tracing::Subscriber> Layer<S> for FieldNames {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            let names = event.fields().map(|f| f.name().to_string()).collect();
            self.0.lock().unwrap().push(names);
        }
    }

    #[test]
    fn test_calibration_event_keeps_metric_fields_apart() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::registry().with(FieldNames(Arc::clone(&seen)));
        let store = history();
        tracing::subscriber::with_default(subscriber, || {
            Calibrator::new(&store, fast_policy())
                .calibrate(&request("warehouse"))
                .unwrap();
        });

        let events = seen.lock().unwrap();
        let calibrated = events
            .iter()
            .find(|names| names.iter().any(|n| n == "outcome_metric"))
            .expect("calibration event");
        assert_eq!(calibrated.iter().filter(|n| *n == "metric").count(), 1);
    }

    #[test]
    fn test_history_is_used_when_available() {
        let store = history();
        let calibrated = Calibrator::new(&store, fast_policy())
            .calibrate(&request("warehouse"))
            .unwrap();
        assert!(!calibrated.is_degraded());
        assert!(matches!(
            calibrated.source,
            CalibrationSource::Historical { sample_count: 7, .. }
        ));
    }

    #[test]
    fn test_transient_failures_are_retried() {
        let store = FlakyStore {
            failures_left: AtomicU32::new(2),
            inner: history(),
        };
        let calibrated = Calibrator::new(&store, fast_policy())
            .calibrate(&request("warehouse"))
            .unwrap();
        assert!(!calibrated.is_degraded());
    }

    #[test]
    fn test_dead_store_falls_back_degraded() {
        let store = FlakyStore {
            failures_left: AtomicU32::new(100),
            inner: history(),
        };
        let calibrated = Calibrator::new(&store, fast_policy())
            .calibrate(&request("warehouse"))
            .unwrap();
        assert!(calibrated.is_degraded());
        assert_eq!(calibrated.source, CalibrationSource::Fallback);
        assert_eq!(calibrated.distribution.family(), DistributionFamily::Triangular);
    }

    #[test]
    fn test_unknown_archetype_falls_back() {
        let store = history();
        let calibrated = Calibrator::new(&store, fast_policy())
            .calibrate(&request("tunnel"))
            .unwrap();
        assert!(calibrated.is_degraded());
    }

    #[test]
    fn test_strict_policy_surfaces_the_failure() {
        let store = history();
        let err = Calibrator::new(&store, RecoveryPolicy::strict())
            .calibrate(&request("tunnel"))
            .unwrap_err();
        assert!(matches!(err, FitError::Source(PatternStoreError::NotFound { .. })));
    }

    #[test]
    fn test_invalid_fallback_is_rejected() {
        let store = history();
        let mut req = request("warehouse");
        req.fallback = ThreePointEstimate::new(10.0, 5.0, 1.0);
        assert!(matches!(
            Calibrator::new(&store, fast_policy()).calibrate(&req),
            Err(FitError::Invalid(_))
        ));
    }

    #[test]
    fn test_recorded_outcomes_feed_later_calibration() {
        let store = InMemoryPatternStore::new();
        let calibrator = Calibrator::new(&store, fast_policy());
        for v in [2.0, 4.0, 6.0, 8.0, 10.0] {
            calibrator
                .record_outcome("depot", OutcomeMetric::ScheduleVariance, v)
                .unwrap();
        }
        let mut req = request("depot");
        req.metric = OutcomeMetric::ScheduleVariance;
        let calibrated = calibrator.calibrate(&req).unwrap();
        assert!((calibrated.distribution.mean() - 6.0).abs() < 1e-12);
    }
}
