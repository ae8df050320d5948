//! Recovery strategies per failure category.

use std::time::Duration;

use serde::Serialize;
use tracing::warn;

use riskmc_core::config::RecoveryConfig;
use riskmc_core::errors::{ErrorCategory, RiskErrorCode};
use riskmc_core::tracing::metrics;

/// What the engine does with a failure of a given category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum RecoveryStrategy {
    /// Surface the error to the caller unchanged.
    Abort,
    /// Retry the same operation.
    Retry { max_attempts: u32, backoff_ms: u64 },
    /// Substitute caller-provided defaults and flag the run as degraded.
    Fallback,
    /// Re-run with more iterations, up to a cap.
    Escalate { growth: f64, max_iterations: u32 },
    /// Keep the result but mark it qualified.
    AcceptQualified,
}

/// Recovery limits resolved from `RecoveryConfig`.
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveryPolicy {
    pub max_retries: u32,
    pub retry_backoff: Duration,
    pub convergence_growth: f64,
    pub max_recovery_iterations: u32,
    pub allow_degraded: bool,
}

impl Default for RecoveryPolicy {
    fn default() -> Self {
        Self::from_config(&RecoveryConfig::default())
    }
}

impl RecoveryPolicy {
    pub fn from_config(config: &RecoveryConfig) -> Self {
        Self {
            max_retries: config.effective_max_retries(),
            retry_backoff: Duration::from_millis(config.effective_retry_backoff_ms()),
            convergence_growth: config.effective_convergence_growth(),
            max_recovery_iterations: config.effective_max_recovery_iterations(),
            allow_degraded: config.effective_allow_degraded(),
        }
    }

    /// Policy with no retries, no backoff, and no degraded fallback.
    pub fn strict() -> Self {
        Self {
            max_retries: 0,
            retry_backoff: Duration::ZERO,
            allow_degraded: false,
            ..Self::default()
        }
    }

    /// Builder: set the retry backoff.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Primary strategy for a failure category.
    pub fn strategy_for(&self, category: ErrorCategory) -> RecoveryStrategy {
        match category {
            ErrorCategory::DataUnavailable if self.max_retries > 0 => RecoveryStrategy::Retry {
                max_attempts: self.max_retries,
                backoff_ms: self.retry_backoff.as_millis() as u64,
            },
            ErrorCategory::DataUnavailable | ErrorCategory::InsufficientData => {
                if self.allow_degraded {
                    RecoveryStrategy::Fallback
                } else {
                    RecoveryStrategy::Abort
                }
            }
            ErrorCategory::Convergence => RecoveryStrategy::Escalate {
                growth: self.convergence_growth,
                max_iterations: self.max_recovery_iterations,
            },
            ErrorCategory::Configuration
            | ErrorCategory::Validation
            | ErrorCategory::Computation
            | ErrorCategory::TimedOut
            | ErrorCategory::Cancelled => RecoveryStrategy::Abort,
        }
    }

    /// Strategy once retries for `category` are exhausted.
    pub fn after_retries(&self, category: ErrorCategory) -> RecoveryStrategy {
        match category {
            ErrorCategory::DataUnavailable | ErrorCategory::InsufficientData
                if self.allow_degraded =>
            {
                RecoveryStrategy::Fallback
            }
            ErrorCategory::Convergence => RecoveryStrategy::AcceptQualified,
            _ => RecoveryStrategy::Abort,
        }
    }
}

/// Run `operation`, retrying while the policy says its failure is retryable.
///
/// `operation` receives the zero-based attempt number. The last error is
/// returned once attempts are exhausted or the failure is not retryable.
pub fn retry_with<T, E, F>(policy: &RecoveryPolicy, operation: &str, mut op: F) -> Result<T, E>
where
    E: RiskErrorCode + std::fmt::Display,
    F: FnMut(u32) -> Result<T, E>,
{
    let mut attempt = 0;
    loop {
        match op(attempt) {
            Ok(value) => return Ok(value),
            Err(e) => match policy.strategy_for(e.category()) {
                RecoveryStrategy::Retry {
                    max_attempts,
                    backoff_ms,
                } if attempt < max_attempts => {
                    warn!(
                        operation,
                        metric = metrics::RETRY_ATTEMPT,
                        attempt = attempt + 1,
                        error = %e,
                        "retrying after recoverable failure"
                    );
                    if backoff_ms > 0 {
                        std::thread::sleep(Duration::from_millis(backoff_ms));
                    }
                    attempt += 1;
                }
                _ => return Err(e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use riskmc_core::errors::{ConfigError, PatternStoreError};

    fn unavailable() -> PatternStoreError {
        PatternStoreError::Unavailable {
            store: "flaky".into(),
            reason: "connection refused".into(),
        }
    }

    #[test]
    fn test_non_recoverable_categories_abort() {
        let policy = RecoveryPolicy::default();
        for category in [
            ErrorCategory::Configuration,
            ErrorCategory::Validation,
            ErrorCategory::Computation,
            ErrorCategory::TimedOut,
            ErrorCategory::Cancelled,
        ] {
            assert_eq!(policy.strategy_for(category), RecoveryStrategy::Abort);
        }
    }

    #[test]
    fn test_unavailable_data_retries_then_falls_back() {
        let policy = RecoveryPolicy::default();
        assert!(matches!(
            policy.strategy_for(ErrorCategory::DataUnavailable),
            RecoveryStrategy::Retry { max_attempts: 2, .. }
        ));
        assert_eq!(
            policy.after_retries(ErrorCategory::DataUnavailable),
            RecoveryStrategy::Fallback
        );
        assert_eq!(
            RecoveryPolicy::strict().strategy_for(ErrorCategory::DataUnavailable),
            RecoveryStrategy::Abort
        );
    }

    #[test]
    fn test_retry_with_succeeds_on_later_attempt() {
        let policy = RecoveryPolicy::default().with_backoff(Duration::ZERO);
        let mut calls = 0;
        let value = retry_with(&policy, "flaky_read", |attempt| {
            calls += 1;
            if attempt < 2 {
                Err(unavailable())
            } else {
                Ok(42)
            }
        })
        .unwrap();
        assert_eq!(value, 42);
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_retry_with_gives_up_after_max_attempts() {
        let policy = RecoveryPolicy::default().with_backoff(Duration::ZERO);
        let mut calls = 0;
        let result: Result<(), _> = retry_with(&policy, "dead_read", |_| {
            calls += 1;
            Err(unavailable())
        });
        assert!(result.is_err());
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_retry_with_does_not_retry_configuration_errors() {
        let policy = RecoveryPolicy::default();
        let mut calls = 0;
        let result: Result<(), _> = retry_with(&policy, "configure", |_| {
            calls += 1;
            Err(ConfigError::EmptyRiskSet)
        });
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }
}
