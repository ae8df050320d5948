//! Error recovery configuration.

use serde::{Deserialize, Serialize};

use crate::constants;

/// Retry and fallback limits for recoverable failure categories.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Retries for an unavailable data source. Default: 2.
    pub max_retries: Option<u32>,
    /// Backoff between retries in milliseconds. Default: 50.
    pub retry_backoff_ms: Option<u64>,
    /// Iteration multiplier for convergence re-runs. Default: 2.0.
    pub convergence_growth: Option<f64>,
    /// Iteration cap for convergence re-runs. Default: 200,000.
    pub max_recovery_iterations: Option<u32>,
    /// Fall back to three-point estimates when history is unavailable. Default: true.
    pub allow_degraded: Option<bool>,
}

impl RecoveryConfig {
    pub fn effective_max_retries(&self) -> u32 {
        self.max_retries.unwrap_or(constants::DEFAULT_MAX_RETRIES)
    }

    pub fn effective_retry_backoff_ms(&self) -> u64 {
        self.retry_backoff_ms
            .unwrap_or(constants::DEFAULT_RETRY_BACKOFF_MS)
    }

    pub fn effective_convergence_growth(&self) -> f64 {
        self.convergence_growth
            .unwrap_or(constants::DEFAULT_CONVERGENCE_GROWTH)
    }

    pub fn effective_max_recovery_iterations(&self) -> u32 {
        self.max_recovery_iterations
            .unwrap_or(constants::DEFAULT_MAX_RECOVERY_ITERATIONS)
    }

    pub fn effective_allow_degraded(&self) -> bool {
        self.allow_degraded.unwrap_or(true)
    }
}
