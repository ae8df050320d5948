//! Structured span field definitions for riskmc metrics.
//!
//! Standard field names used in tracing spans and events across the engine,
//! so log queries can aggregate runs consistently.

/// Simulation: iterations completed per second.
pub const ITERATIONS_PER_SECOND: &str = "iterations_per_second";

/// Simulation: wall-clock run duration in milliseconds.
pub const RUN_DURATION_MS: &str = "run_duration_ms";

/// Correlation: Cholesky decomposition time in microseconds.
pub const DECOMPOSITION_TIME_US: &str = "decomposition_time_us";

/// Simulation: iteration at which the run was declared converged.
pub const CONVERGED_AT: &str = "converged_at";

/// Results: time spent on contribution re-runs in milliseconds.
pub const CONTRIBUTION_TIME_MS: &str = "contribution_time_ms";

/// Scenario: time spent on sensitivity re-runs in milliseconds.
pub const SENSITIVITY_TIME_MS: &str = "sensitivity_time_ms";

/// Calibration: number of historical samples consumed by a fit.
pub const CALIBRATION_SAMPLES: &str = "calibration_samples";

/// Recovery: attempt number for a retried operation.
pub const RETRY_ATTEMPT: &str = "retry_attempt";
