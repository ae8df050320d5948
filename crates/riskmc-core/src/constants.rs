//! Shared constants for the riskmc engine.

/// riskmc version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Hard floor on the iteration count of any run.
pub const MIN_ITERATIONS: u32 = 1_000;

/// Default iteration count.
pub const DEFAULT_ITERATIONS: u32 = 10_000;

/// Default time budget in seconds per block of `RISKS_PER_BUDGET_BLOCK` risks.
pub const DEFAULT_TIME_BUDGET_SECS: f64 = 30.0;

/// Risk count covered by one default time budget.
pub const RISKS_PER_BUDGET_BLOCK: usize = 100;

/// Default relative convergence tolerance on rolling mean and std dev.
pub const DEFAULT_CONVERGENCE_TOLERANCE: f64 = 0.01;

/// Iterations between convergence checkpoints.
pub const DEFAULT_CHECKPOINT_INTERVAL: u32 = 500;

/// Consecutive stable checkpoints required to declare convergence.
pub const DEFAULT_STABLE_CHECKPOINTS: u32 = 3;

/// Iterations between elapsed-time / cancellation checks inside a chunk.
pub const BUDGET_CHECK_INTERVAL: usize = 100;

/// Iterations per independently seeded RNG chunk.
pub const DEFAULT_CHUNK_SIZE: u32 = 1_000;

/// Minimum sample count accepted by any distribution fit.
pub const MIN_FIT_SAMPLES: usize = 5;

/// Default percentile levels reported by the results analyzer.
pub const DEFAULT_PERCENTILE_LEVELS: [f64; 7] = [10.0, 25.0, 50.0, 75.0, 90.0, 95.0, 99.0];

/// Default confidence interval levels.
pub const DEFAULT_CONFIDENCE_LEVELS: [f64; 3] = [0.80, 0.90, 0.95];

/// Default number of ranked risk contributions returned.
pub const DEFAULT_TOP_N_CONTRIBUTIONS: usize = 10;

/// Allowed deviation of summed contribution shares from 1.0 before they are
/// reported unnormalized.
pub const DEFAULT_NORMALIZATION_TOLERANCE: f64 = 0.05;

/// Default significance level for scenario comparisons.
pub const DEFAULT_SIGNIFICANCE_ALPHA: f64 = 0.05;

/// Default sensitivity perturbation fraction (+10%).
pub const DEFAULT_PERTURBATION_FRACTION: f64 = 0.10;

/// Default retry count for recoverable data-source failures.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Default backoff between retries in milliseconds.
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 50;

/// Iteration growth factor applied when re-running a non-converged run.
pub const DEFAULT_CONVERGENCE_GROWTH: f64 = 2.0;

/// Upper bound on iterations reached by convergence re-runs.
pub const DEFAULT_MAX_RECOVERY_ITERATIONS: u32 = 200_000;

/// Symmetry tolerance for correlation matrices.
pub const CORRELATION_EPSILON: f64 = 1e-9;

/// Pivot tolerance used by the semi-definite Cholesky factorization.
pub const CHOLESKY_PIVOT_EPSILON: f64 = 1e-10;
