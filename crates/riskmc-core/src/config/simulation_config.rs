//! Simulation run configuration.

use serde::{Deserialize, Serialize};

use crate::constants;

/// Caller-supplied run settings. Validated when a run is configured.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Iteration count. Default: 10,000. Floor: 1,000.
    pub iterations: Option<u32>,
    /// Random seed. `None` produces a non-reproducible run.
    pub seed: Option<u64>,
    /// Time budget in seconds. Default: 30 per 100 risks.
    pub time_budget_secs: Option<f64>,
    /// Relative change in rolling mean/std dev tolerated between checkpoints.
    /// Default: 0.01.
    pub convergence_tolerance: Option<f64>,
    /// Iterations between convergence checkpoints. Default: 500.
    pub checkpoint_interval: Option<u32>,
    /// Consecutive stable checkpoints required to converge. Default: 3.
    pub stable_checkpoints: Option<u32>,
    /// Iterations per independently seeded chunk. Default: 1,000.
    pub chunk_size: Option<u32>,
    /// Worker threads. `None` uses the global rayon pool, `Some(1)` runs serially.
    pub threads: Option<usize>,
}

impl SimulationConfig {
    /// Returns the effective iteration count, defaulting to 10,000.
    pub fn effective_iterations(&self) -> u32 {
        self.iterations.unwrap_or(constants::DEFAULT_ITERATIONS)
    }

    /// Returns the effective time budget for `risk_count` risks.
    ///
    /// The default budget covers 100 risks and grows by one budget per
    /// additional block of 100. An explicit budget is never scaled.
    pub fn effective_time_budget_secs(&self, risk_count: usize) -> f64 {
        self.time_budget_secs.unwrap_or_else(|| {
            let blocks = risk_count.div_ceil(constants::RISKS_PER_BUDGET_BLOCK).max(1);
            constants::DEFAULT_TIME_BUDGET_SECS * blocks as f64
        })
    }

    /// Returns the effective convergence tolerance, defaulting to 0.01.
    pub fn effective_convergence_tolerance(&self) -> f64 {
        self.convergence_tolerance
            .unwrap_or(constants::DEFAULT_CONVERGENCE_TOLERANCE)
    }

    /// Returns the effective checkpoint interval, defaulting to 500.
    pub fn effective_checkpoint_interval(&self) -> u32 {
        self.checkpoint_interval
            .unwrap_or(constants::DEFAULT_CHECKPOINT_INTERVAL)
    }

    /// Returns the effective stable checkpoint count, defaulting to 3.
    pub fn effective_stable_checkpoints(&self) -> u32 {
        self.stable_checkpoints
            .unwrap_or(constants::DEFAULT_STABLE_CHECKPOINTS)
    }

    /// Returns the effective chunk size, defaulting to 1,000.
    pub fn effective_chunk_size(&self) -> u32 {
        self.chunk_size.unwrap_or(constants::DEFAULT_CHUNK_SIZE)
    }

    /// Builder: set the iteration count.
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = Some(iterations);
        self
    }

    /// Builder: set a deterministic seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder: set the time budget.
    pub fn with_time_budget_secs(mut self, secs: f64) -> Self {
        self.time_budget_secs = Some(secs);
        self
    }

    /// Builder: set the worker thread count.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }
}
