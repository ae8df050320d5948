//! `SimulationRun`: configure once, run many times.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{debug, field, info, info_span, instrument, warn};

use riskmc_core::config::SimulationConfig;
use riskmc_core::constants::MIN_ITERATIONS;
use riskmc_core::errors::{ComputationError, ConfigError, SimulationError};
use riskmc_core::tracing::metrics;
use riskmc_core::traits::CancellationToken;
use riskmc_core::types::{DegradationEvent, RiskId};

use super::convergence::ConvergenceCriteria;
use super::kernel::{assemble, chunk_plan, BudgetMonitor, IterationKernel, StopReason};
use super::types::{RunState, SimulationResult};
use crate::correlation::{decompose, CholeskyFactor, CorrelationMatrix};
use crate::distribution::Sampler;
use crate::model::Risk;

/// A validated run: ordered risks, their correlation matrix and settings.
///
/// Samplers and the Cholesky factor are built at configure time and shared
/// read-only by every iteration and every re-run.
#[derive(Debug)]
pub struct SimulationRun {
    risks: Vec<Arc<Risk>>,
    matrix: Arc<CorrelationMatrix>,
    config: SimulationConfig,
    factor: Arc<CholeskyFactor>,
    samplers: Arc<[Sampler]>,
    degradations: Vec<DegradationEvent>,
    state: AtomicU8,
}

impl Clone for SimulationRun {
    fn clone(&self) -> Self {
        Self {
            risks: self.risks.clone(),
            matrix: Arc::clone(&self.matrix),
            config: self.config.clone(),
            factor: Arc::clone(&self.factor),
            samplers: Arc::clone(&self.samplers),
            degradations: self.degradations.clone(),
            state: AtomicU8::new(RunState::Configured as u8),
        }
    }
}

impl SimulationRun {
    /// Validate inputs and prepare samplers and the Cholesky factor.
    ///
    /// Every failure here happens before any sampling.
    #[instrument(skip_all, fields(risks = risks.len()))]
    pub fn configure(
        risks: Vec<Arc<Risk>>,
        matrix: Arc<CorrelationMatrix>,
        config: &SimulationConfig,
    ) -> Result<Self, SimulationError> {
        validate_settings(config, risks.len())?;
        check_risks(&risks, &matrix)?;
        let samplers = build_samplers(&risks)?;

        let started = Instant::now();
        let factor = decompose(&matrix)?;
        debug!(
            metric = metrics::DECOMPOSITION_TIME_US,
            value = started.elapsed().as_micros() as u64,
            dim = matrix.dim(),
            "correlation matrix decomposed"
        );

        Ok(Self {
            risks,
            matrix,
            config: config.clone(),
            factor: Arc::new(factor),
            samplers,
            degradations: Vec::new(),
            state: AtomicU8::new(RunState::Configured as u8),
        })
    }

    /// Same matrix and settings, different risks. The factor is reused.
    pub fn with_risks(&self, risks: Vec<Arc<Risk>>) -> Result<Self, SimulationError> {
        check_risks(&risks, &self.matrix)?;
        let samplers = build_samplers(&risks)?;
        Ok(Self {
            risks,
            samplers,
            ..self.clone()
        })
    }

    /// Same risks and matrix, different settings.
    pub fn reconfigure(&self, config: &SimulationConfig) -> Result<Self, SimulationError> {
        validate_settings(config, self.risks.len())?;
        Ok(Self {
            config: config.clone(),
            ..self.clone()
        })
    }

    /// Attach degradation events (e.g. calibration fallbacks) that every
    /// result of this run will carry.
    pub fn with_degradations(mut self, events: Vec<DegradationEvent>) -> Self {
        self.degradations.extend(events);
        self
    }

    pub fn risks(&self) -> &[Arc<Risk>] {
        &self.risks
    }

    pub fn risk_ids(&self) -> Vec<RiskId> {
        self.risks.iter().map(|r| r.id().clone()).collect()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.risks.iter().position(|r| r.id().as_str() == id)
    }

    pub fn matrix(&self) -> &Arc<CorrelationMatrix> {
        &self.matrix
    }

    pub fn factor(&self) -> &CholeskyFactor {
        &self.factor
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn degradations(&self) -> &[DegradationEvent] {
        &self.degradations
    }

    /// State of the most recent execution.
    pub fn state(&self) -> RunState {
        RunState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Run with the configured seed, or a fresh one if none is set.
    pub fn run(&self) -> Result<SimulationResult, SimulationError> {
        let (seed, seeded) = self.resolve_seed();
        self.execute(seed, seeded, None, None)
    }

    /// Run, stopping with `SimulationError::Cancelled` once `token` fires.
    pub fn run_with_cancel(&self, token: &CancellationToken) -> Result<SimulationResult, SimulationError> {
        let (seed, seeded) = self.resolve_seed();
        self.execute(seed, seeded, None, Some(token))
    }

    /// Run with an explicit seed, ignoring the configured one.
    pub fn run_with_seed(&self, seed: u64) -> Result<SimulationResult, SimulationError> {
        self.execute(seed, true, None, None)
    }

    /// Run with one risk held at its expected impact.
    pub(crate) fn run_frozen(&self, index: usize, seed: u64) -> Result<SimulationResult, SimulationError> {
        self.execute(seed, true, Some(index), None)
    }

    fn resolve_seed(&self) -> (u64, bool) {
        match self.config.seed {
            Some(seed) => (seed, true),
            None => (rand::random::<u64>(), false),
        }
    }

    fn execute(
        &self,
        seed: u64,
        seeded: bool,
        frozen: Option<usize>,
        cancel: Option<&CancellationToken>,
    ) -> Result<SimulationResult, SimulationError> {
        let requested = self.config.effective_iterations() as usize;
        let span = info_span!(
            "simulation_run",
            risks = self.risks.len(),
            iterations = requested,
            seed,
            frozen = frozen.map(|i| i as u64),
            run_duration_ms = field::Empty,
            iterations_per_second = field::Empty,
            converged_at = field::Empty,
        );
        let _entered = span.enter();
        // Contribution re-runs share this run concurrently and leave its
        // lifecycle alone.
        let mark = |state: RunState| {
            if frozen.is_none() {
                self.transition(state);
            }
        };
        mark(RunState::Running);

        let started = Instant::now();
        let budget_secs = self.config.effective_time_budget_secs(self.risks.len());
        let budget = Duration::try_from_secs_f64(budget_secs).unwrap_or(Duration::MAX);
        let monitor = BudgetMonitor::new(started.checked_add(budget), cancel);
        let kernel = IterationKernel {
            risks: &self.risks,
            samplers: &self.samplers,
            factor: &self.factor,
            frozen,
        };
        let plan = chunk_plan(requested, self.config.effective_chunk_size() as usize);

        let chunks = self
            .dispatch(|| {
                plan.par_iter()
                    .map(|chunk| kernel.run_chunk(seed, *chunk, &monitor))
                    .collect::<Vec<_>>()
            })
            .and_then(assemble);
        let assembled = match chunks {
            Ok(assembled) => assembled,
            Err(e) => {
                mark(RunState::Failed);
                warn!(error = %e, "simulation run failed");
                return Err(e.into());
            }
        };

        let elapsed = started.elapsed();
        let elapsed_ms = elapsed.as_millis() as u64;
        let completed = assembled.cost.len();
        span.record(metrics::RUN_DURATION_MS, elapsed_ms);
        span.record(
            metrics::ITERATIONS_PER_SECOND,
            completed as f64 / elapsed.as_secs_f64().max(f64::EPSILON),
        );

        if monitor.reason() == Some(StopReason::Cancelled) {
            mark(RunState::Failed);
            info!(completed, "simulation run cancelled");
            return Err(SimulationError::Cancelled);
        }

        let truncated = !assembled.complete;
        if truncated {
            mark(RunState::TimedOut);
            if completed < MIN_ITERATIONS as usize {
                warn!(completed, budget_secs, "time budget exhausted before the iteration floor");
                return Err(SimulationError::TimedOut {
                    completed,
                    required: MIN_ITERATIONS as usize,
                    budget_ms: (budget_secs * 1_000.0) as u64,
                });
            }
            warn!(completed, requested, "time budget exhausted, returning truncated result");
        }

        let convergence = self.criteria().evaluate(&assembled.cost, &assembled.schedule);
        let state = if truncated {
            RunState::TimedOut
        } else if convergence.is_converged() {
            RunState::Converged
        } else {
            RunState::Completed
        };
        if !truncated {
            mark(state);
        }
        if let Some(at) = convergence.converged_at() {
            span.record(metrics::CONVERGED_AT, at as u64);
        }
        info!(completed, state = ?state, elapsed_ms, "simulation run finished");

        Ok(SimulationResult {
            cost: assembled.cost,
            schedule: assembled.schedule,
            state,
            seed,
            seeded,
            iterations_requested: requested,
            truncated,
            elapsed_ms,
            convergence,
            degradations: self.degradations.clone(),
            risk_ids: self.risk_ids(),
        })
    }

    fn criteria(&self) -> ConvergenceCriteria {
        ConvergenceCriteria {
            tolerance: self.config.effective_convergence_tolerance(),
            checkpoint_interval: self.config.effective_checkpoint_interval() as usize,
            required_stable: self.config.effective_stable_checkpoints() as usize,
        }
    }

    /// Run `job` on a dedicated pool when a thread count is configured,
    /// otherwise on the global rayon pool.
    fn dispatch<T, F>(&self, job: F) -> Result<T, ComputationError>
    where
        T: Send,
        F: FnOnce() -> T + Send,
    {
        match self.config.threads {
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| ComputationError::WorkerPool(e.to_string()))?;
                Ok(pool.install(job))
            }
            None => Ok(job()),
        }
    }

    fn transition(&self, next: RunState) {
        let current = self.state();
        if !current.can_transition_to(next) {
            warn!(from = ?current, to = ?next, "unexpected run state transition");
        }
        self.state.store(next as u8, Ordering::Release);
    }
}

fn validate_settings(config: &SimulationConfig, risk_count: usize) -> Result<(), ConfigError> {
    let iterations = config.effective_iterations();
    if iterations < MIN_ITERATIONS {
        return Err(ConfigError::IterationsBelowFloor {
            requested: iterations,
            floor: MIN_ITERATIONS,
        });
    }
    let budget = config.effective_time_budget_secs(risk_count);
    if !budget.is_finite() || budget <= 0.0 {
        return Err(invalid("simulation.time_budget_secs", format!("{budget} must be positive")));
    }
    let tolerance = config.effective_convergence_tolerance();
    if !(tolerance > 0.0 && tolerance < 1.0) {
        return Err(invalid(
            "simulation.convergence_tolerance",
            format!("{tolerance} must be in (0, 1)"),
        ));
    }
    if config.effective_checkpoint_interval() == 0 {
        return Err(invalid("simulation.checkpoint_interval", "must be at least 1".into()));
    }
    if config.effective_stable_checkpoints() == 0 {
        return Err(invalid("simulation.stable_checkpoints", "must be at least 1".into()));
    }
    if config.effective_chunk_size() == 0 {
        return Err(invalid("simulation.chunk_size", "must be at least 1".into()));
    }
    if config.threads == Some(0) {
        return Err(invalid("simulation.threads", "must be at least 1".into()));
    }
    Ok(())
}

fn check_risks(risks: &[Arc<Risk>], matrix: &CorrelationMatrix) -> Result<(), ConfigError> {
    if risks.is_empty() {
        return Err(ConfigError::EmptyRiskSet);
    }
    if matrix.dim() != risks.len() {
        return Err(ConfigError::MatrixSizeMismatch {
            matrix: matrix.dim(),
            risks: risks.len(),
        });
    }
    let mut seen = HashSet::with_capacity(risks.len());
    for risk in risks {
        if !seen.insert(risk.id().as_str()) {
            return Err(ConfigError::DuplicateRiskId {
                id: risk.id().to_string(),
            });
        }
    }
    Ok(())
}

fn build_samplers(risks: &[Arc<Risk>]) -> Result<Arc<[Sampler]>, SimulationError> {
    let samplers = risks
        .iter()
        .map(|risk| risk.distribution().sampler())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(samplers.into())
}

fn invalid(field: &str, message: String) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message,
    }
}
