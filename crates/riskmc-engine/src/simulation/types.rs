//! Run lifecycle and result types.

use serde::Serialize;

use riskmc_core::errors::ConvergenceError;
use riskmc_core::types::{DegradationEvent, RiskId};

/// Outcome totals accumulated per iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeType {
    Cost,
    Schedule,
}

impl OutcomeType {
    pub const ALL: [OutcomeType; 2] = [OutcomeType::Cost, OutcomeType::Schedule];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Cost => "cost",
            Self::Schedule => "schedule",
        }
    }
}

impl std::fmt::Display for OutcomeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// `Configured → Running → {Converged | Completed | Failed | TimedOut}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum RunState {
    Configured = 0,
    Running = 1,
    /// All iterations ran and the convergence criterion held.
    Converged = 2,
    /// All iterations ran; the estimate is qualified as not converged.
    Completed = 3,
    Failed = 4,
    /// The budget expired. A result in this state is a truncated prefix.
    TimedOut = 5,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Converged | Self::Completed | Self::Failed | Self::TimedOut
        )
    }

    pub fn can_transition_to(&self, next: RunState) -> bool {
        match (self, next) {
            (Self::Configured, Self::Running) => true,
            (Self::Running, next) => next.is_terminal(),
            // A configured run can be executed again.
            (current, Self::Running) => current.is_terminal(),
            _ => false,
        }
    }

    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Running,
            2 => Self::Converged,
            3 => Self::Completed,
            4 => Self::Failed,
            5 => Self::TimedOut,
            _ => Self::Configured,
        }
    }
}

/// Rolling statistics at one checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Checkpoint {
    pub iteration: usize,
    pub mean: f64,
    pub std_dev: f64,
    /// Larger of the relative changes in mean and std dev since the previous
    /// checkpoint. Infinite at the first checkpoint.
    pub relative_change: f64,
    pub stable: bool,
}

/// Convergence trace for one outcome vector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeConvergence {
    pub checkpoints: Vec<Checkpoint>,
    /// Iteration at which the final run of stable checkpoints reached the
    /// required length.
    pub converged_at: Option<usize>,
}

impl OutcomeConvergence {
    pub fn is_converged(&self) -> bool {
        self.converged_at.is_some()
    }

    pub fn last_relative_change(&self) -> f64 {
        self.checkpoints
            .last()
            .map_or(f64::INFINITY, |c| c.relative_change)
    }
}

/// Convergence evaluation for both outcome vectors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvergenceReport {
    pub tolerance: f64,
    pub checkpoint_interval: usize,
    pub required_stable: usize,
    pub cost: OutcomeConvergence,
    pub schedule: OutcomeConvergence,
}

impl ConvergenceReport {
    pub fn is_converged(&self) -> bool {
        self.cost.is_converged() && self.schedule.is_converged()
    }

    pub fn outcome(&self, outcome: OutcomeType) -> &OutcomeConvergence {
        match outcome {
            OutcomeType::Cost => &self.cost,
            OutcomeType::Schedule => &self.schedule,
        }
    }

    /// Later of the two outcomes' convergence points.
    pub fn converged_at(&self) -> Option<usize> {
        Some(self.cost.converged_at?.max(self.schedule.converged_at?))
    }
}

/// Per-iteration outcome totals of a completed run.
///
/// Read-only once produced. Every downstream statistic is derived from the
/// raw vectors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    pub(crate) cost: Vec<f64>,
    pub(crate) schedule: Vec<f64>,
    pub(crate) state: RunState,
    pub(crate) seed: u64,
    pub(crate) seeded: bool,
    pub(crate) iterations_requested: usize,
    pub(crate) truncated: bool,
    pub(crate) elapsed_ms: u64,
    pub(crate) convergence: ConvergenceReport,
    pub(crate) degradations: Vec<DegradationEvent>,
    pub(crate) risk_ids: Vec<RiskId>,
}

impl SimulationResult {
    pub fn outcome(&self, outcome: OutcomeType) -> &[f64] {
        match outcome {
            OutcomeType::Cost => &self.cost,
            OutcomeType::Schedule => &self.schedule,
        }
    }

    pub fn cost(&self) -> &[f64] {
        &self.cost
    }

    pub fn schedule(&self) -> &[f64] {
        &self.schedule
    }

    pub fn iterations(&self) -> usize {
        self.cost.len()
    }

    pub fn iterations_requested(&self) -> usize {
        self.iterations_requested
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Seed that reproduces this result.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// False when the seed was generated because none was configured.
    pub fn seeded(&self) -> bool {
        self.seeded
    }

    pub fn truncated(&self) -> bool {
        self.truncated
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn convergence(&self) -> &ConvergenceReport {
        &self.convergence
    }

    pub fn is_converged(&self) -> bool {
        self.state == RunState::Converged
    }

    pub fn degradations(&self) -> &[DegradationEvent] {
        &self.degradations
    }

    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }

    pub fn risk_ids(&self) -> &[RiskId] {
        &self.risk_ids
    }

    /// Treat a qualified (non-converged) estimate as an error.
    pub fn require_converged(&self) -> Result<&Self, ConvergenceError> {
        if self.is_converged() {
            return Ok(self);
        }
        let (cost, schedule) = (
            self.convergence.cost.last_relative_change(),
            self.convergence.schedule.last_relative_change(),
        );
        Err(ConvergenceError {
            iterations: self.iterations(),
            last_relative_change: cost.max(schedule),
            tolerance: self.convergence.tolerance,
        })
    }
}
