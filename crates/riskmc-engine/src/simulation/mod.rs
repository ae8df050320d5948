//! Simulation Engine: correlated Monte Carlo iterations over a risk set.
//!
//! `configure` validates everything up front; `run` draws correlated
//! samples chunk by chunk in parallel, sums impacts per outcome, then
//! evaluates convergence over the finished vectors.

pub mod convergence;
pub mod engine;
mod kernel;
pub mod types;

pub use convergence::ConvergenceCriteria;
pub use engine::SimulationRun;
pub use types::{
    Checkpoint, ConvergenceReport, OutcomeConvergence, OutcomeType, RunState, SimulationResult,
};
