//! Re-running non-converged simulations with more iterations.

use serde::Serialize;
use tracing::info;

use riskmc_core::errors::{ErrorCategory, SimulationError};

use super::policy::{RecoveryPolicy, RecoveryStrategy};
use crate::simulation::{SimulationResult, SimulationRun};

/// Outcome of `run_until_converged`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvergenceRecovery {
    pub result: SimulationResult,
    /// Iteration count of every attempt, in order.
    pub attempts: Vec<usize>,
    /// True when the cap was reached without converging and the final
    /// result was accepted as a qualified estimate.
    pub qualified: bool,
}

/// Run, then keep growing the iteration count by the policy's factor until
/// the result converges or the cap is reached.
///
/// Every attempt replays the first attempt's seed. Chunk streams depend only
/// on the seed and chunk index, so each attempt extends the previous vector.
/// Truncated results are returned as they are.
pub fn run_until_converged(
    run: &SimulationRun,
    policy: &RecoveryPolicy,
) -> Result<ConvergenceRecovery, SimulationError> {
    let first = run.run()?;
    let (seed, seeded) = (first.seed(), first.seeded());
    let mut attempts = vec![first.iterations()];
    let mut result = first;

    while !result.is_converged() && !result.truncated() {
        let RecoveryStrategy::Escalate { growth, max_iterations } =
            policy.strategy_for(ErrorCategory::Convergence)
        else {
            break;
        };
        let current = result.iterations();
        let next = ((current as f64 * growth).ceil() as usize).min(max_iterations as usize);
        if next <= current {
            break;
        }

        info!(current, next, "run did not converge, escalating iterations");
        let escalated = run.reconfigure(&run.config().clone().with_iterations(next as u32))?;
        result = escalated.run_with_seed(seed)?;
        result.seeded = seeded;
        attempts.push(result.iterations());
    }

    let qualified = !result.is_converged()
        && policy.after_retries(ErrorCategory::Convergence) == RecoveryStrategy::AcceptQualified;
    Ok(ConvergenceRecovery {
        result,
        attempts,
        qualified,
    })
}
