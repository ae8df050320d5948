//! Checkpoint-based convergence of rolling mean and standard deviation.

use super::types::{Checkpoint, ConvergenceReport, OutcomeConvergence};

/// Convergence settings resolved from `SimulationConfig`.
///
/// A checkpoint is stable when both the rolling mean and the rolling
/// standard deviation moved by at most `tolerance` since the previous
/// checkpoint. The mean change is measured against the larger of the
/// previous mean's magnitude and the previous standard deviation, so an
/// outcome centred on zero still converges once its spread settles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvergenceCriteria {
    pub tolerance: f64,
    pub checkpoint_interval: usize,
    pub required_stable: usize,
}

impl ConvergenceCriteria {
    pub fn evaluate(&self, cost: &[f64], schedule: &[f64]) -> ConvergenceReport {
        ConvergenceReport {
            tolerance: self.tolerance,
            checkpoint_interval: self.checkpoint_interval,
            required_stable: self.required_stable,
            cost: self.evaluate_outcome(cost),
            schedule: self.evaluate_outcome(schedule),
        }
    }

    /// Walk the vector once with Welford's update, snapshotting at every
    /// checkpoint interval.
    pub fn evaluate_outcome(&self, values: &[f64]) -> OutcomeConvergence {
        let interval = self.checkpoint_interval.max(1);
        let mut checkpoints: Vec<Checkpoint> = Vec::with_capacity(values.len() / interval);
        let (mut mean, mut m2) = (0.0_f64, 0.0_f64);

        for (i, &x) in values.iter().enumerate() {
            let n = (i + 1) as f64;
            let delta = x - mean;
            mean += delta / n;
            m2 += delta * (x - mean);

            if (i + 1) % interval != 0 {
                continue;
            }
            let std_dev = if i == 0 { 0.0 } else { (m2 / (n - 1.0)).sqrt() };
            let relative_change = match checkpoints.last() {
                Some(prev) => relative(prev.mean, mean, prev.mean.abs().max(prev.std_dev))
                    .max(relative(prev.std_dev, std_dev, prev.std_dev)),
                None => f64::INFINITY,
            };
            checkpoints.push(Checkpoint {
                iteration: i + 1,
                mean,
                std_dev,
                relative_change,
                stable: relative_change <= self.tolerance,
            });
        }

        let converged_at = self.trailing_stable_point(&checkpoints);
        OutcomeConvergence {
            checkpoints,
            converged_at,
        }
    }

    fn trailing_stable_point(&self, checkpoints: &[Checkpoint]) -> Option<usize> {
        let required = self.required_stable.max(1);
        let streak = checkpoints.iter().rev().take_while(|c| c.stable).count();
        if streak < required {
            return None;
        }
        let first_of_streak = checkpoints.len() - streak;
        Some(checkpoints[first_of_streak + required - 1].iteration)
    }
}

fn relative(previous: f64, current: f64, scale: f64) -> f64 {
    let diff = (current - previous).abs();
    if diff == 0.0 {
        return 0.0;
    }
    if scale < f64::EPSILON {
        f64::INFINITY
    } else {
        diff / scale
    }
}
