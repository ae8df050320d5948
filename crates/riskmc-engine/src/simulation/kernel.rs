//! Per-chunk iteration loop.
//!
//! Each chunk owns a `ChaCha8Rng` seeded from the run seed with the chunk
//! index as its stream, so the concatenated vectors do not depend on how
//! chunks are scheduled across threads.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

use riskmc_core::constants::BUDGET_CHECK_INTERVAL;
use riskmc_core::errors::ComputationError;
use riskmc_core::traits::{Cancellable, CancellationToken};

use crate::correlation::{standard_normal_cdf, CholeskyFactor};
use crate::distribution::Sampler;
use crate::model::Risk;

/// Contiguous block of iterations drawn from one RNG stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ChunkSpec {
    pub index: usize,
    pub start: usize,
    pub len: usize,
}

/// Split `iterations` into chunks of at most `chunk_size`.
pub(crate) fn chunk_plan(iterations: usize, chunk_size: usize) -> Vec<ChunkSpec> {
    let chunk_size = chunk_size.max(1);
    (0..iterations.div_ceil(chunk_size))
        .map(|index| {
            let start = index * chunk_size;
            ChunkSpec {
                index,
                start,
                len: chunk_size.min(iterations - start),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ChunkOutput {
    pub cost: Vec<f64>,
    pub schedule: Vec<f64>,
    /// False when the chunk stopped early on a budget or cancel check.
    pub complete: bool,
}

/// Why workers stopped before finishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StopReason {
    TimedOut,
    Cancelled,
    Failed,
}

const RUNNING: u8 = 0;

/// Shared stop flag consulted every `BUDGET_CHECK_INTERVAL` iterations.
/// The first reason recorded wins.
pub(crate) struct BudgetMonitor<'a> {
    deadline: Option<Instant>,
    cancel: Option<&'a CancellationToken>,
    stop: AtomicU8,
}

impl<'a> BudgetMonitor<'a> {
    pub fn new(deadline: Option<Instant>, cancel: Option<&'a CancellationToken>) -> Self {
        Self {
            deadline,
            cancel,
            stop: AtomicU8::new(RUNNING),
        }
    }

    pub fn should_stop(&self) -> bool {
        if self.stop.load(Ordering::Acquire) != RUNNING {
            return true;
        }
        if self.cancel.is_some_and(|token| token.is_cancelled()) {
            self.halt(StopReason::Cancelled);
            return true;
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            self.halt(StopReason::TimedOut);
            return true;
        }
        false
    }

    pub fn halt(&self, reason: StopReason) {
        let code = match reason {
            StopReason::TimedOut => 1,
            StopReason::Cancelled => 2,
            StopReason::Failed => 3,
        };
        let _ = self
            .stop
            .compare_exchange(RUNNING, code, Ordering::AcqRel, Ordering::Acquire);
    }

    pub fn reason(&self) -> Option<StopReason> {
        match self.stop.load(Ordering::Acquire) {
            1 => Some(StopReason::TimedOut),
            2 => Some(StopReason::Cancelled),
            3 => Some(StopReason::Failed),
            _ => None,
        }
    }
}

/// Read-only state shared by every chunk of one run.
pub(crate) struct IterationKernel<'a> {
    pub risks: &'a [Arc<Risk>],
    pub samplers: &'a [Sampler],
    pub factor: &'a CholeskyFactor,
    /// Risk held at its expected impact. Its variates are still drawn so
    /// every other risk sees the same random numbers.
    pub frozen: Option<usize>,
}

impl IterationKernel<'_> {
    pub fn run_chunk(
        &self,
        seed: u64,
        chunk: ChunkSpec,
        monitor: &BudgetMonitor<'_>,
    ) -> Result<ChunkOutput, ComputationError> {
        self.fill_chunk(seed, chunk, monitor).inspect_err(|_| monitor.halt(StopReason::Failed))
    }

    fn fill_chunk(
        &self,
        seed: u64,
        chunk: ChunkSpec,
        monitor: &BudgetMonitor<'_>,
    ) -> Result<ChunkOutput, ComputationError> {
        let n = self.risks.len();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(chunk.index as u64);

        let mut normals = vec![0.0; n];
        let mut correlated = vec![0.0; n];
        let mut occurrence = vec![0.0; n];
        let mut out = ChunkOutput {
            cost: Vec::with_capacity(chunk.len),
            schedule: Vec::with_capacity(chunk.len),
            complete: false,
        };

        for offset in 0..chunk.len {
            if offset % BUDGET_CHECK_INTERVAL == 0 && monitor.should_stop() {
                return Ok(out);
            }
            for z in normals.iter_mut() {
                *z = rng.sample(StandardNormal);
            }
            for u in occurrence.iter_mut() {
                *u = rng.gen::<f64>();
            }
            self.factor.correlate_into(&normals, &mut correlated)?;

            let iteration = chunk.start + offset;
            let (mut cost, mut schedule) = (0.0_f64, 0.0_f64);
            for (k, risk) in self.risks.iter().enumerate() {
                let impact = if self.frozen == Some(k) {
                    risk.expected_impact()
                } else {
                    let draw = self.samplers[k].sample(standard_normal_cdf(correlated[k]));
                    if !draw.is_finite() {
                        return Err(ComputationError::NonFiniteSample {
                            risk_id: risk.id().to_string(),
                            iteration,
                            value: draw,
                        });
                    }
                    risk.impact(draw, occurrence[k] < risk.occurrence_probability())
                };
                let category = risk.category();
                if category.affects_cost() {
                    cost += impact;
                }
                if category.affects_schedule() {
                    schedule += impact;
                }
            }

            if !cost.is_finite() {
                return Err(ComputationError::NonFiniteTotal { outcome: "cost", iteration });
            }
            if !schedule.is_finite() {
                return Err(ComputationError::NonFiniteTotal { outcome: "schedule", iteration });
            }
            out.cost.push(cost);
            out.schedule.push(schedule);
        }
        out.complete = true;
        Ok(out)
    }
}

/// Concatenated chunk outputs in chunk order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Assembled {
    pub cost: Vec<f64>,
    pub schedule: Vec<f64>,
    pub complete: bool,
}

/// Join chunk outputs into one contiguous prefix of the full vectors.
///
/// Any chunk error fails the whole run. Otherwise output stops after the
/// first incomplete chunk, so the result is always a prefix of what an
/// unbounded run would have produced.
pub(crate) fn assemble(
    chunks: Vec<Result<ChunkOutput, ComputationError>>,
) -> Result<Assembled, ComputationError> {
    let chunks = chunks.into_iter().collect::<Result<Vec<_>, _>>()?;
    let total: usize = chunks.iter().map(|c| c.cost.len()).sum();
    let mut assembled = Assembled {
        cost: Vec::with_capacity(total),
        schedule: Vec::with_capacity(total),
        complete: true,
    };
    for chunk in chunks {
        assembled.cost.extend_from_slice(&chunk.cost);
        assembled.schedule.extend_from_slice(&chunk.schedule);
        if !chunk.complete {
            assembled.complete = false;
            break;
        }
    }
    Ok(assembled)
}
