//! Cooperative cancellation token.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Stop signal polled by a simulation run between iteration batches.
///
/// A run that observes the signal stops at its next budget check and
/// reports `Cancelled`; samples drawn so far are discarded.
pub trait Cancellable {
    /// True once any holder has asked the run to stop.
    fn is_cancelled(&self) -> bool;

    /// Ask every run polling this signal to stop.
    fn cancel(&self);
}

/// Shared stop flag handed to `SimulationRun::run_with_cancel`.
///
/// Clones share the same flag, so one clone can be handed to a run while
/// another stays with the caller.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// A token that has not been cancelled.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl Cancellable for CancellationToken {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}
