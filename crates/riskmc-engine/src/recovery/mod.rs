//! Error/Recovery layer: what to do with each failure category.
//!
//! Configuration, validation, computation, timeout, and cancellation
//! failures abort. Unavailable data sources are retried, then fall back to
//! three-point estimates in degraded mode. Non-converged runs are re-run with
//! geometrically more iterations until a cap, then accepted as qualified.

pub mod convergence;
pub mod policy;

pub use convergence::{run_until_converged, ConvergenceRecovery};
pub use policy::{retry_with, RecoveryPolicy, RecoveryStrategy};
