//! Traits at the seams between the engine and its collaborators.

pub mod cancellation;
pub mod pattern_store;

pub use cancellation::{Cancellable, CancellationToken};
pub use pattern_store::{HistoricalPatternStore, InMemoryPatternStore, OutcomeMetric};
