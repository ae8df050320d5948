//! Shared value types.

pub mod degradation;
pub mod identifiers;

pub use degradation::DegradationEvent;
pub use identifiers::RiskId;
