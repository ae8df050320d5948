//! # riskmc-core
//!
//! Foundation crate for the riskmc Monte Carlo engine.
//! Defines errors, config, tracing setup, shared traits, identifiers, and
//! constants. The engine crate depends on this; nothing here samples.

pub mod config;
pub mod constants;
pub mod errors;
pub mod tracing;
pub mod traits;
pub mod types;

pub use config::RiskConfig;
pub use errors::{ErrorCategory, ErrorReport, RiskErrorCode};
pub use types::{DegradationEvent, RiskId};
