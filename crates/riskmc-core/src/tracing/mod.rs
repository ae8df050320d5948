//! Observability system for riskmc.
//! `tracing` crate with `EnvFilter`, per-subsystem log levels.

pub mod metrics;
pub mod setup;

pub use setup::{env_filter, init_tracing};
