//! Error handling for riskmc.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod analysis_error;
pub mod computation_error;
pub mod config_error;
pub mod convergence_error;
pub mod correlation_error;
pub mod error_code;
pub mod fit_error;
pub mod pattern_store_error;
pub mod scenario_error;
pub mod simulation_error;
pub mod validation_error;

pub use analysis_error::AnalysisError;
pub use computation_error::ComputationError;
pub use config_error::ConfigError;
pub use convergence_error::ConvergenceError;
pub use correlation_error::CorrelationError;
pub use error_code::{ErrorCategory, ErrorReport, RiskErrorCode};
pub use fit_error::FitError;
pub use pattern_store_error::PatternStoreError;
pub use scenario_error::ScenarioError;
pub use simulation_error::SimulationError;
pub use validation_error::ValidationError;
