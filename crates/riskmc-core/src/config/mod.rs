//! Configuration system for riskmc.
//! TOML-based, layered resolution: CLI > env > project > user > defaults.

pub mod analysis_config;
pub mod recovery_config;
pub mod risk_config;
pub mod scenario_config;
pub mod simulation_config;

pub use analysis_config::AnalysisConfig;
pub use recovery_config::RecoveryConfig;
pub use risk_config::{CliOverrides, RiskConfig};
pub use scenario_config::ScenarioConfig;
pub use simulation_config::SimulationConfig;
