//! Top-level riskmc configuration with layered resolution.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{AnalysisConfig, RecoveryConfig, ScenarioConfig, SimulationConfig};
use crate::constants;
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `apply_cli_overrides`)
/// 2. Environment variables (`RISKMC_*`)
/// 3. Project config (`riskmc.toml` in project root)
/// 4. User config (`~/.riskmc/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct RiskConfig {
    pub simulation: SimulationConfig,
    pub analysis: AnalysisConfig,
    pub scenario: ScenarioConfig,
    pub recovery: RecoveryConfig,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub iterations: Option<u32>,
    pub seed: Option<u64>,
    pub time_budget_secs: Option<f64>,
    pub threads: Option<usize>,
}

impl RiskConfig {
    /// Load configuration with layered resolution rooted at `root`.
    pub fn load(root: &Path, cli_overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Lowest priority: user config
        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                match Self::merge_toml_file(&mut config, &user_config_path) {
                    Ok(()) => {}
                    Err(ConfigError::ParseError { .. }) => {
                        return Err(ConfigError::ParseError {
                            path: user_config_path.display().to_string(),
                            message: "invalid TOML in user config".to_string(),
                        });
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "ignoring unreadable user config");
                    }
                }
            }
        }

        let project_config_path = root.join("riskmc.toml");
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        Self::apply_env_overrides(&mut config);

        if let Some(cli) = cli_overrides {
            Self::apply_cli_overrides(&mut config, cli);
        }

        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    pub fn validate(config: &RiskConfig) -> Result<(), ConfigError> {
        let sim = &config.simulation;
        if let Some(iterations) = sim.iterations {
            if iterations < constants::MIN_ITERATIONS {
                return Err(ConfigError::IterationsBelowFloor {
                    requested: iterations,
                    floor: constants::MIN_ITERATIONS,
                });
            }
        }
        if let Some(budget) = sim.time_budget_secs {
            if !budget.is_finite() || budget <= 0.0 {
                return Err(invalid("simulation.time_budget_secs", "must be a positive number of seconds"));
            }
        }
        if let Some(tolerance) = sim.convergence_tolerance {
            if !(tolerance > 0.0 && tolerance < 1.0) {
                return Err(invalid("simulation.convergence_tolerance", "must be in (0, 1)"));
            }
        }
        if sim.checkpoint_interval == Some(0) {
            return Err(invalid("simulation.checkpoint_interval", "must be greater than 0"));
        }
        if sim.stable_checkpoints == Some(0) {
            return Err(invalid("simulation.stable_checkpoints", "must be greater than 0"));
        }
        if sim.chunk_size == Some(0) {
            return Err(invalid("simulation.chunk_size", "must be greater than 0"));
        }
        if sim.threads == Some(0) {
            return Err(invalid("simulation.threads", "must be greater than 0"));
        }

        let analysis = &config.analysis;
        if analysis
            .percentile_levels
            .iter()
            .any(|p| !(*p > 0.0 && *p < 100.0))
        {
            return Err(invalid("analysis.percentile_levels", "every level must be in (0, 100)"));
        }
        if analysis
            .confidence_levels
            .iter()
            .any(|c| !(*c > 0.0 && *c < 1.0))
        {
            return Err(invalid("analysis.confidence_levels", "every level must be in (0, 1)"));
        }
        if analysis.top_n_contributions == Some(0) {
            return Err(invalid("analysis.top_n_contributions", "must be greater than 0"));
        }
        if let Some(alpha) = analysis.significance_alpha {
            if !(alpha > 0.0 && alpha < 1.0) {
                return Err(invalid("analysis.significance_alpha", "must be in (0, 1)"));
            }
        }
        if let Some(tolerance) = analysis.normalization_tolerance {
            if !tolerance.is_finite() || tolerance < 0.0 {
                return Err(invalid("analysis.normalization_tolerance", "must be non-negative"));
            }
        }

        if let Some(fraction) = config.scenario.perturbation_fraction {
            if !fraction.is_finite() || fraction <= -1.0 {
                return Err(invalid("scenario.perturbation_fraction", "must be greater than -1"));
            }
        }

        if let Some(growth) = config.recovery.convergence_growth {
            if !growth.is_finite() || growth <= 1.0 {
                return Err(invalid("recovery.convergence_growth", "must be greater than 1"));
            }
        }
        if let Some(cap) = config.recovery.max_recovery_iterations {
            if cap < constants::MIN_ITERATIONS {
                return Err(invalid(
                    "recovery.max_recovery_iterations",
                    "must be at least the iteration floor",
                ));
            }
        }
        Ok(())
    }

    /// Returns the user config path: `~/.riskmc/config.toml`.
    fn user_config_path() -> Option<std::path::PathBuf> {
        dirs_path().map(|d| d.join("config.toml"))
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored (forward-compatible).
    fn merge_toml_file(config: &mut RiskConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: RiskConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`, where `other` values override `base` values
    /// only when `other` has a value.
    fn merge(base: &mut RiskConfig, other: &RiskConfig) {
        // Simulation
        let (b, o) = (&mut base.simulation, &other.simulation);
        if o.iterations.is_some() {
            b.iterations = o.iterations;
        }
        if o.seed.is_some() {
            b.seed = o.seed;
        }
        if o.time_budget_secs.is_some() {
            b.time_budget_secs = o.time_budget_secs;
        }
        if o.convergence_tolerance.is_some() {
            b.convergence_tolerance = o.convergence_tolerance;
        }
        if o.checkpoint_interval.is_some() {
            b.checkpoint_interval = o.checkpoint_interval;
        }
        if o.stable_checkpoints.is_some() {
            b.stable_checkpoints = o.stable_checkpoints;
        }
        if o.chunk_size.is_some() {
            b.chunk_size = o.chunk_size;
        }
        if o.threads.is_some() {
            b.threads = o.threads;
        }

        // Analysis
        let (b, o) = (&mut base.analysis, &other.analysis);
        if !o.percentile_levels.is_empty() {
            b.percentile_levels = o.percentile_levels.clone();
        }
        if !o.confidence_levels.is_empty() {
            b.confidence_levels = o.confidence_levels.clone();
        }
        if o.top_n_contributions.is_some() {
            b.top_n_contributions = o.top_n_contributions;
        }
        if o.normalization_tolerance.is_some() {
            b.normalization_tolerance = o.normalization_tolerance;
        }
        if o.significance_alpha.is_some() {
            b.significance_alpha = o.significance_alpha;
        }

        // Scenario
        if other.scenario.perturbation_fraction.is_some() {
            base.scenario.perturbation_fraction = other.scenario.perturbation_fraction;
        }
        if other.scenario.parallel.is_some() {
            base.scenario.parallel = other.scenario.parallel;
        }

        // Recovery
        let (b, o) = (&mut base.recovery, &other.recovery);
        if o.max_retries.is_some() {
            b.max_retries = o.max_retries;
        }
        if o.retry_backoff_ms.is_some() {
            b.retry_backoff_ms = o.retry_backoff_ms;
        }
        if o.convergence_growth.is_some() {
            b.convergence_growth = o.convergence_growth;
        }
        if o.max_recovery_iterations.is_some() {
            b.max_recovery_iterations = o.max_recovery_iterations;
        }
        if o.allow_degraded.is_some() {
            b.allow_degraded = o.allow_degraded;
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `RISKMC_ITERATIONS`, `RISKMC_SEED`, etc.
    fn apply_env_overrides(config: &mut RiskConfig) {
        if let Some(v) = env_parse::<u32>("RISKMC_ITERATIONS") {
            config.simulation.iterations = Some(v);
        }
        if let Some(v) = env_parse::<u64>("RISKMC_SEED") {
            config.simulation.seed = Some(v);
        }
        if let Some(v) = env_parse::<f64>("RISKMC_TIME_BUDGET_SECS") {
            config.simulation.time_budget_secs = Some(v);
        }
        if let Some(v) = env_parse::<f64>("RISKMC_CONVERGENCE_TOLERANCE") {
            config.simulation.convergence_tolerance = Some(v);
        }
        if let Some(v) = env_parse::<usize>("RISKMC_THREADS") {
            config.simulation.threads = Some(v);
        }
        if let Some(v) = env_parse::<usize>("RISKMC_TOP_N_CONTRIBUTIONS") {
            config.analysis.top_n_contributions = Some(v);
        }
        if let Some(v) = env_parse::<f64>("RISKMC_PERTURBATION_FRACTION") {
            config.scenario.perturbation_fraction = Some(v);
        }
        if let Some(v) = env_parse::<u32>("RISKMC_MAX_RETRIES") {
            config.recovery.max_retries = Some(v);
        }
    }

    /// Apply CLI overrides (highest priority).
    fn apply_cli_overrides(config: &mut RiskConfig, cli: &CliOverrides) {
        if let Some(v) = cli.iterations {
            config.simulation.iterations = Some(v);
        }
        if let Some(v) = cli.seed {
            config.simulation.seed = Some(v);
        }
        if let Some(v) = cli.time_budget_secs {
            config.simulation.time_budget_secs = Some(v);
        }
        if let Some(v) = cli.threads {
            config.simulation.threads = Some(v);
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::ValidationFailed {
        field: field.to_string(),
        message: message.to_string(),
    }
}

/// Read and parse an env var; unparseable values are ignored.
fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|val| val.parse::<T>().ok())
}

/// Returns the user-level config directory: `~/.riskmc/`.
fn dirs_path() -> Option<std::path::PathBuf> {
    home_dir().map(|h| h.join(".riskmc"))
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<std::path::PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(std::path::PathBuf::from)
}
