//! # riskmc-engine
//!
//! Monte Carlo risk simulation built on `riskmc-core`:
//! - Distribution Modeler: validated, sampleable distributions and fitting
//! - Correlation Analyzer: matrix validation, Cholesky, Gaussian copula
//! - Simulation Engine: correlated iterations, convergence, budgets
//! - Results Analyzer: percentiles, intervals, contributions, comparisons
//! - Scenario Generator: derived runs, sensitivity, mitigation ROI
//! - Recovery: failure-category strategies, retries, convergence re-runs

pub mod correlation;
pub mod distribution;
pub mod model;
pub mod recovery;
pub mod results;
pub mod scenario;
pub mod simulation;

pub use correlation::{CholeskyFactor, CorrelationMatrix};
pub use distribution::{DistributionFamily, DistributionSpec, ProbabilityDistribution};
pub use model::{ImpactType, Risk, RiskCategory, RiskRecord};
pub use results::{ComparisonReport, StatisticalSummary};
pub use scenario::{Modification, Scenario};
pub use simulation::{OutcomeType, RunState, SimulationResult, SimulationRun};
