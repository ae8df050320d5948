//! Results Analyzer: pure functions over a result's outcome vectors.

pub mod comparison;
pub mod contributions;
pub mod intervals;
pub mod percentiles;
pub mod summary;

pub use comparison::{compare, welch_t_test, ComparisonReport};
pub use contributions::{risk_contributions, ContributionReport, RiskContribution};
pub use intervals::{confidence_intervals, ConfidenceInterval};
pub use percentiles::{percentiles, PercentileEntry, PercentileTable, SortedSamples};
pub use summary::{
    exceedance_probability, histogram, mean, variance, Histogram, OutcomeSummary, ResultSnapshot,
    StatisticalSummary,
};
