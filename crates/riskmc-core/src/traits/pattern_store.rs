//! HistoricalPatternStore trait: the calibration data seam.
//!
//! The engine never owns historical data. Callers pass a store into a
//! calibration context; the default in-memory implementation backs tests
//! and standalone use.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::errors::PatternStoreError;

/// Outcome metric recorded for past projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeMetric {
    /// Cost variance, in percent of baseline.
    CostVariance,
    /// Schedule variance, in percent of baseline.
    ScheduleVariance,
}

impl OutcomeMetric {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CostVariance => "cost_variance",
            Self::ScheduleVariance => "schedule_variance",
        }
    }
}

/// Read/write store of past-project outcomes keyed by project archetype.
pub trait HistoricalPatternStore: Send + Sync {
    /// Store name used in logs and degradation events.
    fn name(&self) -> &str;

    /// Past outcomes for an archetype and metric.
    fn outcomes(
        &self,
        archetype: &str,
        metric: OutcomeMetric,
    ) -> Result<Vec<f64>, PatternStoreError>;

    /// Append a completed project's outcome.
    fn record(
        &self,
        archetype: &str,
        metric: OutcomeMetric,
        value: f64,
    ) -> Result<(), PatternStoreError>;
}

/// Process-local store backed by a `RwLock<HashMap>`.
#[derive(Debug, Default)]
pub struct InMemoryPatternStore {
    outcomes: RwLock<HashMap<(String, OutcomeMetric), Vec<f64>>>,
}

impl InMemoryPatternStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with a batch of outcomes.
    pub fn with_outcomes(
        self,
        archetype: impl Into<String>,
        metric: OutcomeMetric,
        values: impl IntoIterator<Item = f64>,
    ) -> Self {
        if let Ok(mut map) = self.outcomes.write() {
            map.entry((archetype.into(), metric))
                .or_default()
                .extend(values);
        }
        self
    }

    fn poisoned(&self) -> PatternStoreError {
        PatternStoreError::Unavailable {
            store: self.name().to_string(),
            reason: "lock poisoned".to_string(),
        }
    }
}

impl HistoricalPatternStore for InMemoryPatternStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    fn outcomes(
        &self,
        archetype: &str,
        metric: OutcomeMetric,
    ) -> Result<Vec<f64>, PatternStoreError> {
        let map = self.outcomes.read().map_err(|_| self.poisoned())?;
        map.get(&(archetype.to_string(), metric))
            .cloned()
            .ok_or_else(|| PatternStoreError::NotFound {
                archetype: archetype.to_string(),
            })
    }

    fn record(
        &self,
        archetype: &str,
        metric: OutcomeMetric,
        value: f64,
    ) -> Result<(), PatternStoreError> {
        let mut map = self.outcomes.write().map_err(|_| self.poisoned())?;
        map.entry((archetype.to_string(), metric))
            .or_default()
            .push(value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_then_read() {
        let store = InMemoryPatternStore::new();
        store.record("bridge", OutcomeMetric::CostVariance, 12.5).unwrap();
        store.record("bridge", OutcomeMetric::CostVariance, 8.0).unwrap();
        let values = store.outcomes("bridge", OutcomeMetric::CostVariance).unwrap();
        assert_eq!(values, vec![12.5, 8.0]);
    }

    #[test]
    fn test_metrics_are_kept_apart() {
        let store = InMemoryPatternStore::new()
            .with_outcomes("office", OutcomeMetric::CostVariance, [1.0, 2.0]);
        let err = store
            .outcomes("office", OutcomeMetric::ScheduleVariance)
            .unwrap_err();
        assert!(matches!(err, PatternStoreError::NotFound { .. }));
    }
}
