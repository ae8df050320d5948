//! Risk register data model.

pub mod risk;

pub use risk::{Escalation, ImpactType, Risk, RiskCategory, RiskRecord};
