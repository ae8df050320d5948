//! Scenario Generator: isolation, sensitivity and mitigation ROI.

use std::sync::Arc;

use riskmc_core::config::{ScenarioConfig, SimulationConfig};
use riskmc_core::errors::{error_code, ErrorCategory, RiskErrorCode, ScenarioError};
use riskmc_engine::correlation::CorrelationMatrix;
use riskmc_engine::distribution::ProbabilityDistribution;
use riskmc_engine::model::Risk;
use riskmc_engine::scenario::{
    evaluate_mitigation, sensitivity_analysis, sensitivity_analysis_with, MitigationStrategy, Modification,
    Scenario,
};
use riskmc_engine::simulation::{OutcomeType, SimulationRun};

fn base_run() -> SimulationRun {
    let risks = vec![
        Arc::new(Risk::cost("labour", ProbabilityDistribution::normal(10_000.0, 2_000.0).unwrap()).unwrap()),
        Arc::new(
            Risk::cost("materials", ProbabilityDistribution::triangular(5_000.0, 8_000.0, 15_000.0).unwrap())
                .unwrap(),
        ),
        Arc::new(Risk::schedule("permits", ProbabilityDistribution::uniform(2.0, 10.0).unwrap()).unwrap()),
    ];
    let config = SimulationConfig::default().with_iterations(5_000).with_seed(42);
    SimulationRun::configure(risks, Arc::new(CorrelationMatrix::identity(3)), &config).unwrap()
}

#[test]
fn test_derived_scenario_leaves_base_untouched() {
    let base = base_run();
    let before = base.run().unwrap();

    let scenario = Scenario::derive(
        &base,
        "cheaper labour",
        &[Modification::ReplaceDistribution {
            risk_id: "labour".into(),
            distribution: ProbabilityDistribution::normal(8_000.0, 1_000.0).unwrap(),
        }],
    )
    .unwrap();
    let derived = scenario.run().run().unwrap();
    let after = base.run().unwrap();

    assert_eq!(before.cost(), after.cost());
    assert_ne!(before.cost(), derived.cost());
    assert_eq!(
        *base.risks()[0].distribution(),
        ProbabilityDistribution::normal(10_000.0, 2_000.0).unwrap()
    );

    assert!(!Arc::ptr_eq(&base.risks()[0], &scenario.run().risks()[0]));
    assert!(Arc::ptr_eq(&base.risks()[1], &scenario.run().risks()[1]));
    assert!(Arc::ptr_eq(&base.risks()[2], &scenario.run().risks()[2]));
    assert_eq!(scenario.name(), "cheaper labour");
    assert_eq!(scenario.modified().len(), 1);
    assert_eq!(scenario.modified()[0].as_str(), "labour");
}

#[test]
fn test_derive_rejects_bad_modifications() {
    let base = base_run();
    let err = Scenario::derive(
        &base,
        "typo",
        &[Modification::ScaleImpact {
            risk_id: "labor".into(),
            factor: 0.5,
        }],
    )
    .unwrap_err();
    assert!(matches!(err, ScenarioError::UnknownRisk { ref id } if id == "labor"));

    let err = Scenario::derive(
        &base,
        "impossible",
        &[Modification::ScaleProbability {
            risk_id: "permits".into(),
            factor: 2.0,
        }],
    )
    .unwrap_err();
    assert!(matches!(err, ScenarioError::InvalidModification { .. }));
    assert_eq!(err.field().as_deref(), Some("modifications[permits].occurrence_probability"));
}

#[test]
fn test_modifications_parse_from_json() {
    let json = r#"[
        {"kind": "scale_impact", "risk_id": "labour", "factor": 0.8},
        {"kind": "replace_distribution", "risk_id": "permits",
         "distribution": {"family": "uniform", "low": 1.0, "high": 4.0}}
    ]"#;
    let modifications: Vec<Modification> = serde_json::from_str(json).unwrap();
    assert_eq!(modifications[0].risk_id(), "labour");

    let scenario = Scenario::derive(&base_run(), "from json", &modifications).unwrap();
    assert!((scenario.run().risks()[0].impact_multiplier() - 0.8).abs() < 1e-12);
    let schedule = scenario.run().run().unwrap();
    assert!(schedule.schedule().iter().all(|d| (1.0..=4.0).contains(d)));
}

#[test]
fn test_sensitivity_ranks_by_outcome_shift() {
    let base = base_run();
    let report = sensitivity_analysis(&base, 0.10, OutcomeType::Cost).unwrap();

    assert_eq!(report.seed, 42);
    assert!(report.failures.is_empty());
    let ids: Vec<&str> = report.entries.iter().map(|e| e.risk_id.as_str()).collect();
    assert_eq!(ids, vec!["labour", "materials", "permits"]);

    let labour = &report.entries[0];
    assert!((labour.outcome_delta - 1_000.0).abs() < 50.0, "delta {}", labour.outcome_delta);
    assert!(labour.relative_delta > 0.0);
    assert_eq!(report.entries[2].outcome_delta, 0.0);
}

#[test]
fn test_sensitivity_from_config_matches_direct_call() {
    let base = base_run();
    let config = ScenarioConfig {
        perturbation_fraction: Some(0.2),
        parallel: Some(false),
    };
    let serial = sensitivity_analysis_with(&base, &config, OutcomeType::Schedule).unwrap();
    let parallel = sensitivity_analysis(&base, 0.2, OutcomeType::Schedule).unwrap();
    assert_eq!(serial.entries, parallel.entries);
    assert_eq!(serial.entries[0].risk_id.as_str(), "permits");
}

#[test]
fn test_sensitivity_rejects_invalid_fraction() {
    let base = base_run();
    for fraction in [-1.0, -2.5, f64::NAN] {
        let err = sensitivity_analysis(&base, fraction, OutcomeType::Cost).unwrap_err();
        assert!(matches!(err, ScenarioError::InvalidPerturbation { .. }));
    }
}

#[test]
fn test_sensitivity_isolates_failing_perturbation() {
    let risks = vec![
        Arc::new(Risk::cost("crew", ProbabilityDistribution::normal(500.0, 50.0).unwrap()).unwrap()),
        Arc::new(Risk::schedule("extreme", ProbabilityDistribution::normal(1e308, 1.0).unwrap()).unwrap()),
    ];
    let config = SimulationConfig::default().with_iterations(1_000).with_seed(9);
    let base = SimulationRun::configure(risks, Arc::new(CorrelationMatrix::identity(2)), &config).unwrap();

    let report = sensitivity_analysis(&base, 1.0, OutcomeType::Cost).unwrap();
    assert_eq!(report.entries.len(), 1);
    assert_eq!(report.entries[0].risk_id.as_str(), "crew");
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].risk_id.as_str(), "extreme");
    assert_eq!(report.failures[0].error.code, error_code::VALIDATION_ERROR);
}

#[test]
fn test_mitigation_roi_on_shared_seed() {
    let scenario = Scenario::baseline(&base_run());
    let strategy = MitigationStrategy {
        name: "fixed-price labour contract".into(),
        cost_of_mitigation: 1_000.0,
        modifications: vec![Modification::ScaleImpact {
            risk_id: "labour".into(),
            factor: 0.5,
        }],
    };
    let eval = evaluate_mitigation(&scenario, &strategy, OutcomeType::Cost).unwrap();

    assert_eq!(eval.seed, 42);
    assert!((eval.expected_value_delta + 5_000.0).abs() < 150.0, "delta {}", eval.expected_value_delta);
    assert!((eval.roi - eval.expected_value_delta / 1_000.0).abs() < 1e-12);
    assert!(eval.roi < 0.0);
    let comparison = eval.comparison.unwrap();
    assert!(comparison.is_significant(0.05));
    assert!((comparison.mean_difference - eval.expected_value_delta).abs() < 1e-6);
}

#[test]
fn test_mitigation_cost_must_be_positive() {
    let scenario = Scenario::baseline(&base_run());
    let mut strategy = MitigationStrategy {
        name: "free lunch".into(),
        cost_of_mitigation: 0.0,
        modifications: Vec::new(),
    };
    let err = evaluate_mitigation(&scenario, &strategy, OutcomeType::Cost).unwrap_err();
    assert!(matches!(err, ScenarioError::UndefinedRoi));
    assert_eq!(err.error_code(), error_code::UNDEFINED_ROI);
    assert_eq!(err.category(), ErrorCategory::Computation);

    strategy.cost_of_mitigation = -10.0;
    let err = evaluate_mitigation(&scenario, &strategy, OutcomeType::Cost).unwrap_err();
    assert!(matches!(err, ScenarioError::InvalidMitigationCost { value } if value == -10.0));
}
