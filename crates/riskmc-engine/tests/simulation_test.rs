//! Simulation Engine: configuration, determinism, budgets and correlation.

use std::sync::Arc;

use riskmc_core::config::SimulationConfig;
use riskmc_core::errors::{ComputationError, ConfigError, ErrorCategory, RiskErrorCode, SimulationError};
use riskmc_core::traits::{Cancellable, CancellationToken};
use riskmc_engine::correlation::CorrelationMatrix;
use riskmc_engine::distribution::ProbabilityDistribution;
use riskmc_engine::model::{ImpactType, Risk, RiskCategory};
use riskmc_engine::results::{mean, variance, SortedSamples};
use riskmc_engine::simulation::{OutcomeType, RunState, SimulationRun};

fn settings(iterations: u32, seed: Option<u64>) -> SimulationConfig {
    SimulationConfig {
        iterations: Some(iterations),
        seed,
        ..Default::default()
    }
}

fn example_risks() -> Vec<Arc<Risk>> {
    vec![
        Arc::new(Risk::cost("labour", ProbabilityDistribution::normal(10_000.0, 2_000.0).unwrap()).unwrap()),
        Arc::new(
            Risk::cost("materials", ProbabilityDistribution::triangular(5_000.0, 8_000.0, 15_000.0).unwrap())
                .unwrap(),
        ),
        Arc::new(Risk::schedule("permits", ProbabilityDistribution::uniform(2.0, 10.0).unwrap()).unwrap()),
    ]
}

fn configure(risks: Vec<Arc<Risk>>, config: &SimulationConfig) -> SimulationRun {
    let matrix = Arc::new(CorrelationMatrix::identity(risks.len()));
    SimulationRun::configure(risks, matrix, config).unwrap()
}

fn standard_pair(rho: f64, iterations: u32) -> SimulationRun {
    let dist = ProbabilityDistribution::normal(0.0, 1.0).unwrap();
    let risks = vec![
        Arc::new(Risk::cost("a", dist).unwrap()),
        Arc::new(Risk::cost("b", dist).unwrap()),
    ];
    let matrix = Arc::new(CorrelationMatrix::new(vec![vec![1.0, rho], vec![rho, 1.0]]).unwrap());
    SimulationRun::configure(risks, matrix, &settings(iterations, Some(11))).unwrap()
}

#[test]
fn test_uncorrelated_example_matches_component_means() {
    let run = configure(example_risks(), &settings(10_000, Some(42)));
    let result = run.run().unwrap();

    assert_eq!(result.iterations(), 10_000);
    assert_eq!(result.iterations_requested(), 10_000);
    assert_eq!(result.seed(), 42);
    assert!(result.seeded());
    assert!(!result.truncated());

    let expected = 10_000.0 + (5_000.0 + 8_000.0 + 15_000.0) / 3.0;
    let cost_mean = mean(result.cost()).unwrap();
    assert!((cost_mean - expected).abs() / expected < 0.02, "cost mean {cost_mean}");

    let p50 = SortedSamples::new(result.cost()).unwrap().percentile(50.0).unwrap();
    assert!((p50 - cost_mean).abs() / cost_mean < 0.03, "p50 {p50} vs mean {cost_mean}");

    let schedule_mean = mean(result.schedule()).unwrap();
    assert!((schedule_mean - 6.0).abs() < 0.1, "schedule mean {schedule_mean}");
    assert!(result.schedule().iter().all(|d| (2.0..=10.0).contains(d)));

    assert!(result.is_converged());
    assert_eq!(result.state(), RunState::Converged);
    assert_eq!(run.state(), RunState::Converged);
    let ids: Vec<&str> = result.risk_ids().iter().map(|id| id.as_str()).collect();
    assert_eq!(ids, vec!["labour", "materials", "permits"]);
}

#[test]
fn test_same_seed_is_bit_identical() {
    let run = configure(example_risks(), &settings(3_000, Some(7)));
    let first = run.run().unwrap();
    let second = run.run().unwrap();
    assert_eq!(first.cost(), second.cost());
    assert_eq!(first.schedule(), second.schedule());

    let other = run.run_with_seed(8).unwrap();
    assert_ne!(first.cost(), other.cost());
}

#[test]
fn test_thread_count_does_not_change_output() {
    let serial = SimulationConfig {
        threads: Some(1),
        chunk_size: Some(250),
        ..settings(2_000, Some(99))
    };
    let parallel = SimulationConfig {
        threads: Some(4),
        ..serial.clone()
    };
    let a = configure(example_risks(), &serial).run().unwrap();
    let b = configure(example_risks(), &parallel).run().unwrap();
    assert_eq!(a.cost(), b.cost());
    assert_eq!(a.schedule(), b.schedule());
}

#[test]
fn test_seedless_run_reports_replayable_seed() {
    let run = configure(example_risks(), &settings(1_000, None));
    let result = run.run().unwrap();
    assert!(!result.seeded());

    let replay = run.run_with_seed(result.seed()).unwrap();
    assert!(replay.seeded());
    assert_eq!(result.cost(), replay.cost());
}

#[test]
fn test_iterations_below_floor_fail_before_sampling() {
    let matrix = Arc::new(CorrelationMatrix::identity(3));
    let err = SimulationRun::configure(example_risks(), matrix, &settings(500, Some(1))).unwrap_err();
    assert!(matches!(
        err,
        SimulationError::Config(ConfigError::IterationsBelowFloor {
            requested: 500,
            floor: 1_000
        })
    ));
    assert_eq!(err.category(), ErrorCategory::Configuration);
}

#[test]
fn test_configure_rejects_inconsistent_inputs() {
    let config = settings(1_000, Some(1));

    let err = SimulationRun::configure(example_risks(), Arc::new(CorrelationMatrix::identity(2)), &config)
        .unwrap_err();
    assert!(matches!(
        err,
        SimulationError::Config(ConfigError::MatrixSizeMismatch { matrix: 2, risks: 3 })
    ));

    let dist = ProbabilityDistribution::uniform(0.0, 1.0).unwrap();
    let dupes = vec![
        Arc::new(Risk::cost("same", dist).unwrap()),
        Arc::new(Risk::schedule("same", dist).unwrap()),
    ];
    let err = SimulationRun::configure(dupes, Arc::new(CorrelationMatrix::identity(2)), &config).unwrap_err();
    assert!(matches!(err, SimulationError::Config(ConfigError::DuplicateRiskId { .. })));

    let err = SimulationRun::configure(Vec::new(), Arc::new(CorrelationMatrix::identity(0)), &config)
        .unwrap_err();
    assert!(matches!(err, SimulationError::Config(ConfigError::EmptyRiskSet)));

    let zero_threads = SimulationConfig {
        threads: Some(0),
        ..config
    };
    let err = SimulationRun::configure(example_risks(), Arc::new(CorrelationMatrix::identity(3)), &zero_threads)
        .unwrap_err();
    assert!(matches!(err, SimulationError::Config(ConfigError::InvalidValue { .. })));
}

#[test]
fn test_budget_exhausted_before_floor_is_timeout() {
    let config = SimulationConfig {
        time_budget_secs: Some(1e-9),
        ..settings(200_000, Some(3))
    };
    let run = configure(example_risks(), &config);
    let err = run.run().unwrap_err();
    match err {
        SimulationError::TimedOut { completed, required, .. } => {
            assert!(completed < required);
            assert_eq!(required, 1_000);
        }
        other => panic!("expected timeout, got {other:?}"),
    }
    assert_eq!(run.state(), RunState::TimedOut);
}

#[test]
fn test_cancelled_token_stops_run() {
    let run = configure(example_risks(), &settings(50_000, Some(3)));
    let token = CancellationToken::new();
    token.cancel();
    let err = run.run_with_cancel(&token).unwrap_err();
    assert!(matches!(err, SimulationError::Cancelled));
    assert_eq!(err.category(), ErrorCategory::Cancelled);
    assert_eq!(run.state(), RunState::Failed);

    // The run stays usable.
    assert!(run.run_with_cancel(&CancellationToken::new()).is_ok());
}

#[test]
fn test_occurrence_probability_thins_impacts() {
    let risk = Risk::cost("rare", ProbabilityDistribution::normal(100.0, 1.0).unwrap())
        .unwrap()
        .with_occurrence_probability(0.3)
        .unwrap();
    let result = configure(vec![Arc::new(risk)], &settings(20_000, Some(5))).run().unwrap();
    let hits = result.cost().iter().filter(|&&c| c != 0.0).count() as f64 / 20_000.0;
    assert!((hits - 0.3).abs() < 0.02, "hit rate {hits}");
    assert!((mean(result.cost()).unwrap() - 30.0).abs() < 2.0);
}

#[test]
fn test_combined_and_relative_impacts() {
    let combined = Risk::new(
        "strike",
        RiskCategory::Combined,
        ImpactType::Absolute,
        ProbabilityDistribution::uniform(1.0, 3.0).unwrap(),
        0.0,
    )
    .unwrap();
    let result = configure(vec![Arc::new(combined)], &settings(1_000, Some(5))).run().unwrap();
    assert_eq!(result.cost(), result.schedule());

    let relative = Risk::new(
        "overrun",
        RiskCategory::Cost,
        ImpactType::Relative,
        ProbabilityDistribution::normal(0.1, 0.01).unwrap(),
        50_000.0,
    )
    .unwrap();
    let result = configure(vec![Arc::new(relative)], &settings(5_000, Some(5))).run().unwrap();
    assert!((mean(result.cost()).unwrap() - 5_000.0).abs() < 50.0);
    assert!(result.outcome(OutcomeType::Schedule).iter().all(|&d| d == 0.0));
}

#[test]
fn test_overflowing_total_fails_run() {
    let huge = ProbabilityDistribution::normal(1e308, 1e300).unwrap();
    let risks = vec![
        Arc::new(Risk::cost("x", huge).unwrap()),
        Arc::new(Risk::cost("y", huge).unwrap()),
    ];
    let run = configure(risks, &settings(1_000, Some(1)));
    let err = run.run().unwrap_err();
    assert!(matches!(
        err,
        SimulationError::Computation(ComputationError::NonFiniteTotal { outcome: "cost", .. })
    ));
    assert_eq!(run.state(), RunState::Failed);
}

#[test]
fn test_correlation_raises_total_variance() {
    let independent = standard_pair(0.0, 20_000).run().unwrap();
    let correlated = standard_pair(0.8, 20_000).run().unwrap();
    let perfect = standard_pair(1.0, 20_000).run().unwrap();

    let v0 = variance(independent.cost()).unwrap();
    let v8 = variance(correlated.cost()).unwrap();
    let v1 = variance(perfect.cost()).unwrap();
    assert!((v0 - 2.0).abs() < 0.15, "independent variance {v0}");
    assert!((v8 - 3.6).abs() < 0.2, "correlated variance {v8}");
    assert!((v1 - 4.0).abs() < 0.25, "perfectly correlated variance {v1}");
}

#[test]
fn test_tight_tolerance_is_qualified_not_failed() {
    let config = SimulationConfig {
        convergence_tolerance: Some(1e-12),
        ..settings(2_000, Some(17))
    };
    let run = configure(example_risks(), &config);
    let result = run.run().unwrap();
    assert_eq!(result.state(), RunState::Completed);
    assert!(!result.is_converged());
    assert_eq!(result.iterations(), 2_000);

    let err = result.require_converged().unwrap_err();
    assert_eq!(err.iterations, 2_000);
    assert_eq!(err.tolerance, 1e-12);
    assert_eq!(err.category(), ErrorCategory::Convergence);

    let checkpoints = &result.convergence().outcome(OutcomeType::Cost).checkpoints;
    assert_eq!(checkpoints.len(), 4);
    assert_eq!(checkpoints[0].iteration, 500);
}
