use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};

use riskmc_core::config::{AnalysisConfig, SimulationConfig};
use riskmc_engine::correlation::{decompose, CorrelationMatrix};
use riskmc_engine::distribution::ProbabilityDistribution;
use riskmc_engine::model::Risk;
use riskmc_engine::results::{percentiles, risk_contributions};
use riskmc_engine::simulation::{OutcomeType, SimulationRun};

/// 100 risks cycling through the families, in groups of ten sharing a
/// correlation of 0.3.
fn register(n: usize) -> Vec<Arc<Risk>> {
    (0..n)
        .map(|i| {
            let dist = match i % 4 {
                0 => ProbabilityDistribution::normal(1_000.0, 150.0),
                1 => ProbabilityDistribution::triangular(500.0, 800.0, 1_600.0),
                2 => ProbabilityDistribution::lognormal(6.5, 0.4),
                _ => ProbabilityDistribution::uniform(200.0, 900.0),
            }
            .unwrap();
            let risk = if i % 5 == 0 {
                Risk::schedule(format!("r{i}"), dist)
            } else {
                Risk::cost(format!("r{i}"), dist)
            };
            Arc::new(risk.unwrap().with_correlation_group(format!("g{}", i / 10)))
        })
        .collect()
}

fn configured_run(n: usize, iterations: u32) -> SimulationRun {
    let risks = register(n);
    let matrix = Arc::new(CorrelationMatrix::from_groups(&risks, 0.3).unwrap());
    let config = SimulationConfig::default().with_iterations(iterations).with_seed(7);
    SimulationRun::configure(risks, matrix, &config).unwrap()
}

fn bench_run_100_risks(c: &mut Criterion) {
    let run = configured_run(100, 10_000);
    c.bench_function("run_100_risks_10k_iterations", |b| {
        b.iter(|| run.run().unwrap());
    });
}

fn bench_decompose(c: &mut Criterion) {
    let risks = register(200);
    let matrix = CorrelationMatrix::from_groups(&risks, 0.3).unwrap();
    c.bench_function("cholesky_200x200", |b| {
        b.iter(|| decompose(&matrix).unwrap());
    });
}

fn bench_percentiles(c: &mut Criterion) {
    let result = configured_run(20, 100_000).run().unwrap();
    let levels = AnalysisConfig::default().effective_percentile_levels();
    c.bench_function("percentiles_100k", |b| {
        b.iter(|| percentiles(result.cost(), &levels).unwrap());
    });
}

fn bench_contributions(c: &mut Criterion) {
    let run = configured_run(20, 5_000);
    let baseline = run.run().unwrap();
    let config = AnalysisConfig::default();
    c.bench_function("contributions_20_risks", |b| {
        b.iter(|| risk_contributions(&run, &baseline, OutcomeType::Cost, &config).unwrap());
    });
}

criterion_group!(
    benches,
    bench_run_100_risks,
    bench_decompose,
    bench_percentiles,
    bench_contributions
);
criterion_main!(benches);
