//! Correlation Analyzer: validation, decomposition, copula transform.

use std::sync::Arc;

use riskmc_core::errors::{CorrelationError, ErrorCategory, RiskErrorCode};
use riskmc_engine::correlation::{
    correlate, decompose, standard_normal_cdf, validate, CorrelationMatrix,
};
use riskmc_engine::distribution::ProbabilityDistribution;
use riskmc_engine::model::Risk;

#[test]
fn test_out_of_range_entry_reports_pair() {
    let rows = vec![
        vec![1.0, 1.5, 0.0],
        vec![1.5, 1.0, 0.0],
        vec![0.0, 0.0, 1.0],
    ];
    let err = validate(&rows).unwrap_err();
    assert_eq!(err.pair(), Some((0, 1)));
    assert_eq!(err.category(), ErrorCategory::Validation);
    assert_eq!(err.field().as_deref(), Some("correlation_matrix[0][1]"));
}

#[test]
fn test_shape_and_diagonal_rules() {
    assert!(matches!(validate(&[]), Err(CorrelationError::Empty)));
    assert!(matches!(
        validate(&[vec![1.0, 0.0], vec![0.0]]),
        Err(CorrelationError::NotSquare { row: 1, .. })
    ));
    assert!(matches!(
        validate(&[vec![1.0, 0.2], vec![0.2, 0.9]]),
        Err(CorrelationError::DiagonalNotOne { index: 1, .. })
    ));
    assert!(matches!(
        validate(&[vec![1.0, f64::NAN], vec![f64::NAN, 1.0]]),
        Err(CorrelationError::NonFinite { row: 0, col: 1 })
    ));
}

#[test]
fn test_symmetry_tolerance() {
    let nearly = vec![vec![1.0, 0.3], vec![0.3 + 1e-12, 1.0]];
    assert!(validate(&nearly).is_ok());
    let skewed = vec![vec![1.0, 0.3], vec![0.31, 1.0]];
    assert!(matches!(
        validate(&skewed),
        Err(CorrelationError::Asymmetric { row: 0, col: 1, .. })
    ));
}

#[test]
fn test_indefinite_matrix_is_computation_failure() {
    let rows = vec![
        vec![1.0, 0.95, 0.0],
        vec![0.95, 1.0, 0.95],
        vec![0.0, 0.95, 1.0],
    ];
    let err = CorrelationMatrix::new(rows).unwrap_err();
    assert!(matches!(err, CorrelationError::NotPositiveSemiDefinite { .. }));
    assert_eq!(err.category(), ErrorCategory::Computation);
}

#[test]
fn test_cholesky_round_trip() {
    let m = CorrelationMatrix::new(vec![
        vec![1.0, 0.6, 0.3, 0.1],
        vec![0.6, 1.0, 0.5, 0.2],
        vec![0.3, 0.5, 1.0, 0.4],
        vec![0.1, 0.2, 0.4, 1.0],
    ])
    .unwrap();
    let factor = decompose(&m).unwrap();
    let rebuilt = factor.reconstruct();
    for i in 0..4 {
        for j in 0..4 {
            assert!((rebuilt[i][j] - m.get(i, j).unwrap()).abs() < 1e-12);
            if j > i {
                assert_eq!(factor.get(i, j), 0.0);
            }
        }
    }
}

#[test]
fn test_correlate_is_lower_triangular_product() {
    let m = CorrelationMatrix::new(vec![vec![1.0, 0.8], vec![0.8, 1.0]]).unwrap();
    let factor = decompose(&m).unwrap();
    let out = correlate(&[1.0, 2.0], &factor).unwrap();
    assert!((out[0] - 1.0).abs() < 1e-12);
    assert!((out[1] - (0.8 + 0.6 * 2.0)).abs() < 1e-12);
}

#[test]
fn test_standard_normal_cdf() {
    assert!((standard_normal_cdf(0.0) - 0.5).abs() < 1e-15);
    assert!((standard_normal_cdf(1.959_963_984_540_054) - 0.975).abs() < 1e-12);
    assert!(standard_normal_cdf(-40.0) >= 0.0);
    assert!(standard_normal_cdf(40.0) <= 1.0);
}

#[test]
fn test_matrix_from_correlation_groups() {
    let dist = ProbabilityDistribution::normal(1.0, 0.1).unwrap();
    let risks: Vec<Arc<Risk>> = vec![
        Arc::new(Risk::cost("steel", dist).unwrap().with_correlation_group("materials")),
        Arc::new(Risk::cost("concrete", dist).unwrap().with_correlation_group("materials")),
        Arc::new(Risk::schedule("weather", dist).unwrap()),
    ];
    let m = CorrelationMatrix::from_groups(&risks, 0.7).unwrap();
    assert_eq!(m.to_rows(), vec![
        vec![1.0, 0.7, 0.0],
        vec![0.7, 1.0, 0.0],
        vec![0.0, 0.0, 1.0],
    ]);
    assert!(matches!(
        CorrelationMatrix::from_groups(&risks, 1.2),
        Err(CorrelationError::InvalidGroupCoefficient { .. })
    ));
}

#[test]
fn test_matrix_json_is_validated() {
    let ok: CorrelationMatrix = serde_json::from_str("[[1.0, 0.2], [0.2, 1.0]]").unwrap();
    assert_eq!(ok.dim(), 2);
    assert!(serde_json::from_str::<CorrelationMatrix>("[[1.0, 2.0], [2.0, 1.0]]").is_err());
}
