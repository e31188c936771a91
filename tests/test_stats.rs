// Statistics, density and Pareto tests
// Author: Gabriel Demetrios Lafis

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use weather_dashboard_engine::{
    data::{DatasetLoader, RecordRef, SyntheticSource, WeatherRecord},
    processing::{
        column_density, correlation_matrix, kernel_density_estimate, mean, pareto_analysis, pearson,
        population_std_dev, quantile, sample_std_dev, scott_bandwidth, ProcessingError,
        CORRELATION_LABELS,
    },
};

fn record(country: &str, temperature: f64) -> RecordRef {
    Arc::new(WeatherRecord {
        country: Some(country.to_string()),
        temperature_celsius: Some(temperature),
        ..WeatherRecord::default()
    })
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_quantile_endpoints_and_median() {
    let values = vec![7.0, 1.0, 5.0, 3.0];

    assert_eq!(quantile(&values, 0.0), 1.0);
    assert_eq!(quantile(&values, 1.0), 7.0);
    assert!(approx(quantile(&values, 0.5), 4.0));
    assert!(approx(quantile(&values, 0.25), 2.5));
    assert_eq!(quantile(&[], 0.5), 0.0);
    assert_eq!(quantile(&[3.0], 0.75), 3.0);
}

#[test]
fn test_mean_and_deviations() {
    let values = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];

    assert!(approx(mean(&values), 5.0));
    assert!(approx(population_std_dev(&values), 2.0));
    assert!(approx(sample_std_dev(&values).unwrap(), (32.0f64 / 7.0).sqrt()));
    assert_eq!(sample_std_dev(&[1.0]), None);
    assert_eq!(mean(&[]), 0.0);
}

#[test]
fn test_pearson_perfect_and_degenerate() {
    let up: Vec<(Option<f64>, Option<f64>)> = (0..10).map(|i| (Some(i as f64), Some(2.0 * i as f64 + 1.0))).collect();
    let down: Vec<(Option<f64>, Option<f64>)> = (0..10).map(|i| (Some(i as f64), Some(-(i as f64)))).collect();
    let constant: Vec<(Option<f64>, Option<f64>)> = (0..10).map(|i| (Some(i as f64), Some(4.2))).collect();

    assert!(approx(pearson(up), 1.0));
    assert!(approx(pearson(down), -1.0));
    assert_eq!(pearson(constant), 0.0);
    assert_eq!(pearson(vec![(Some(1.0), Some(2.0))]), 0.0);
}

#[test]
fn test_pearson_skips_incomplete_pairs() {
    let pairs = vec![
        (Some(1.0), Some(1.0)),
        (None, Some(100.0)),
        (Some(2.0), Some(2.0)),
        (Some(50.0), None),
        (Some(3.0), Some(3.0)),
    ];

    assert!(approx(pearson(pairs), 1.0));
}

#[test]
fn test_correlation_matrix_symmetric_with_unit_diagonal() {
    let dataset = DatasetLoader::new().load(&SyntheticSource::new(5, 300)).unwrap();
    let matrix = correlation_matrix(&dataset.records);

    assert_eq!(matrix.labels, CORRELATION_LABELS.iter().map(|l| l.to_string()).collect::<Vec<_>>());
    assert_eq!(matrix.values.len(), 5);

    for i in 0..5 {
        assert!((matrix.get(i, i).unwrap() - 1.0).abs() < 1e-9);
        for j in 0..5 {
            let r = matrix.get(i, j).unwrap();
            assert!((-1.0..=1.0).contains(&r));
            assert_eq!(r, matrix.get(j, i).unwrap());
        }
    }

    assert!(correlation_matrix(&[]).is_empty());
}

#[test]
fn test_pareto_two_groups() {
    let records = vec![record("A", 10.0), record("A", 20.0), record("B", 0.0)];
    let series = pareto_analysis(&records, "country", "temperature_celsius", 20);

    assert_eq!(series.categories, vec!["A".to_string(), "B".to_string()]);
    assert_eq!(series.values, vec![15.0, 0.0]);
    assert_eq!(series.percentages, vec![100.0, 0.0]);
    assert_eq!(series.cumulative, vec![100.0, 100.0]);
}

#[test]
fn test_pareto_ranks_by_magnitude_and_truncates() {
    let records = vec![
        record("Cold", -30.0),
        record("Mild", 10.0),
        record("Hot", 20.0),
        record("Cool", 5.0),
    ];
    let series = pareto_analysis(&records, "country", "temperature_celsius", 3);

    assert_eq!(series.categories, vec!["Cold", "Hot", "Mild"]);
    assert_eq!(series.values, vec![-30.0, 20.0, 10.0]);
    assert!(approx(*series.cumulative.last().unwrap(), 100.0));
    assert!(series.cumulative.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(series.vital_few(80.0), &["Cold".to_string(), "Hot".to_string()][..]);
}

#[test]
fn test_pareto_edge_cases() {
    assert!(pareto_analysis(&[], "country", "temperature_celsius", 20).is_empty());

    let zeros = vec![record("A", 0.0), record("B", 0.0)];
    let series = pareto_analysis(&zeros, "country", "temperature_celsius", 20);
    assert_eq!(series.percentages, vec![0.0, 0.0]);
    assert_eq!(series.cumulative, vec![100.0, 100.0]);
}

#[test]
fn test_scott_bandwidth() {
    let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
    let expected = 1.06 * sample_std_dev(&values).unwrap() * 5f64.powf(-0.2);

    assert!(approx(scott_bandwidth(&values).unwrap(), expected));
    assert_eq!(scott_bandwidth(&[2.0]), None);
}

#[test]
fn test_kde_integrates_to_about_one() {
    let mut rng = StdRng::seed_from_u64(17);
    let values: Vec<f64> = (0..2000).map(|_| rng.gen_range(-5.0..35.0)).collect();

    let curve = kernel_density_estimate(&values, 400).unwrap();

    assert_eq!(curve.x.len(), 401);
    assert_eq!(curve.y.len(), 401);
    assert!(curve.y.iter().all(|y| *y >= 0.0));
    assert!(curve.x.windows(2).all(|w| w[0] < w[1]));

    // The grid stops at the sample extremes, so the tails are cut off
    let area = curve.area();
    assert!(area > 0.85 && area <= 1.0 + 1e-6, "area was {}", area);
}

#[test]
fn test_kde_empty_and_degenerate_inputs() {
    assert!(kernel_density_estimate(&[], 100).unwrap().is_empty());

    assert!(matches!(
        kernel_density_estimate(&[21.5], 100),
        Err(ProcessingError::Degenerate(_))
    ));
    assert!(matches!(
        kernel_density_estimate(&[3.0, 3.0, 3.0], 100),
        Err(ProcessingError::Degenerate(_))
    ));
    assert!(matches!(
        kernel_density_estimate(&[1.0, 2.0], 0),
        Err(ProcessingError::InvalidArgument(_))
    ));
}

#[test]
fn test_density_summary_and_rug() {
    let dataset = DatasetLoader::new().load(&SyntheticSource::new(21, 500)).unwrap();
    let curve = column_density(&dataset.records, "temperature_celsius", 100).unwrap();

    assert_eq!(curve.column, "temperature_celsius");
    assert_eq!(curve.values.len(), 500);

    let summary = curve.summary().unwrap();
    assert!(summary.q1 <= summary.median && summary.median <= summary.q3);
    assert_eq!(curve.rug_sample().len(), 10);
}
