// Aggregation and filtering benchmarks
// Author: Gabriel Demetrios Lafis

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use weather_dashboard_engine::{
    data::{DatasetLoader, RecordRef, SyntheticSource},
    processing::{
        kernel_density_estimate, ChartPipeline, ChartSettings, FilterEngine, FilterState, FilterUpdate, Selection,
    },
};

fn records(rows: usize) -> Vec<RecordRef> {
    DatasetLoader::new()
        .load(&SyntheticSource::new(42, rows))
        .map(|dataset| dataset.records)
        .unwrap_or_default()
}

fn bench_pipeline(c: &mut Criterion) {
    let pipeline = ChartPipeline::standard(&ChartSettings::default());
    let mut group = c.benchmark_group("chart_pipeline");

    for &rows in &[1_000usize, 10_000] {
        let data = records(rows);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &data, |b, data| {
            b.iter(|| black_box(pipeline.run(data)));
        });
    }
    group.finish();
}

fn bench_filter(c: &mut Criterion) {
    let data = records(10_000);
    let state = FilterState::default()
        .merged(
            &FilterUpdate::default()
                .month(Selection::Only(6))
                .temperature_range(0.0, 30.0)
                .show_outliers(false),
        )
        .unwrap_or_default();

    c.bench_function("filter_10000", |b| b.iter(|| black_box(FilterEngine::apply_with(&data, &state))));
}

fn bench_kde(c: &mut Criterion) {
    let data = records(5_000);
    let values: Vec<f64> = data.iter().filter_map(|r| r.temperature_celsius).collect();

    let mut group = c.benchmark_group("kde");
    for &points in &[100usize, 400] {
        group.bench_with_input(BenchmarkId::from_parameter(points), &points, |b, &points| {
            b.iter(|| black_box(kernel_density_estimate(&values, points)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_pipeline, bench_filter, bench_kde);
criterion_main!(benches);
