// Statistical helpers: moments, quantiles and correlation
// Author: Gabriel Demetrios Lafis

use serde::Serialize;

use crate::data::RecordRef;

/// Columns of the correlation heatmap, in display order
pub const CORRELATION_COLUMNS: [&str; 5] = [
    "temperature_celsius",
    "humidity",
    "pressure_mb",
    "wind_kph",
    "uv_index",
];

/// Axis labels matching `CORRELATION_COLUMNS`
pub const CORRELATION_LABELS: [&str; 5] = ["Temperature", "Humidity", "Pressure", "Wind", "UV"];

/// Arithmetic mean, 0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation, 0 for an empty slice
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mean = mean(values);
    let variance = values.iter()
        .map(|&x| (x - mean).powi(2))
        .sum::<f64>() / values.len() as f64;

    variance.sqrt()
}

/// Sample standard deviation (n - 1 denominator); `None` below two values
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }

    let mean = mean(values);
    let variance = values.iter()
        .map(|&x| (x - mean).powi(2))
        .sum::<f64>() / (values.len() - 1) as f64;

    Some(variance.sqrt())
}

/// Linear-interpolation quantile at index `q * (n - 1)`.
///
/// The input does not need to be sorted; a sorted copy is used. Returns 0
/// for an empty slice.
pub fn quantile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    quantile_sorted(&sorted, q)
}

/// Same as `quantile` for input that is already sorted ascending
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }

    let q = q.clamp(0.0, 1.0);
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let weight = pos - lower as f64;

    if upper >= sorted.len() {
        return sorted[sorted.len() - 1];
    }

    sorted[lower] * (1.0 - weight) + sorted[upper] * weight
}

/// Pearson correlation over the pairs where both values are present.
///
/// Returns 0 with fewer than two complete pairs or when either side has
/// no variance.
pub fn pearson(pairs: impl IntoIterator<Item = (Option<f64>, Option<f64>)>) -> f64 {
    let mut n = 0usize;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_x2, mut sum_y2) = (0.0, 0.0, 0.0, 0.0, 0.0);

    for (x, y) in pairs {
        if let (Some(x), Some(y)) = (x, y) {
            n += 1;
            sum_x += x;
            sum_y += y;
            sum_xy += x * y;
            sum_x2 += x * x;
            sum_y2 += y * y;
        }
    }

    if n < 2 {
        return 0.0;
    }

    let n = n as f64;
    let numerator = n * sum_xy - sum_x * sum_y;
    let var_x = n * sum_x2 - sum_x * sum_x;
    let var_y = n * sum_y2 - sum_y * sum_y;

    // Cancellation can leave a tiny residue for a constant column
    if is_negligible(var_x, n * sum_x2) || is_negligible(var_y, n * sum_y2) {
        return 0.0;
    }

    let denominator = (var_x * var_y).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }

    (numerator / denominator).clamp(-1.0, 1.0)
}

fn is_negligible(spread: f64, scale: f64) -> bool {
    spread <= scale.abs() * 1e-12
}

/// Symmetric matrix of Pearson coefficients
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub labels: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Coefficient between two columns by position
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.values.get(i).and_then(|row| row.get(j)).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Pairwise-complete correlation matrix of the heatmap columns
pub fn correlation_matrix(records: &[RecordRef]) -> CorrelationMatrix {
    correlation_matrix_for(records, &CORRELATION_COLUMNS, &CORRELATION_LABELS)
}

/// Pairwise-complete correlation matrix of arbitrary numeric columns
pub fn correlation_matrix_for(records: &[RecordRef], columns: &[&str], labels: &[&str]) -> CorrelationMatrix {
    if records.is_empty() {
        return CorrelationMatrix {
            columns: Vec::new(),
            labels: Vec::new(),
            values: Vec::new(),
        };
    }

    let series: Vec<Vec<Option<f64>>> = columns.iter()
        .map(|column| records.iter().map(|r| r.numeric(column)).collect())
        .collect();

    let size = columns.len();
    let mut values = vec![vec![0.0; size]; size];

    for i in 0..size {
        for j in i..size {
            let r = pearson(series[i].iter().copied().zip(series[j].iter().copied()));
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        columns: columns.iter().map(|c| c.to_string()).collect(),
        labels: columns.iter()
            .enumerate()
            .map(|(i, c)| labels.get(i).unwrap_or(c).to_string())
            .collect(),
        values,
    }
}
