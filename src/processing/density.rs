// Gaussian kernel density estimation
// Author: Gabriel Demetrios Lafis

use std::f64::consts::PI;

use serde::Serialize;

use crate::data::RecordRef;
use super::stats::{mean, quantile_sorted, sample_std_dev};
use super::ProcessingError;

/// Default number of grid intervals; the grid has one more point
pub const DEFAULT_GRID_POINTS: usize = 100;

/// Every n-th sorted value is kept for the rug plot
pub const RUG_STRIDE: usize = 50;

/// Density curve evaluated on an even grid
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DensityCurve {
    pub column: String,
    pub bandwidth: f64,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// Input values sorted ascending
    pub values: Vec<f64>,
}

/// Location statistics of the sample behind a curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DensitySummary {
    pub mean: f64,
    pub median: f64,
    pub q1: f64,
    pub q3: f64,
}

impl DensityCurve {
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Mean, median and quartiles of the raw values
    pub fn summary(&self) -> Option<DensitySummary> {
        if self.values.is_empty() {
            return None;
        }

        Some(DensitySummary {
            mean: mean(&self.values),
            median: quantile_sorted(&self.values, 0.5),
            q1: quantile_sorted(&self.values, 0.25),
            q3: quantile_sorted(&self.values, 0.75),
        })
    }

    /// Decimated sample for a rug plot
    pub fn rug_sample(&self) -> Vec<f64> {
        self.values.iter().step_by(RUG_STRIDE).copied().collect()
    }

    /// Trapezoidal integral of the curve over its grid
    pub fn area(&self) -> f64 {
        self.x.windows(2)
            .zip(self.y.windows(2))
            .map(|(x, y)| (x[1] - x[0]) * (y[0] + y[1]) / 2.0)
            .sum()
    }
}

/// Scott's rule bandwidth `1.06 * s * n^(-1/5)` with the sample deviation
pub fn scott_bandwidth(values: &[f64]) -> Option<f64> {
    let std_dev = sample_std_dev(values)?;
    Some(1.06 * std_dev * (values.len() as f64).powf(-0.2))
}

/// Estimate the density of `values` on `grid_points + 1` evenly spaced points.
///
/// Empty input yields an empty curve. A sample whose bandwidth is zero or
/// undefined (a single value, or all values equal) is reported as
/// degenerate.
pub fn kernel_density_estimate(values: &[f64], grid_points: usize) -> Result<DensityCurve, ProcessingError> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return Ok(DensityCurve::default());
    }

    if grid_points == 0 {
        return Err(ProcessingError::InvalidArgument(
            "Density grid needs at least one interval".to_string(),
        ));
    }

    sorted.sort_by(|a, b| a.total_cmp(b));

    let bandwidth = match scott_bandwidth(&sorted) {
        Some(h) if h > 0.0 && h.is_finite() => h,
        _ => {
            return Err(ProcessingError::Degenerate(format!(
                "Cannot estimate density of {} value(s) with no spread",
                sorted.len()
            )))
        },
    };

    let min = sorted[0];
    let max = sorted[sorted.len() - 1];
    let step = (max - min) / grid_points as f64;
    let norm = sorted.len() as f64 * bandwidth * (2.0 * PI).sqrt();

    let mut x = Vec::with_capacity(grid_points + 1);
    let mut y = Vec::with_capacity(grid_points + 1);

    for i in 0..=grid_points {
        let xi = min + i as f64 * step;
        let density: f64 = sorted.iter()
            .map(|v| {
                let u = (xi - v) / bandwidth;
                (-0.5 * u * u).exp()
            })
            .sum();

        x.push(xi);
        y.push(density / norm);
    }

    Ok(DensityCurve {
        column: String::new(),
        bandwidth,
        x,
        y,
        values: sorted,
    })
}

/// Density of one numeric column; records without a number are skipped
pub fn column_density(records: &[RecordRef], column: &str, grid_points: usize) -> Result<DensityCurve, ProcessingError> {
    let values: Vec<f64> = records.iter().filter_map(|r| r.numeric(column)).collect();
    let mut curve = kernel_density_estimate(&values, grid_points)?;
    curve.column = column.to_string();
    Ok(curve)
}
