// Pareto analysis of grouped averages
// Author: Gabriel Demetrios Lafis

use indexmap::IndexMap;
use serde::Serialize;

use crate::data::RecordRef;

pub const DEFAULT_PARETO_TOP: usize = 20;

/// Ranked categories with their share of the retained total
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParetoSeries {
    pub group_by: String,
    pub value_column: String,
    pub categories: Vec<String>,
    pub values: Vec<f64>,
    pub percentages: Vec<f64>,
    pub cumulative: Vec<f64>,
}

impl ParetoSeries {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Categories needed to reach `threshold` percent of the total
    pub fn vital_few(&self, threshold: f64) -> &[String] {
        let count = self.cumulative.iter()
            .position(|c| *c >= threshold)
            .map_or(self.categories.len(), |i| i + 1);
        &self.categories[..count]
    }
}

/// Average `value_column` per `group_by` value and rank the groups.
///
/// Groups are sorted by descending absolute average (ties keep first
/// appearance) and the first `top_n` are kept. Percentages refer to the
/// sum of absolute averages of the kept groups, so the last cumulative
/// value is 100 whenever that sum is positive.
pub fn pareto_analysis(records: &[RecordRef], group_by: &str, value_column: &str, top_n: usize) -> ParetoSeries {
    let mut series = ParetoSeries {
        group_by: group_by.to_string(),
        value_column: value_column.to_string(),
        ..ParetoSeries::default()
    };

    if records.is_empty() || top_n == 0 {
        return series;
    }

    let mut groups: IndexMap<String, (f64, usize)> = IndexMap::new();
    for record in records {
        let entry = groups.entry(record.group_key(group_by)).or_insert((0.0, 0));
        entry.0 += record.numeric(value_column).unwrap_or(0.0);
        entry.1 += 1;
    }

    let mut averaged: Vec<(String, f64)> = groups.into_iter()
        .map(|(key, (sum, count))| (key, sum / count as f64))
        .collect();

    // Stable sort keeps first-appearance order among equal magnitudes
    averaged.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));
    averaged.truncate(top_n);

    let total: f64 = averaged.iter().map(|(_, v)| v.abs()).sum();
    let mut running = 0.0;

    for (category, value) in averaged {
        running += value.abs();

        let (percentage, cumulative) = if total > 0.0 {
            (value.abs() / total * 100.0, running / total * 100.0)
        } else {
            (0.0, 100.0)
        };

        series.categories.push(category);
        series.values.push(value);
        series.percentages.push(percentage);
        series.cumulative.push(cumulative);
    }

    series
}
