// Column allow-lists, validation and column statistics
// Author: Gabriel Demetrios Lafis

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use log::info;
use serde::{Deserialize, Serialize};

use super::{DataError, RawRow, RecordRef, Value};

/// Numeric columns recognized in a weather dataset
pub const NUMERIC_COLUMNS: &[&str] = &[
    "latitude",
    "longitude",
    "temperature_celsius",
    "temperature_fahrenheit",
    "wind_mph",
    "wind_kph",
    "wind_degree",
    "pressure_mb",
    "pressure_in",
    "precip_mm",
    "precip_in",
    "humidity",
    "cloud",
    "feels_like_celsius",
    "feels_like_fahrenheit",
    "visibility_km",
    "visibility_miles",
    "uv_index",
    "gust_mph",
    "gust_kph",
    "air_quality_Carbon_Monoxide",
    "air_quality_Ozone",
    "air_quality_Nitrogen_dioxide",
    "air_quality_PM2.5",
    "air_quality_PM10",
    "moon_illumination",
    "year",
    "month",
    "day",
    "hour",
    "quarter",
];

/// Categorical columns recognized in a weather dataset
pub const CATEGORICAL_COLUMNS: &[&str] = &[
    "country",
    "location_name",
    "timezone",
    "condition_text",
    "wind_direction",
    "moon_phase",
    "temp_category",
    "humidity_category",
    "wind_category",
];

pub const MIN_NUMERIC_COLUMNS: usize = 5;
pub const MIN_CATEGORICAL_COLUMNS: usize = 2;

/// Maximum number of distinct values kept for a categorical column
const UNIQUE_VALUES_SAMPLE: usize = 50;

/// Column type as seen by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Numeric,
    Categorical,
}

/// Recognized columns found in a dataset, split by type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnTypes {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
}

impl ColumnTypes {
    pub fn is_numeric(&self, column: &str) -> bool {
        self.numeric.iter().any(|c| c == column)
    }
}

/// Per-column summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStatistics {
    pub column_type: ColumnType,
    pub count: usize,
    pub null_count: usize,
    pub unique_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unique_values: Vec<String>,
}

impl ColumnStatistics {
    /// Compute statistics for one column over all records
    pub fn compute(records: &[RecordRef], column: &str, column_type: ColumnType) -> Self {
        let values: Vec<Value> = records.iter()
            .map(|r| r.get(column))
            .filter(|v| !v.is_null())
            .collect();

        let mut seen = HashSet::new();
        let mut unique_values = Vec::new();
        for value in &values {
            let key = match value {
                Value::Number(n) => format!("n:{}", n.to_bits()),
                other => format!("s:{}", other),
            };
            if seen.insert(key) && unique_values.len() < UNIQUE_VALUES_SAMPLE {
                unique_values.push(value.to_string());
            }
        }

        let mut stats = ColumnStatistics {
            column_type,
            count: values.len(),
            null_count: records.len() - values.len(),
            unique_count: seen.len(),
            min: None,
            max: None,
            mean: None,
            unique_values: Vec::new(),
        };

        match column_type {
            ColumnType::Numeric => {
                let numbers: Vec<f64> = values.iter().filter_map(Value::as_f64).collect();
                if !numbers.is_empty() {
                    stats.min = Some(numbers.iter().cloned().fold(f64::INFINITY, f64::min));
                    stats.max = Some(numbers.iter().cloned().fold(f64::NEG_INFINITY, f64::max));
                    stats.mean = Some(numbers.iter().sum::<f64>() / numbers.len() as f64);
                }
            },
            ColumnType::Categorical => {
                stats.unique_values = unique_values;
            },
        }

        stats
    }
}

/// Inclusive temperature range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureRange {
    pub min: f64,
    pub max: f64,
}

/// Headline facts about a dataset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecialInfo {
    pub countries: usize,
    pub temperature_range: Option<TemperatureRange>,
    pub conditions: usize,
}

/// Metadata describing a loaded dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    pub source: String,
    pub description: String,
    pub total_rows: usize,
    pub total_columns: usize,
    pub numeric_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
    pub column_stats: IndexMap<String, ColumnStatistics>,
    pub loaded_at: DateTime<Utc>,
    pub special_info: SpecialInfo,
}

impl DatasetMetadata {
    /// Build metadata for the given columns of a record set
    pub fn generate(
        source: &str,
        records: &[RecordRef],
        columns: &[String],
        column_types: &ColumnTypes,
    ) -> Self {
        let mut column_stats = IndexMap::new();

        for column in columns {
            let column_type = if column_types.is_numeric(column) {
                ColumnType::Numeric
            } else {
                ColumnType::Categorical
            };
            column_stats.insert(
                column.clone(),
                ColumnStatistics::compute(records, column, column_type),
            );
        }

        let special_info = SpecialInfo {
            countries: column_stats.get("country").map_or(0, |s| s.unique_count),
            temperature_range: column_stats.get("temperature_celsius").and_then(|s| {
                match (s.min, s.max) {
                    (Some(min), Some(max)) => Some(TemperatureRange { min, max }),
                    _ => None,
                }
            }),
            conditions: column_stats.get("condition_text").map_or(0, |s| s.unique_count),
        };

        DatasetMetadata {
            source: source.to_string(),
            description: "Global weather repository".to_string(),
            total_rows: records.len(),
            total_columns: columns.len(),
            numeric_columns: column_types.numeric.clone(),
            categorical_columns: column_types.categorical.clone(),
            column_stats,
            loaded_at: Utc::now(),
            special_info,
        }
    }

    /// Metadata for a dataset built in memory with no column information
    pub fn empty(source: &str) -> Self {
        DatasetMetadata {
            source: source.to_string(),
            description: String::new(),
            total_rows: 0,
            total_columns: 0,
            numeric_columns: Vec::new(),
            categorical_columns: Vec::new(),
            column_stats: IndexMap::new(),
            loaded_at: Utc::now(),
            special_info: SpecialInfo::default(),
        }
    }
}

/// Schema validator for weather datasets
pub struct SchemaValidator;

impl SchemaValidator {
    /// Check the column-type minimums against the first row.
    ///
    /// Returns the recognized columns on success.
    pub fn validate(rows: &[RawRow]) -> Result<ColumnTypes, DataError> {
        let first = rows.first().ok_or_else(|| {
            DataError::ValidationError("Dataset must be a non-empty array".to_string())
        })?;

        let numeric: Vec<String> = NUMERIC_COLUMNS.iter()
            .filter(|c| first.contains_key(**c))
            .map(|c| c.to_string())
            .collect();

        let categorical: Vec<String> = CATEGORICAL_COLUMNS.iter()
            .filter(|c| first.contains_key(**c))
            .map(|c| c.to_string())
            .collect();

        info!(
            "Recognized {} numeric and {} categorical columns",
            numeric.len(),
            categorical.len()
        );

        if numeric.len() < MIN_NUMERIC_COLUMNS {
            return Err(DataError::ValidationError(format!(
                "At least {} numeric columns are required, found {}",
                MIN_NUMERIC_COLUMNS,
                numeric.len()
            )));
        }

        if categorical.len() < MIN_CATEGORICAL_COLUMNS {
            return Err(DataError::ValidationError(format!(
                "At least {} categorical columns are required, found {}",
                MIN_CATEGORICAL_COLUMNS,
                categorical.len()
            )));
        }

        Ok(ColumnTypes { numeric, categorical })
    }
}
