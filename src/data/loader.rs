// Dataset loading: validation, enrichment and metadata
// Author: Gabriel Demetrios Lafis

use std::sync::Arc;

use log::{info, warn};

use super::{
    DataError, DataSet, DataSource, DatasetMetadata, RawRow, RecordRef, SchemaValidator,
    WeatherRecord,
};

/// Datasets smaller than this still load, with a warning
pub const DEFAULT_MIN_ROWS_WARNING: usize = 100;

/// Columns that enrichment may add to a record
const ENRICHED_COLUMNS: [&str; 4] = ["id", "comfort_index", "air_quality_category", "thermal_difference"];

/// Turns raw rows from a source into the canonical dataset
pub struct DatasetLoader {
    min_rows_warning: usize,
}

impl DatasetLoader {
    /// Create a new loader
    pub fn new() -> Self {
        DatasetLoader {
            min_rows_warning: DEFAULT_MIN_ROWS_WARNING,
        }
    }

    /// Set the row count under which a warning is logged
    pub fn with_min_rows_warning(mut self, min_rows_warning: usize) -> Self {
        self.min_rows_warning = min_rows_warning;
        self
    }

    /// Read, validate, enrich and describe a dataset
    pub fn load(&self, source: &dyn DataSource) -> Result<DataSet, DataError> {
        info!("Loading weather dataset from {}", source.name());

        let rows = source.read()?;
        info!("Read {} weather records", rows.len());

        self.build(source.name(), &rows)
    }

    /// Validate, enrich and describe rows that are already in memory
    pub fn build(&self, source_name: &str, rows: &[RawRow]) -> Result<DataSet, DataError> {
        let column_types = SchemaValidator::validate(rows)?;

        if rows.len() < self.min_rows_warning {
            warn!(
                "Dataset has {} rows, at least {} are recommended",
                rows.len(),
                self.min_rows_warning
            );
        }

        let mut records = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            let record = WeatherRecord::from_json_object(row)
                .map_err(|e| DataError::ParseError(format!("Row {}: {}", index, e)))?;
            records.push(Arc::new(Self::enrich(record, index)));
        }

        let columns = Self::column_names(&rows[0], &records);
        let metadata = DatasetMetadata::generate(source_name, &records, &columns, &column_types);

        info!(
            "Weather dataset ready: {} records, {} countries",
            records.len(),
            metadata.special_info.countries
        );

        Ok(DataSet::new(records, metadata))
    }

    /// Add derived fields without touching source fields
    pub fn enrich(mut record: WeatherRecord, index: usize) -> WeatherRecord {
        if record.id.is_none() {
            record.id = Some(index as i64 + 1);
        }

        if let (Some(temp), Some(humidity)) = (non_zero(record.temperature_celsius), non_zero(record.humidity)) {
            record.comfort_index = Some(temp - (0.55 - 0.0055 * humidity) * (temp - 14.5));
        }

        if let Some(aqi) = non_zero(record.air_quality_us_epa_index) {
            let category = if aqi <= 1.0 {
                "Good"
            } else if aqi <= 2.0 {
                "Moderate"
            } else if aqi <= 3.0 {
                "Unhealthy for Sensitive"
            } else if aqi <= 4.0 {
                "Unhealthy"
            } else {
                "Very Unhealthy"
            };
            record.air_quality_category = Some(category.to_string());
        }

        if let (Some(feels_like), Some(temp)) = (non_zero(record.feels_like_celsius), non_zero(record.temperature_celsius)) {
            record.thermal_difference = Some(feels_like - temp);
        }

        record
    }

    /// Columns of the first row followed by any enrichment columns
    fn column_names(first_row: &RawRow, records: &[RecordRef]) -> Vec<String> {
        let mut columns: Vec<String> = first_row.keys().cloned().collect();

        for column in ENRICHED_COLUMNS {
            if !columns.iter().any(|c| c == column)
                && records.iter().any(|r| !r.get(column).is_null())
            {
                columns.push(column.to_string());
            }
        }

        columns
    }
}

impl Default for DatasetLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn non_zero(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}
