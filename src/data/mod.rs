// Data module for weather records, sources and sinks
// Author: Gabriel Demetrios Lafis

mod csv;
mod json;
mod loader;
mod record;
mod schema;
mod synthetic;

pub use self::csv::*;
pub use json::*;
pub use loader::*;
pub use record::*;
pub use schema::*;
pub use synthetic::*;

use std::collections::BTreeSet;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value as JsonValue;

/// Shared handle to an immutable record
pub type RecordRef = Arc<WeatherRecord>;

/// A raw row as delivered by a source, before typing
pub type RawRow = serde_json::Map<String, JsonValue>;

/// Represents a provider of raw weather rows
pub trait DataSource {
    /// Read all rows from the source
    fn read(&self) -> Result<Vec<RawRow>, DataError>;

    /// Get the source name
    fn name(&self) -> &str;

    /// Get the source type
    fn source_type(&self) -> SourceType;
}

/// Represents a destination for weather records
pub trait DataSink {
    /// Write records to the sink
    fn write(&self, records: &[RecordRef]) -> Result<(), DataError>;

    /// Get the sink name
    fn name(&self) -> &str;

    /// Get the sink type
    fn sink_type(&self) -> SinkType;
}

/// The canonical dataset: typed records plus their metadata
#[derive(Debug, Clone)]
pub struct DataSet {
    pub records: Vec<RecordRef>,
    pub metadata: DatasetMetadata,
}

impl DataSet {
    /// Create a dataset from records and metadata
    pub fn new(records: Vec<RecordRef>, metadata: DatasetMetadata) -> Self {
        DataSet { records, metadata }
    }

    /// Get the number of records in the dataset
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the dataset is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get a record by index
    pub fn get(&self, index: usize) -> Option<&RecordRef> {
        self.records.get(index)
    }

    /// Sorted distinct non-null values of a column
    pub fn unique_values(&self, column: &str) -> Vec<String> {
        let values: BTreeSet<String> = self.records.iter()
            .map(|r| r.get(column))
            .filter(|v| !v.is_null())
            .map(|v| v.to_string())
            .collect();

        values.into_iter().collect()
    }

    /// Min and max of a numeric column; `(0, 100)` when the column is not numeric
    pub fn column_range(&self, column: &str) -> (f64, f64) {
        match self.metadata.column_stats.get(column) {
            Some(ColumnStatistics { column_type: ColumnType::Numeric, min: Some(min), max: Some(max), .. }) => (*min, *max),
            _ => (0.0, 100.0),
        }
    }

    /// Descriptive statistics of a numeric column, `None` when it has no numbers
    pub fn column_summary(&self, column: &str) -> Option<ColumnSummary> {
        let mut values: Vec<f64> = self.records.iter()
            .filter_map(|r| r.numeric(column))
            .collect();

        if values.is_empty() {
            return None;
        }

        values.sort_by(|a, b| a.total_cmp(b));

        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;

        Some(ColumnSummary {
            count,
            min: values[0],
            max: values[count - 1],
            mean,
            median: values[count / 2],
            std_dev: variance.sqrt(),
        })
    }
}

/// Descriptive statistics of one numeric column
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
}

/// A single cell value resolved by column name
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Number(f64),
    Text(String),
}

impl Value {
    /// Convert a JSON value to a cell value
    pub fn from_json(json: &JsonValue) -> Value {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Number(n) => n.as_f64().map_or(Value::Null, Value::Number),
            JsonValue::String(s) => Value::Text(s.clone()),
            JsonValue::Bool(b) => Value::Text(b.to_string()),
            other => Value::Text(other.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Represents a source type
#[derive(Debug, Clone, PartialEq)]
pub enum SourceType {
    File,
    Memory,
    Generated,
}

/// Represents a sink type
#[derive(Debug, Clone, PartialEq)]
pub enum SinkType {
    File,
}

/// Represents an error in the data module
#[derive(Debug)]
pub enum DataError {
    IoError(std::io::Error),
    ParseError(String),
    ValidationError(String),
    NotSupported(String),
    Other(String),
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DataError::IoError(err) => write!(f, "IO error: {}", err),
            DataError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            DataError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            DataError::NotSupported(msg) => write!(f, "Not supported: {}", msg),
            DataError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl Error for DataError {}

impl From<std::io::Error> for DataError {
    fn from(err: std::io::Error) -> Self {
        DataError::IoError(err)
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::ParseError(err.to_string())
    }
}
