// JSON data source and sink implementation
// Author: Gabriel Demetrios Lafis

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde_json::Value as JsonValue;

use super::{DataError, DataSink, DataSource, RawRow, RecordRef, SinkType, SourceType};

/// JSON data source reading an array of flat objects
pub struct JsonSource {
    path: String,
    array_path: Option<String>,
}

impl JsonSource {
    /// Create a new JSON data source
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        JsonSource {
            path: path.as_ref().to_string_lossy().to_string(),
            array_path: None,
        }
    }

    /// Create a new JSON data source with a dotted path to the array
    pub fn with_array_path<P: AsRef<Path>, S: Into<String>>(path: P, array_path: S) -> Self {
        JsonSource {
            path: path.as_ref().to_string_lossy().to_string(),
            array_path: Some(array_path.into()),
        }
    }

    /// Extract the row objects from a parsed document
    pub fn rows_from_document(json: JsonValue, array_path: Option<&str>) -> Result<Vec<RawRow>, DataError> {
        let mut current = json;

        if let Some(array_path) = array_path {
            for part in array_path.split('.') {
                current = match current {
                    JsonValue::Object(mut obj) => obj.remove(part).ok_or_else(|| {
                        DataError::ParseError(format!("Path '{}' not found in JSON", array_path))
                    })?,
                    _ => {
                        return Err(DataError::ParseError(format!(
                            "Path '{}' not found in JSON",
                            array_path
                        )))
                    },
                };
            }
        }

        let array = match current {
            JsonValue::Array(array) => array,
            _ => {
                return Err(DataError::ValidationError(
                    "Dataset must be a JSON array of objects".to_string(),
                ))
            },
        };

        array.into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                JsonValue::Object(obj) => Ok(obj),
                _ => Err(DataError::ParseError(format!("Array element {} is not an object", i))),
            })
            .collect()
    }
}

impl DataSource for JsonSource {
    fn read(&self) -> Result<Vec<RawRow>, DataError> {
        let file = File::open(&self.path).map_err(DataError::IoError)?;
        let reader = BufReader::new(file);

        let json: JsonValue = serde_json::from_reader(reader)
            .map_err(|e| DataError::ParseError(e.to_string()))?;

        Self::rows_from_document(json, self.array_path.as_deref())
    }

    fn name(&self) -> &str {
        &self.path
    }

    fn source_type(&self) -> SourceType {
        SourceType::File
    }
}

/// In-memory source over rows that are already parsed
pub struct MemorySource {
    name: String,
    rows: Vec<RawRow>,
}

impl MemorySource {
    pub fn new(name: &str, rows: Vec<RawRow>) -> Self {
        MemorySource {
            name: name.to_string(),
            rows,
        }
    }

    /// Parse rows from a JSON string
    pub fn from_json_str(name: &str, json: &str) -> Result<Self, DataError> {
        let document: JsonValue = serde_json::from_str(json)?;
        let rows = JsonSource::rows_from_document(document, None)?;
        Ok(MemorySource::new(name, rows))
    }
}

impl DataSource for MemorySource {
    fn read(&self) -> Result<Vec<RawRow>, DataError> {
        Ok(self.rows.clone())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn source_type(&self) -> SourceType {
        SourceType::Memory
    }
}

/// JSON data sink writing an array of records
pub struct JsonSink {
    path: String,
    pretty: bool,
}

impl JsonSink {
    /// Create a new JSON data sink
    pub fn new<P: AsRef<Path>>(path: P, pretty: bool) -> Self {
        JsonSink {
            path: path.as_ref().to_string_lossy().to_string(),
            pretty,
        }
    }
}

impl DataSink for JsonSink {
    fn write(&self, records: &[RecordRef]) -> Result<(), DataError> {
        let file = File::create(&self.path).map_err(DataError::IoError)?;
        let writer = BufWriter::new(file);

        let array: Vec<&super::WeatherRecord> = records.iter().map(|r| r.as_ref()).collect();

        if self.pretty {
            serde_json::to_writer_pretty(writer, &array)
                .map_err(|e| DataError::IoError(std::io::Error::new(std::io::ErrorKind::Other, e)))?;
        } else {
            serde_json::to_writer(writer, &array)
                .map_err(|e| DataError::IoError(std::io::Error::new(std::io::ErrorKind::Other, e)))?;
        }

        Ok(())
    }

    fn name(&self) -> &str {
        &self.path
    }

    fn sink_type(&self) -> SinkType {
        SinkType::File
    }
}
