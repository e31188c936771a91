// CSV export of filtered weather records
// Author: Gabriel Demetrios Lafis

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::{DataError, DataSink, RecordRef, SinkType};

/// Fixed header of the CSV export
pub const CSV_EXPORT_HEADER: [&str; 7] = [
    "Country",
    "City",
    "Temperature (°C)",
    "Humidity (%)",
    "Condition",
    "Wind (km/h)",
    "Pressure (mb)",
];

/// CSV data sink
pub struct CsvSink {
    path: String,
    delimiter: char,
}

impl CsvSink {
    /// Create a new CSV data sink
    pub fn new<P: AsRef<Path>>(path: P, delimiter: char) -> Self {
        CsvSink {
            path: path.as_ref().to_string_lossy().to_string(),
            delimiter,
        }
    }

    /// Write the export to any writer
    pub fn write_to<W: Write>(&self, writer: W, records: &[RecordRef]) -> Result<(), DataError> {
        let mut csv_writer = ::csv::WriterBuilder::new()
            .delimiter(self.delimiter as u8)
            .from_writer(writer);

        csv_writer.write_record(CSV_EXPORT_HEADER)
            .map_err(|e| DataError::IoError(std::io::Error::new(std::io::ErrorKind::Other, e)))?;

        for record in records {
            let row = [
                record.country.clone().unwrap_or_default(),
                record.location_name.clone().unwrap_or_default(),
                record.temperature_or_zero().to_string(),
                record.humidity_or_zero().to_string(),
                record.condition_text.clone().unwrap_or_default(),
                record.wind_or_zero().to_string(),
                record.pressure_or_zero().to_string(),
            ];

            csv_writer.write_record(&row)
                .map_err(|e| DataError::IoError(std::io::Error::new(std::io::ErrorKind::Other, e)))?;
        }

        csv_writer.flush().map_err(DataError::IoError)?;

        Ok(())
    }
}

impl DataSink for CsvSink {
    fn write(&self, records: &[RecordRef]) -> Result<(), DataError> {
        let file = File::create(&self.path).map_err(DataError::IoError)?;
        self.write_to(BufWriter::new(file), records)
    }

    fn name(&self) -> &str {
        &self.path
    }

    fn sink_type(&self) -> SinkType {
        SinkType::File
    }
}
