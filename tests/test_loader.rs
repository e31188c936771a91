// Loader, source and sink tests
// Author: Gabriel Demetrios Lafis

use std::fs;

use serde_json::json;
use tempfile::tempdir;

use weather_dashboard_engine::{
    data::{
        CsvSink, DataError, DataSink, DataSource, DatasetLoader, JsonSink, JsonSource, MemorySource,
        SyntheticSource, Value,
    },
};

const DATASET: &str = r#"[
    {"country": "Spain", "location_name": "Madrid", "condition_text": "Sunny",
     "temperature_celsius": 20, "humidity": 40, "pressure_mb": 1015, "wind_kph": 10,
     "uv_index": 6, "feels_like_celsius": 22, "air_quality_us-epa-index": 2, "month": 5},
    {"country": "Norway", "location_name": "Oslo", "condition_text": "Light snow",
     "temperature_celsius": "-3.5", "humidity": 85, "pressure_mb": 1002, "wind_kph": 20,
     "uv_index": 1, "feels_like_celsius": -6, "air_quality_us-epa-index": 0, "month": 1},
    {"id": 77, "country": "Egypt", "location_name": "Cairo", "condition_text": "Clear",
     "temperature_celsius": 30, "humidity": "n/a", "pressure_mb": 1010, "wind_kph": 15,
     "uv_index": 9, "station_code": "CAI-01", "month": 8}
]"#;

#[test]
fn test_load_json_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("weather.json");
    fs::write(&path, DATASET).unwrap();

    let dataset = DatasetLoader::new().load(&JsonSource::new(&path)).unwrap();

    assert_eq!(dataset.len(), 3);
    assert_eq!(dataset.metadata.total_rows, 3);
    assert_eq!(dataset.metadata.special_info.countries, 3);
    assert_eq!(dataset.metadata.special_info.conditions, 3);

    // Lenient numbers: numeric strings parse, anything else is missing
    assert_eq!(dataset.records[1].temperature_celsius, Some(-3.5));
    assert_eq!(dataset.records[2].humidity, None);
    assert_eq!(dataset.records[2].get("station_code"), Value::Text("CAI-01".to_string()));
}

#[test]
fn test_enrichment_rules() {
    let source = MemorySource::from_json_str("inline", DATASET).unwrap();
    let dataset = DatasetLoader::new().load(&source).unwrap();

    let madrid = &dataset.records[0];
    assert_eq!(madrid.id, Some(1));
    let comfort = 20.0 - (0.55 - 0.0055 * 40.0) * (20.0 - 14.5);
    assert!((madrid.comfort_index.unwrap() - comfort).abs() < 1e-9);
    assert_eq!(madrid.air_quality_category.as_deref(), Some("Moderate"));
    assert_eq!(madrid.thermal_difference, Some(2.0));

    // A zero EPA index is treated as absent
    let oslo = &dataset.records[1];
    assert_eq!(oslo.id, Some(2));
    assert_eq!(oslo.air_quality_category, None);
    assert_eq!(oslo.thermal_difference, Some(-2.5));

    let cairo = &dataset.records[2];
    assert_eq!(cairo.id, Some(77));
    assert_eq!(cairo.comfort_index, None);
    assert_eq!(cairo.thermal_difference, None);

    assert!(dataset.metadata.numeric_columns.iter().any(|c| c == "temperature_celsius"));
}

#[test]
fn test_validation_errors() {
    let empty = MemorySource::from_json_str("empty", "[]").unwrap();
    assert!(matches!(DatasetLoader::new().load(&empty), Err(DataError::ValidationError(_))));

    assert!(matches!(
        MemorySource::from_json_str("object", r#"{"country": "Spain"}"#),
        Err(DataError::ValidationError(_))
    ));

    let few_numeric = MemorySource::from_json_str(
        "few",
        r#"[{"country": "Spain", "condition_text": "Sunny", "temperature_celsius": 20}]"#,
    )
    .unwrap();
    assert!(matches!(DatasetLoader::new().load(&few_numeric), Err(DataError::ValidationError(_))));

    let few_categorical = MemorySource::from_json_str(
        "few",
        r#"[{"country": "Spain", "temperature_celsius": 20, "humidity": 1, "wind_kph": 2, "uv_index": 3, "cloud": 4}]"#,
    )
    .unwrap();
    assert!(matches!(DatasetLoader::new().load(&few_categorical), Err(DataError::ValidationError(_))));
}

#[test]
fn test_json_array_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested.json");
    let document = format!(r#"{{"payload": {{"records": {}}}}}"#, DATASET);
    fs::write(&path, document).unwrap();

    let rows = JsonSource::with_array_path(&path, "payload.records").read().unwrap();
    assert_eq!(rows.len(), 3);

    assert!(JsonSource::with_array_path(&path, "payload.missing").read().is_err());
}

#[test]
fn test_column_helpers() {
    let source = MemorySource::from_json_str("inline", DATASET).unwrap();
    let dataset = DatasetLoader::new().load(&source).unwrap();

    assert_eq!(dataset.unique_values("country"), vec!["Egypt", "Norway", "Spain"]);
    assert_eq!(dataset.column_range("temperature_celsius"), (-3.5, 30.0));
    assert_eq!(dataset.column_range("country"), (0.0, 100.0));

    let summary = dataset.column_summary("temperature_celsius").unwrap();
    assert_eq!(summary.count, 3);
    assert_eq!(summary.median, 20.0);
    assert!((summary.mean - 46.5 / 3.0).abs() < 1e-9);
    assert!(dataset.column_summary("country").is_none());
}

#[test]
fn test_csv_export() {
    let source = MemorySource::from_json_str("inline", DATASET).unwrap();
    let dataset = DatasetLoader::new().load(&source).unwrap();

    let mut buffer = Vec::new();
    CsvSink::new("unused.csv", ',').write_to(&mut buffer, &dataset.records).unwrap();
    let text = String::from_utf8(buffer).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "Country,City,Temperature (°C),Humidity (%),Condition,Wind (km/h),Pressure (mb)");
    assert_eq!(lines[1], "Spain,Madrid,20,40,Sunny,10,1015");
    assert_eq!(lines[3], "Egypt,Cairo,30,0,Clear,15,1010");

    let dir = tempdir().unwrap();
    let path = dir.path().join("export.csv");
    CsvSink::new(&path, ',').write(&dataset.records).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), text);
}

#[test]
fn test_synthetic_round_trip_through_json_sink() {
    let dataset = DatasetLoader::new().load(&SyntheticSource::new(1, 40)).unwrap();

    let dir = tempdir().unwrap();
    let path = dir.path().join("synthetic.json");
    JsonSink::new(&path, true).write(&dataset.records).unwrap();

    let reloaded = DatasetLoader::new().load(&JsonSource::new(&path)).unwrap();
    assert_eq!(reloaded.len(), 40);
    assert_eq!(reloaded.records[7].temperature_celsius, dataset.records[7].temperature_celsius);
    assert_eq!(reloaded.records[7].country, dataset.records[7].country);
    assert_eq!(reloaded.records[7].air_quality_category, dataset.records[7].air_quality_category);
}

#[test]
fn test_synthetic_source_is_reproducible() {
    let a = SyntheticSource::new(8, 25).generate();
    let b = SyntheticSource::new(8, 25).generate();
    let c = SyntheticSource::new(9, 25).generate();

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(json!(a[0]["year"]), json!(2024));
}
