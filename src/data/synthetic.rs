// Seeded synthetic weather dataset generator
// Author: Gabriel Demetrios Lafis

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde_json::json;

use super::{DataError, DataSource, RawRow, SourceType};

/// Countries with a representative city and a base temperature
const STATIONS: &[(&str, &str, f64)] = &[
    ("Brazil", "Brasilia", 24.0),
    ("Canada", "Ottawa", 2.0),
    ("United States", "Washington", 14.0),
    ("Mexico", "Mexico City", 19.0),
    ("Argentina", "Buenos Aires", 17.0),
    ("Germany", "Berlin", 10.0),
    ("France", "Paris", 12.0),
    ("Norway", "Oslo", -1.0),
    ("Spain", "Madrid", 16.0),
    ("India", "New Delhi", 29.0),
    ("China", "Beijing", 12.0),
    ("Japan", "Tokyo", 15.0),
    ("Russia", "Moscow", -4.0),
    ("Egypt", "Cairo", 27.0),
    ("Nigeria", "Abuja", 31.0),
    ("Kenya", "Nairobi", 19.0),
    ("Australia", "Canberra", 13.0),
    ("New Zealand", "Wellington", 12.0),
    ("Iceland", "Reykjavik", -3.0),
    ("Saudi Arabia", "Riyadh", 34.0),
];

const CONDITIONS: &[&str] = &[
    "Sunny",
    "Partly cloudy",
    "Clear",
    "Overcast",
    "Light rain",
    "Mist",
    "Patchy rain possible",
    "Moderate rain",
    "Cloudy",
    "Fog",
    "Light snow",
];

const MOON_PHASES: &[&str] = &["New Moon", "Waxing Crescent", "First Quarter", "Full Moon", "Waning Gibbous"];
const WIND_DIRECTIONS: &[&str] = &["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

/// Source producing a reproducible synthetic weather dataset
pub struct SyntheticSource {
    name: String,
    seed: u64,
    rows: usize,
}

impl SyntheticSource {
    /// Create a new generator for `rows` records
    pub fn new(seed: u64, rows: usize) -> Self {
        SyntheticSource {
            name: format!("synthetic(seed={}, rows={})", seed, rows),
            seed,
            rows,
        }
    }

    /// Generate the rows; the same seed always yields the same rows
    pub fn generate(&self) -> Vec<RawRow> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        (0..self.rows).map(|_| Self::row(&mut rng)).collect()
    }

    fn row(rng: &mut StdRng) -> RawRow {
        let (country, city, base) = STATIONS[rng.gen_range(0..STATIONS.len())];
        let month: u32 = rng.gen_range(1..=12);
        let day: u32 = rng.gen_range(1..=28);
        let hour: u32 = rng.gen_range(0..24);

        let temperature = round1(base + rng.gen_range(-8.0..8.0));
        let humidity = rng.gen_range(15..=100) as f64;
        let wind_kph = round1(rng.gen_range(0.0..45.0));
        let pressure_mb = rng.gen_range(990..=1035) as f64;
        let feels_like = round1(temperature + rng.gen_range(-3.0..3.0));
        let condition = CONDITIONS.choose(rng).copied().unwrap_or("Clear");
        let wind_direction = WIND_DIRECTIONS.choose(rng).copied().unwrap_or("N");
        let moon_phase = MOON_PHASES.choose(rng).copied().unwrap_or("Full Moon");

        let value = json!({
            "country": country,
            "location_name": city,
            "condition_text": condition,
            "wind_direction": wind_direction,
            "moon_phase": moon_phase,
            "last_updated": format!("2024-{:02}-{:02} {:02}:00", month, day, hour),
            "temperature_celsius": temperature,
            "temperature_fahrenheit": round1(temperature * 9.0 / 5.0 + 32.0),
            "feels_like_celsius": feels_like,
            "humidity": humidity,
            "wind_kph": wind_kph,
            "wind_mph": round1(wind_kph / 1.609),
            "pressure_mb": pressure_mb,
            "precip_mm": round1(rng.gen_range(0.0..5.0)),
            "cloud": rng.gen_range(0..=100) as f64,
            "uv_index": rng.gen_range(0..=11) as f64,
            "visibility_km": rng.gen_range(2..=10) as f64,
            "air_quality_us-epa-index": rng.gen_range(1..=6) as f64,
            "year": 2024,
            "month": month,
            "day": day,
            "hour": hour,
            "quarter": (month + 2) / 3,
        });

        match value {
            serde_json::Value::Object(map) => map,
            _ => RawRow::new(),
        }
    }
}

impl DataSource for SyntheticSource {
    fn read(&self) -> Result<Vec<RawRow>, DataError> {
        Ok(self.generate())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn source_type(&self) -> SourceType {
        SourceType::Generated
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
