// Typed weather observation record
// Author: Gabriel Demetrios Lafis

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::Value;

/// One weather observation.
///
/// Every recognized column is an explicit optional field. Columns the
/// engine does not know about are kept in `extra` so that dataset variants
/// round-trip unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherRecord {
    #[serde(deserialize_with = "lenient::integer", skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    // Categorical columns
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub condition_text: Option<String>,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub wind_direction: Option<String>,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub moon_phase: Option<String>,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub temp_category: Option<String>,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub humidity_category: Option<String>,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub wind_category: Option<String>,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,

    // Numeric columns
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub temperature_celsius: Option<f64>,
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub temperature_fahrenheit: Option<f64>,
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub wind_mph: Option<f64>,
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub wind_kph: Option<f64>,
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub wind_degree: Option<f64>,
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub pressure_mb: Option<f64>,
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub pressure_in: Option<f64>,
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub precip_mm: Option<f64>,
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub precip_in: Option<f64>,
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub cloud: Option<f64>,
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub feels_like_celsius: Option<f64>,
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub feels_like_fahrenheit: Option<f64>,
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub visibility_km: Option<f64>,
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub visibility_miles: Option<f64>,
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub uv_index: Option<f64>,
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub gust_mph: Option<f64>,
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub gust_kph: Option<f64>,
    #[serde(
        rename = "air_quality_Carbon_Monoxide",
        deserialize_with = "lenient::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub air_quality_carbon_monoxide: Option<f64>,
    #[serde(
        rename = "air_quality_Ozone",
        deserialize_with = "lenient::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub air_quality_ozone: Option<f64>,
    #[serde(
        rename = "air_quality_Nitrogen_dioxide",
        deserialize_with = "lenient::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub air_quality_nitrogen_dioxide: Option<f64>,
    #[serde(
        rename = "air_quality_PM2.5",
        deserialize_with = "lenient::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub air_quality_pm2_5: Option<f64>,
    #[serde(
        rename = "air_quality_PM10",
        deserialize_with = "lenient::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub air_quality_pm10: Option<f64>,
    #[serde(
        rename = "air_quality_us-epa-index",
        deserialize_with = "lenient::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub air_quality_us_epa_index: Option<f64>,
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub moon_illumination: Option<f64>,
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub year: Option<f64>,
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub month: Option<f64>,
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub day: Option<f64>,
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub hour: Option<f64>,
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub quarter: Option<f64>,

    // Fields added by the loader
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub comfort_index: Option<f64>,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub air_quality_category: Option<String>,
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub thermal_difference: Option<f64>,

    /// Unrecognized columns, kept verbatim
    #[serde(flatten)]
    pub extra: BTreeMap<String, JsonValue>,
}

impl WeatherRecord {
    /// Build a record from a raw JSON object
    pub fn from_json_object(object: &serde_json::Map<String, JsonValue>) -> Result<Self, serde_json::Error> {
        serde_json::from_value(JsonValue::Object(object.clone()))
    }

    /// Look up a column by its dataset name
    pub fn get(&self, column: &str) -> Value {
        fn num(v: Option<f64>) -> Value {
            v.map_or(Value::Null, Value::Number)
        }
        fn text(v: &Option<String>) -> Value {
            v.as_ref().map_or(Value::Null, |s| Value::Text(s.clone()))
        }

        match column {
            "id" => self.id.map_or(Value::Null, |id| Value::Number(id as f64)),
            "country" => text(&self.country),
            "location_name" => text(&self.location_name),
            "timezone" => text(&self.timezone),
            "condition_text" => text(&self.condition_text),
            "wind_direction" => text(&self.wind_direction),
            "moon_phase" => text(&self.moon_phase),
            "temp_category" => text(&self.temp_category),
            "humidity_category" => text(&self.humidity_category),
            "wind_category" => text(&self.wind_category),
            "last_updated" => text(&self.last_updated),
            "latitude" => num(self.latitude),
            "longitude" => num(self.longitude),
            "temperature_celsius" => num(self.temperature_celsius),
            "temperature_fahrenheit" => num(self.temperature_fahrenheit),
            "wind_mph" => num(self.wind_mph),
            "wind_kph" => num(self.wind_kph),
            "wind_degree" => num(self.wind_degree),
            "pressure_mb" => num(self.pressure_mb),
            "pressure_in" => num(self.pressure_in),
            "precip_mm" => num(self.precip_mm),
            "precip_in" => num(self.precip_in),
            "humidity" => num(self.humidity),
            "cloud" => num(self.cloud),
            "feels_like_celsius" => num(self.feels_like_celsius),
            "feels_like_fahrenheit" => num(self.feels_like_fahrenheit),
            "visibility_km" => num(self.visibility_km),
            "visibility_miles" => num(self.visibility_miles),
            "uv_index" => num(self.uv_index),
            "gust_mph" => num(self.gust_mph),
            "gust_kph" => num(self.gust_kph),
            "air_quality_Carbon_Monoxide" => num(self.air_quality_carbon_monoxide),
            "air_quality_Ozone" => num(self.air_quality_ozone),
            "air_quality_Nitrogen_dioxide" => num(self.air_quality_nitrogen_dioxide),
            "air_quality_PM2.5" => num(self.air_quality_pm2_5),
            "air_quality_PM10" => num(self.air_quality_pm10),
            "air_quality_us-epa-index" => num(self.air_quality_us_epa_index),
            "moon_illumination" => num(self.moon_illumination),
            "year" => num(self.year),
            "month" => num(self.month),
            "day" => num(self.day),
            "hour" => num(self.hour),
            "quarter" => num(self.quarter),
            "comfort_index" => num(self.comfort_index),
            "air_quality_category" => text(&self.air_quality_category),
            "thermal_difference" => num(self.thermal_difference),
            other => self.extra.get(other).map_or(Value::Null, Value::from_json),
        }
    }

    /// Numeric value of a column, if present and numeric
    pub fn numeric(&self, column: &str) -> Option<f64> {
        self.get(column).as_f64()
    }

    /// Grouping key for a column; missing values group under "Unknown"
    pub fn group_key(&self, column: &str) -> String {
        match self.get(column) {
            Value::Null => "Unknown".to_string(),
            value => value.to_string(),
        }
    }

    pub fn temperature_or_zero(&self) -> f64 {
        self.temperature_celsius.unwrap_or(0.0)
    }

    pub fn humidity_or_zero(&self) -> f64 {
        self.humidity.unwrap_or(0.0)
    }

    pub fn pressure_or_zero(&self) -> f64 {
        self.pressure_mb.unwrap_or(0.0)
    }

    pub fn wind_or_zero(&self) -> f64 {
        self.wind_kph.unwrap_or(0.0)
    }

    pub fn uv_or_zero(&self) -> f64 {
        self.uv_index.unwrap_or(0.0)
    }

    /// Condition label, "Unknown" when missing
    pub fn condition_label(&self) -> &str {
        self.condition_text.as_deref().unwrap_or("Unknown")
    }

    /// Country label, "Unknown" when missing
    pub fn country_label(&self) -> &str {
        self.country.as_deref().unwrap_or("Unknown")
    }

    /// Month number, 1 when missing or zero
    pub fn month_or_default(&self) -> u32 {
        match self.month {
            Some(m) if m >= 1.0 => m as u32,
            _ => 1,
        }
    }

    /// Quarter from the `quarter` column, or derived from the month
    pub fn quarter_or_derived(&self) -> u32 {
        match self.quarter {
            Some(q) if q >= 1.0 => q as u32,
            _ => (self.month_or_default() + 2) / 3,
        }
    }
}

/// Deserializers that never reject a record for a badly typed cell
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value as JsonValue;

    pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = JsonValue::deserialize(deserializer)?;
        Ok(match value {
            JsonValue::Number(n) => n.as_f64(),
            JsonValue::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        })
    }

    pub fn integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(number(deserializer)?.map(|v| v as i64))
    }

    pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = JsonValue::deserialize(deserializer)?;
        Ok(match value {
            JsonValue::String(s) => Some(s),
            JsonValue::Number(n) => Some(n.to_string()),
            JsonValue::Bool(b) => Some(b.to_string()),
            _ => None,
        })
    }
}
