// Filter state and the filter engine
// Author: Gabriel Demetrios Lafis

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use log::info;
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::data::RecordRef;
use crate::utils::{validate_finite, validate_range};
use super::stats::{mean, population_std_dev, quantile};
use super::ProcessingError;

pub const DEFAULT_TEMP_MIN: f64 = -30.0;
pub const DEFAULT_TEMP_MAX: f64 = 50.0;

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

/// Either every value or exactly one value; serialized as `"all"` or the value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selection<T> {
    All,
    Only(T),
}

impl<T> Selection<T> {
    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Selection::All => None,
            Selection::Only(value) => Some(value),
        }
    }
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Selection::All
    }
}

impl<T: fmt::Display> fmt::Display for Selection<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Selection::All => write!(f, "all"),
            Selection::Only(value) => write!(f, "{}", value),
        }
    }
}

impl<T: Serialize> Serialize for Selection<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Selection::All => serializer.serialize_str("all"),
            Selection::Only(value) => value.serialize(serializer),
        }
    }
}

impl<'de, T> Deserialize<'de> for Selection<T>
where
    T: Deserialize<'de> + FromStr,
    T::Err: fmt::Display,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr<T> {
            Text(String),
            Value(T),
        }

        match Repr::<T>::deserialize(deserializer)? {
            Repr::Text(text) if text == "all" => Ok(Selection::All),
            Repr::Text(text) => text.parse::<T>()
                .map(Selection::Only)
                .map_err(|e| de::Error::custom(format!("invalid selection '{}': {}", text, e))),
            Repr::Value(value) => Ok(Selection::Only(value)),
        }
    }
}

/// Axis scale of the density-style charts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleType {
    Linear,
    Log,
}

impl Default for ScaleType {
    fn default() -> Self {
        ScaleType::Linear
    }
}

/// The active filter predicate and display toggles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterState {
    pub year: Selection<i32>,
    pub month: Selection<u32>,
    pub country: Selection<String>,
    pub temp_min: f64,
    pub temp_max: f64,
    pub series_visible: bool,
    pub scale_type: ScaleType,
    pub show_outliers: bool,
}

impl Default for FilterState {
    fn default() -> Self {
        FilterState {
            year: Selection::All,
            month: Selection::All,
            country: Selection::All,
            temp_min: DEFAULT_TEMP_MIN,
            temp_max: DEFAULT_TEMP_MAX,
            series_visible: true,
            scale_type: ScaleType::Linear,
            show_outliers: true,
        }
    }
}

impl FilterState {
    /// Apply a partial update, returning the merged state.
    ///
    /// A month outside 1..=12 or a non-finite bound is rejected. If the
    /// merged range is inverted the maximum is raised to the minimum.
    pub fn merged(&self, update: &FilterUpdate) -> Result<FilterState, ProcessingError> {
        let mut next = self.clone();

        if let Some(year) = &update.year {
            next.year = year.clone();
        }
        if let Some(month) = &update.month {
            if let Selection::Only(m) = month {
                validate_range(*m, 1, 12, "month").map_err(ProcessingError::InvalidArgument)?;
            }
            next.month = month.clone();
        }
        if let Some(country) = &update.country {
            next.country = country.clone();
        }
        if let Some(temp_min) = update.temp_min {
            validate_finite(temp_min, "temp_min").map_err(ProcessingError::InvalidArgument)?;
            next.temp_min = temp_min;
        }
        if let Some(temp_max) = update.temp_max {
            validate_finite(temp_max, "temp_max").map_err(ProcessingError::InvalidArgument)?;
            next.temp_max = temp_max;
        }
        if let Some(series_visible) = update.series_visible {
            next.series_visible = series_visible;
        }
        if let Some(scale_type) = update.scale_type {
            next.scale_type = scale_type;
        }
        if let Some(show_outliers) = update.show_outliers {
            next.show_outliers = show_outliers;
        }

        if next.temp_min > next.temp_max {
            next.temp_max = next.temp_min;
        }

        Ok(next)
    }

    /// Whether a record passes the categorical and temperature predicates
    pub fn matches(&self, record: &RecordRef) -> bool {
        if let Selection::Only(year) = &self.year {
            if record.year != Some(*year as f64) {
                return false;
            }
        }

        if let Selection::Only(month) = &self.month {
            if record.month != Some(*month as f64) {
                return false;
            }
        }

        if let Selection::Only(country) = &self.country {
            if record.country.as_deref() != Some(country.as_str()) {
                return false;
            }
        }

        let temperature = record.temperature_or_zero();
        temperature >= self.temp_min && temperature <= self.temp_max
    }

    /// Whether any field differs from its default
    pub fn is_default(&self) -> bool {
        *self == FilterState::default()
    }

    /// Human-readable list of the non-default settings
    pub fn describe(&self) -> String {
        let mut active = Vec::new();

        if let Selection::Only(year) = &self.year {
            active.push(format!("Year: {}", year));
        }
        if let Selection::Only(month) = &self.month {
            let name = MONTH_NAMES.get((*month as usize).wrapping_sub(1)).copied().unwrap_or("?");
            active.push(format!("Month: {}", name));
        }
        if let Selection::Only(country) = &self.country {
            active.push(format!("Country: {}", country));
        }
        if self.temp_min > DEFAULT_TEMP_MIN || self.temp_max < DEFAULT_TEMP_MAX {
            active.push(format!("Temperature: {}°C - {}°C", self.temp_min, self.temp_max));
        }
        if !self.series_visible {
            active.push("Series hidden".to_string());
        }
        if self.scale_type == ScaleType::Log {
            active.push("Logarithmic scale".to_string());
        }
        if !self.show_outliers {
            active.push("Outliers hidden".to_string());
        }

        if active.is_empty() {
            "No active filters".to_string()
        } else {
            active.join(", ")
        }
    }

    /// Number of settings that differ from the defaults
    pub fn active_count(&self) -> usize {
        let defaults = FilterState::default();
        [
            !self.year.is_all(),
            !self.month.is_all(),
            !self.country.is_all(),
            self.temp_min != defaults.temp_min,
            self.temp_max != defaults.temp_max,
            self.series_visible != defaults.series_visible,
            self.scale_type != defaults.scale_type,
            self.show_outliers != defaults.show_outliers,
        ]
        .iter()
        .filter(|changed| **changed)
        .count()
    }
}

/// Partial change to a `FilterState`; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterUpdate {
    pub year: Option<Selection<i32>>,
    pub month: Option<Selection<u32>>,
    pub country: Option<Selection<String>>,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    pub series_visible: Option<bool>,
    pub scale_type: Option<ScaleType>,
    pub show_outliers: Option<bool>,
}

impl FilterUpdate {
    /// An update that replaces every field with those of `state`
    pub fn replace_with(state: &FilterState) -> Self {
        FilterUpdate {
            year: Some(state.year.clone()),
            month: Some(state.month.clone()),
            country: Some(state.country.clone()),
            temp_min: Some(state.temp_min),
            temp_max: Some(state.temp_max),
            series_visible: Some(state.series_visible),
            scale_type: Some(state.scale_type),
            show_outliers: Some(state.show_outliers),
        }
    }

    pub fn year(mut self, year: Selection<i32>) -> Self {
        self.year = Some(year);
        self
    }

    pub fn month(mut self, month: Selection<u32>) -> Self {
        self.month = Some(month);
        self
    }

    pub fn country(mut self, country: Selection<String>) -> Self {
        self.country = Some(country);
        self
    }

    pub fn temperature_range(mut self, min: f64, max: f64) -> Self {
        self.temp_min = Some(min);
        self.temp_max = Some(max);
        self
    }

    pub fn show_outliers(mut self, show: bool) -> Self {
        self.show_outliers = Some(show);
        self
    }

    pub fn scale_type(mut self, scale_type: ScaleType) -> Self {
        self.scale_type = Some(scale_type);
        self
    }

    pub fn series_visible(mut self, visible: bool) -> Self {
        self.series_visible = Some(visible);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == FilterUpdate::default()
    }
}

/// Summary of a filtered record set
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilteredStats {
    pub count: usize,
    pub avg_temperature: f64,
    pub avg_humidity: f64,
    pub countries: usize,
    pub conditions: usize,
}

/// Suggested starting filters for a dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterSuggestions {
    pub top_countries: Vec<String>,
    pub suggested_temp_min: f64,
    pub suggested_temp_max: f64,
    pub total_records: usize,
    pub avg_temperature: f64,
}

/// Holds the current filter state and applies it to record sets
#[derive(Debug, Clone, Default)]
pub struct FilterEngine {
    state: FilterState,
}

impl FilterEngine {
    /// Create a new filter engine with default filters
    pub fn new() -> Self {
        FilterEngine {
            state: FilterState::default(),
        }
    }

    /// Create a filter engine starting from the given state
    pub fn with_state(state: FilterState) -> Self {
        FilterEngine { state }
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    /// Merge a partial update into the current state
    pub fn update(&mut self, update: &FilterUpdate) -> Result<&FilterState, ProcessingError> {
        self.state = self.state.merged(update)?;
        Ok(&self.state)
    }

    /// Restore the default filters
    pub fn reset(&mut self) {
        self.state = FilterState::default();
    }

    /// Apply the current state to `records`
    pub fn apply(&self, records: &[RecordRef]) -> Vec<RecordRef> {
        Self::apply_with(records, &self.state)
    }

    /// Apply `state` to `records` without touching them.
    ///
    /// The returned handles point at the input records. The outlier pass
    /// runs last, on the temperatures that survived the other predicates.
    pub fn apply_with(records: &[RecordRef], state: &FilterState) -> Vec<RecordRef> {
        if records.is_empty() {
            return Vec::new();
        }

        let mut filtered: Vec<RecordRef> = records.iter()
            .filter(|r| state.matches(r))
            .cloned()
            .collect();

        if !state.show_outliers {
            let temperatures: Vec<f64> = filtered.iter().map(|r| r.temperature_or_zero()).collect();
            if let Some((lower, upper)) = Self::outlier_bounds(&temperatures) {
                filtered.retain(|r| {
                    let temperature = r.temperature_or_zero();
                    temperature >= lower && temperature <= upper
                });
            }
        }

        info!("Filters applied: {} → {} weather records", records.len(), filtered.len());

        filtered
    }

    /// Tukey fences `[Q1 - 1.5·IQR, Q3 + 1.5·IQR]`; `None` for no values
    pub fn outlier_bounds(values: &[f64]) -> Option<(f64, f64)> {
        if values.is_empty() {
            return None;
        }

        let q1 = quantile(values, 0.25);
        let q3 = quantile(values, 0.75);
        let iqr = q3 - q1;

        Some((q1 - 1.5 * iqr, q3 + 1.5 * iqr))
    }

    /// Description of the active filters
    pub fn describe_active(&self) -> String {
        self.state.describe()
    }

    /// Count, averages and distinct counts of a filtered set
    pub fn filtered_stats(records: &[RecordRef]) -> FilteredStats {
        if records.is_empty() {
            return FilteredStats::default();
        }

        let temperatures: Vec<f64> = records.iter().map(|r| r.temperature_or_zero()).collect();
        let humidities: Vec<f64> = records.iter().map(|r| r.humidity_or_zero()).collect();

        FilteredStats {
            count: records.len(),
            avg_temperature: mean(&temperatures),
            avg_humidity: mean(&humidities),
            countries: records.iter().map(|r| r.country.as_deref()).collect::<HashSet<_>>().len(),
            conditions: records.iter().map(|r| r.condition_text.as_deref()).collect::<HashSet<_>>().len(),
        }
    }

    /// Busiest countries and a one-deviation temperature window
    pub fn suggestions(records: &[RecordRef]) -> Option<FilterSuggestions> {
        if records.is_empty() {
            return None;
        }

        let mut country_counts: IndexMap<&str, usize> = IndexMap::new();
        for record in records {
            *country_counts.entry(record.country_label()).or_insert(0) += 1;
        }

        let mut ranked: Vec<(&str, usize)> = country_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));

        let temperatures: Vec<f64> = records.iter().map(|r| r.temperature_or_zero()).collect();
        let avg_temperature = mean(&temperatures);
        let std_dev = population_std_dev(&temperatures);

        Some(FilterSuggestions {
            top_countries: ranked.into_iter().take(5).map(|(c, _)| c.to_string()).collect(),
            suggested_temp_min: (avg_temperature - std_dev).round(),
            suggested_temp_max: (avg_temperature + std_dev).round(),
            total_records: records.len(),
            avg_temperature,
        })
    }
}
