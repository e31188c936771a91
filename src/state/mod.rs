// State module: the coordinator that owns dashboard state and fans out changes
// Author: Gabriel Demetrios Lafis

mod debounce;
mod events;
mod report;
mod snapshot;

pub use debounce::*;
pub use events::*;
pub use report::*;
pub use snapshot::*;

use std::collections::HashSet;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::data::{DataSet, RecordRef, TemperatureRange};
use crate::processing::{
    condition_counts, mean, ChartBundle, ChartPipeline, FilterEngine, FilterState, FilterUpdate,
    ProcessingError,
};

pub const DEFAULT_SECTION: &str = "overview";

/// Number of conditions listed in the headline statistics
const TOP_CONDITIONS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionCount {
    pub condition: String,
    pub count: usize,
}

/// Headline statistics of the active record set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherStats {
    pub total_countries: usize,
    pub temperature_range: Option<TemperatureRange>,
    pub avg_temperature: f64,
    pub avg_humidity: f64,
    pub top_conditions: Vec<ConditionCount>,
}

impl WeatherStats {
    /// Compute the statistics; an empty set yields the zero statistics
    pub fn compute(records: &[RecordRef]) -> Self {
        if records.is_empty() {
            return WeatherStats::default();
        }

        let temperatures: Vec<f64> = records.iter().map(|r| r.temperature_or_zero()).collect();
        let humidities: Vec<f64> = records.iter().map(|r| r.humidity_or_zero()).collect();

        let countries: HashSet<Option<&str>> = records.iter().map(|r| r.country.as_deref()).collect();

        WeatherStats {
            total_countries: countries.len(),
            temperature_range: Some(TemperatureRange {
                min: temperatures.iter().cloned().fold(f64::INFINITY, f64::min),
                max: temperatures.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            }),
            avg_temperature: mean(&temperatures),
            avg_humidity: mean(&humidities),
            top_conditions: condition_counts(records)
                .into_iter()
                .take(TOP_CONDITIONS)
                .map(|(condition, count)| ConditionCount { condition, count })
                .collect(),
        }
    }
}

/// Presentation state shared with the UI layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiState {
    pub current_section: String,
    pub is_loading: bool,
    pub loading_message: Option<String>,
    pub error: Option<String>,
}

impl Default for UiState {
    fn default() -> Self {
        UiState {
            current_section: DEFAULT_SECTION.to_string(),
            is_loading: false,
            loading_message: None,
            error: None,
        }
    }
}

/// Everything the coordinator owns
#[derive(Debug)]
pub struct DashboardState {
    pub dataset: Option<DataSet>,
    pub filters: FilterState,
    pub filtered: Vec<RecordRef>,
    pub weather_stats: WeatherStats,
    pub charts: ChartBundle,
    pub ui: UiState,
    pub online: bool,
}

impl Default for DashboardState {
    fn default() -> Self {
        DashboardState {
            dataset: None,
            filters: FilterState::default(),
            filtered: Vec::new(),
            weather_stats: WeatherStats::default(),
            charts: ChartBundle::default(),
            ui: UiState::default(),
            online: true,
        }
    }
}

/// Diagnostics about the coordinator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoordinatorStats {
    pub has_dataset: bool,
    pub dataset_size: usize,
    pub filtered_size: usize,
    pub active_filters: usize,
    pub current_section: String,
    pub is_loading: bool,
    pub has_error: bool,
    pub observer_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    Temperature,
    Geography,
    Data,
}

/// A hint about how to narrow or widen the analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub message: String,
}

/// Sole owner and writer of the dashboard state.
///
/// Every change goes through a method here, which recomputes what depends
/// on it and notifies subscribers.
pub struct StateCoordinator {
    state: DashboardState,
    filter_engine: FilterEngine,
    pipeline: ChartPipeline,
    bus: EventBus,
}

impl StateCoordinator {
    /// Create a new coordinator with default filters
    pub fn new(pipeline: ChartPipeline) -> Self {
        Self::with_filters(pipeline, FilterState::default())
    }

    /// Create a new coordinator starting from the given filters
    pub fn with_filters(pipeline: ChartPipeline, filters: FilterState) -> Self {
        StateCoordinator {
            state: DashboardState {
                filters: filters.clone(),
                ..DashboardState::default()
            },
            filter_engine: FilterEngine::with_state(filters),
            pipeline,
            bus: EventBus::new(),
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn filters(&self) -> &FilterState {
        self.filter_engine.state()
    }

    pub fn filtered_records(&self) -> &[RecordRef] {
        &self.state.filtered
    }

    pub fn weather_stats(&self) -> &WeatherStats {
        &self.state.weather_stats
    }

    pub fn charts(&self) -> &ChartBundle {
        &self.state.charts
    }

    pub fn dataset(&self) -> Option<&DataSet> {
        self.state.dataset.as_ref()
    }

    /// Register an observer
    pub fn subscribe<F>(&mut self, filter: Option<EventKind>, observer: F) -> SubscriptionId
    where
        F: FnMut(&StateEvent, &DashboardState) -> Result<(), ObserverError> + 'static,
    {
        self.bus.subscribe(filter, Box::new(observer))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Replace the dataset; the filtered view becomes the whole dataset
    pub fn set_dataset(&mut self, dataset: DataSet) {
        info!("Weather dataset replaced: {} records", dataset.len());

        self.state.filtered = dataset.records.clone();
        self.state.weather_stats = WeatherStats::compute(&self.state.filtered);
        self.state.charts = self.pipeline.run(&self.state.filtered);
        let total_rows = dataset.len();
        self.state.dataset = Some(dataset);

        self.publish(StateEvent::DatasetLoaded { total_rows });
    }

    /// Merge a filter update, refilter and recompute every chart
    pub fn update_filters(&mut self, update: &FilterUpdate) -> Result<(), ProcessingError> {
        let filters = self.filter_engine.update(update)?.clone();
        self.state.filters = filters.clone();

        self.refresh();

        self.publish(StateEvent::FiltersChanged {
            filters,
            filtered_rows: self.state.filtered.len(),
        });
        self.publish_charts();

        Ok(())
    }

    fn refresh(&mut self) {
        self.state.filtered = match &self.state.dataset {
            Some(dataset) => self.filter_engine.apply(&dataset.records),
            None => Vec::new(),
        };
        self.state.weather_stats = WeatherStats::compute(&self.state.filtered);
        self.state.charts = self.pipeline.run(&self.state.filtered);
    }

    fn publish_charts(&mut self) {
        let prepared = self.state.charts.successes().map(|(o, _)| o.kind).collect();
        let failed: Vec<_> = self.state.charts.failures().map(|(o, _)| o.kind).collect();

        if !failed.is_empty() {
            warn!("{} chart(s) could not be prepared", failed.len());
        }

        self.publish(StateEvent::ChartsUpdated { prepared, failed });
    }

    pub fn set_current_section(&mut self, section: &str) {
        self.state.ui.current_section = section.to_string();
        self.publish(StateEvent::UiChanged);
    }

    pub fn set_loading(&mut self, loading: bool, message: Option<&str>) {
        self.state.ui.is_loading = loading;
        self.state.ui.loading_message = message.map(str::to_string);
        self.publish(StateEvent::UiChanged);
    }

    pub fn set_error(&mut self, message: &str) {
        self.state.ui.error = Some(message.to_string());
        self.publish(StateEvent::UiChanged);
    }

    pub fn clear_error(&mut self) {
        self.state.ui.error = None;
        self.publish(StateEvent::UiChanged);
    }

    pub fn set_online(&mut self, online: bool) {
        self.state.online = online;
        self.publish(StateEvent::ConnectivityChanged { online });
    }

    /// Restore default filters and UI state, keeping the dataset
    pub fn reset(&mut self) {
        self.filter_engine.reset();
        self.state.filters = FilterState::default();
        self.state.ui = UiState::default();
        self.state.filtered = self.state.dataset.as_ref()
            .map(|d| d.records.clone())
            .unwrap_or_default();
        self.state.weather_stats = WeatherStats::compute(&self.state.filtered);
        self.state.charts = self.pipeline.run(&self.state.filtered);

        info!("Dashboard state reset");
        self.publish(StateEvent::Reset);
    }

    pub fn stats(&self) -> CoordinatorStats {
        CoordinatorStats {
            has_dataset: self.state.dataset.is_some(),
            dataset_size: self.state.dataset.as_ref().map_or(0, DataSet::len),
            filtered_size: self.state.filtered.len(),
            active_filters: self.state.filters.active_count(),
            current_section: self.state.ui.current_section.clone(),
            is_loading: self.state.ui.is_loading,
            has_error: self.state.ui.error.is_some(),
            observer_count: self.bus.len(),
        }
    }

    /// Hints derived from the filtered records and their statistics
    pub fn recommendations(&self) -> Vec<Recommendation> {
        let mut recommendations = Vec::new();
        if self.state.filtered.is_empty() {
            return recommendations;
        }

        let stats = &self.state.weather_stats;

        if stats.avg_temperature > 30.0 {
            recommendations.push(Recommendation {
                kind: RecommendationKind::Temperature,
                message: "High temperatures detected. Consider filtering for colder regions.".to_string(),
            });
        } else if stats.avg_temperature < 0.0 {
            recommendations.push(Recommendation {
                kind: RecommendationKind::Temperature,
                message: "Very low temperatures. Explore regions with a warmer climate.".to_string(),
            });
        }

        if stats.total_countries > 50 {
            recommendations.push(Recommendation {
                kind: RecommendationKind::Geography,
                message: "Many countries in the analysis. Consider filtering by a specific region.".to_string(),
            });
        }

        if self.state.filtered.len() < 100 {
            recommendations.push(Recommendation {
                kind: RecommendationKind::Data,
                message: "Few records left after filtering. Consider widening the criteria.".to_string(),
            });
        }

        recommendations
    }

    fn publish(&mut self, event: StateEvent) {
        self.bus.publish(&event, &self.state);
    }
}
