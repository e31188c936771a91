// Processing module: aggregation, statistics, filtering and chart preparation
// Author: Gabriel Demetrios Lafis

mod aggregate;
mod chart;
mod density;
mod filter;
mod pareto;
mod region;
mod stats;

pub use aggregate::*;
pub use chart::*;
pub use density::*;
pub use filter::*;
pub use pareto::*;
pub use region::*;
pub use stats::*;

use std::any::Any;
use std::error::Error;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::data::{DataError, RecordRef};

/// Prepares the data of one chart from filtered records
pub trait ChartTransform {
    /// Derive the chart data
    fn apply(&self, records: &[RecordRef]) -> Result<DerivedChartData, ProcessingError>;

    /// Get the chart this transform feeds
    fn kind(&self) -> ChartKind;

    /// Get the transform name
    fn name(&self) -> &str;
}

/// Represents an error in the processing module
#[derive(Debug)]
pub enum ProcessingError {
    DataError(DataError),
    InvalidArgument(String),
    Degenerate(String),
    Panicked(String),
    Other(String),
}

impl fmt::Display for ProcessingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ProcessingError::DataError(err) => write!(f, "Data error: {}", err),
            ProcessingError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            ProcessingError::Degenerate(msg) => write!(f, "Degenerate result: {}", msg),
            ProcessingError::Panicked(msg) => write!(f, "Transform panicked: {}", msg),
            ProcessingError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl Error for ProcessingError {}

impl From<DataError> for ProcessingError {
    fn from(err: DataError) -> Self {
        ProcessingError::DataError(err)
    }
}

/// Tunable parameters of the chart transforms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSettings {
    pub top_conditions: usize,
    pub samples_per_condition: usize,
    pub funnel_top: usize,
    pub pareto_top: usize,
    pub pareto_group_by: String,
    pub pareto_value: String,
    pub kde_column: String,
    pub kde_grid_points: usize,
    pub treemap_countries_per_band: usize,
    pub chord_conditions: usize,
}

impl Default for ChartSettings {
    fn default() -> Self {
        ChartSettings {
            top_conditions: DEFAULT_TOP_CONDITIONS,
            samples_per_condition: DEFAULT_SAMPLES_PER_CONDITION,
            funnel_top: DEFAULT_FUNNEL_TOP,
            pareto_top: DEFAULT_PARETO_TOP,
            pareto_group_by: "country".to_string(),
            pareto_value: "temperature_celsius".to_string(),
            kde_column: "temperature_celsius".to_string(),
            kde_grid_points: DEFAULT_GRID_POINTS,
            treemap_countries_per_band: DEFAULT_COUNTRIES_PER_BAND,
            chord_conditions: DEFAULT_CHORD_CONDITIONS,
        }
    }
}

type TransformFn = dyn Fn(&[RecordRef]) -> Result<DerivedChartData, ProcessingError>;

/// Chart transform backed by a closure
pub struct FnTransform {
    name: String,
    kind: ChartKind,
    transform: Box<TransformFn>,
}

impl FnTransform {
    /// Create a new transform for a chart kind
    pub fn new<F>(name: &str, kind: ChartKind, transform: F) -> Self
    where
        F: Fn(&[RecordRef]) -> Result<DerivedChartData, ProcessingError> + 'static,
    {
        FnTransform {
            name: name.to_string(),
            kind,
            transform: Box::new(transform),
        }
    }

    /// The standard transform of `kind`, parameterized by `settings`
    pub fn standard(kind: ChartKind, settings: &ChartSettings) -> Self {
        let s = settings.clone();
        match kind {
            ChartKind::Combined => Self::new("monthly_averages", kind, |records| {
                Ok(DerivedChartData::Combined(monthly_averages(records)))
            }),
            ChartKind::Waterfall => Self::new("quarterly_waterfall", kind, |records| {
                Ok(DerivedChartData::Waterfall(quarterly_waterfall(records)))
            }),
            ChartKind::Treemap => Self::new("treemap_hierarchy", kind, move |records| {
                Ok(DerivedChartData::Treemap(treemap_hierarchy(records, s.treemap_countries_per_band)))
            }),
            ChartKind::Sankey => Self::new("sankey_flow", kind, |records| {
                Ok(DerivedChartData::Sankey(sankey_flow(records, RegionPolicy::Continental)))
            }),
            ChartKind::Swarm => Self::new("sample_by_top_conditions", kind, move |records| {
                Ok(DerivedChartData::Swarm(sample_by_top_conditions(
                    records,
                    s.top_conditions,
                    s.samples_per_condition,
                )))
            }),
            ChartKind::Geo => Self::new("aggregate_by_country", kind, |records| {
                Ok(DerivedChartData::Geo(aggregate_by_country(records)))
            }),
            ChartKind::Funnel => Self::new("rank_conditions_for_funnel", kind, move |records| {
                Ok(DerivedChartData::Funnel(rank_conditions_for_funnel(records, s.funnel_top)))
            }),
            ChartKind::Radar => Self::new("regional_radar_profiles", kind, |records| {
                Ok(DerivedChartData::Radar(regional_radar_profiles(records, RegionPolicy::MergedAmericas)))
            }),
            ChartKind::Heatmap => Self::new("correlation_matrix", kind, |records| {
                Ok(DerivedChartData::Heatmap(correlation_matrix(records)))
            }),
            ChartKind::Ribbon => Self::new("condition_chord", kind, move |records| {
                Ok(DerivedChartData::Ribbon(condition_chord(records, s.chord_conditions)))
            }),
            ChartKind::Pareto => Self::new("pareto_analysis", kind, move |records| {
                Ok(DerivedChartData::Pareto(pareto_analysis(
                    records,
                    &s.pareto_group_by,
                    &s.pareto_value,
                    s.pareto_top,
                )))
            }),
            ChartKind::Density => Self::new("kernel_density_estimate", kind, move |records| {
                column_density(records, &s.kde_column, s.kde_grid_points).map(DerivedChartData::Density)
            }),
        }
    }
}

impl ChartTransform for FnTransform {
    fn apply(&self, records: &[RecordRef]) -> Result<DerivedChartData, ProcessingError> {
        (self.transform)(records)
    }

    fn kind(&self) -> ChartKind {
        self.kind
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Result of one chart transform
#[derive(Debug)]
pub struct ChartOutput {
    pub kind: ChartKind,
    pub container_id: String,
    pub result: Result<DerivedChartData, ProcessingError>,
}

/// Results of a full pipeline run, in registration order
#[derive(Debug, Default)]
pub struct ChartBundle {
    pub outputs: Vec<ChartOutput>,
}

impl ChartBundle {
    pub fn get(&self, kind: ChartKind) -> Option<&DerivedChartData> {
        self.outputs.iter()
            .find(|o| o.kind == kind)
            .and_then(|o| o.result.as_ref().ok())
    }

    pub fn successes(&self) -> impl Iterator<Item = (&ChartOutput, &DerivedChartData)> {
        self.outputs.iter().filter_map(|o| o.result.as_ref().ok().map(|d| (o, d)))
    }

    pub fn failures(&self) -> impl Iterator<Item = (&ChartOutput, &ProcessingError)> {
        self.outputs.iter().filter_map(|o| o.result.as_ref().err().map(|e| (o, e)))
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }
}

/// Runs every registered chart transform over the same records.
///
/// A failing transform only loses its own chart.
pub struct ChartPipeline {
    name: String,
    transforms: Vec<(String, Box<dyn ChartTransform>)>,
}

impl ChartPipeline {
    /// Create a new, empty pipeline with the given name
    pub fn new(name: &str) -> Self {
        ChartPipeline {
            name: name.to_string(),
            transforms: Vec::new(),
        }
    }

    /// Pipeline with the standard transform of every chart kind
    pub fn standard(settings: &ChartSettings) -> Self {
        ChartKind::ALL.iter().fold(Self::new("dashboard"), |pipeline, kind| {
            pipeline.add(FnTransform::standard(*kind, settings))
        })
    }

    /// Add a transform drawing into its kind's default container
    pub fn add<T: ChartTransform + 'static>(self, transform: T) -> Self {
        let container_id = transform.kind().container_id().to_string();
        self.add_with_container(&container_id, transform)
    }

    /// Add a transform drawing into a specific container
    pub fn add_with_container<T: ChartTransform + 'static>(mut self, container_id: &str, transform: T) -> Self {
        self.transforms.push((container_id.to_string(), Box::new(transform)));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Run every transform, containing failures per chart
    pub fn run(&self, records: &[RecordRef]) -> ChartBundle {
        let outputs = self.transforms.iter()
            .map(|(container_id, transform)| {
                let result = Self::run_one(transform.as_ref(), records);
                if let Err(err) = &result {
                    error!("Chart '{}' ({}) skipped: {}", container_id, transform.name(), err);
                }
                ChartOutput {
                    kind: transform.kind(),
                    container_id: container_id.clone(),
                    result,
                }
            })
            .collect();

        debug!("Pipeline '{}' prepared {} charts from {} records", self.name, self.transforms.len(), records.len());

        ChartBundle { outputs }
    }

    fn run_one(transform: &dyn ChartTransform, records: &[RecordRef]) -> Result<DerivedChartData, ProcessingError> {
        let data = panic::catch_unwind(AssertUnwindSafe(|| transform.apply(records)))
            .map_err(|payload| ProcessingError::Panicked(panic_message(payload.as_ref())))??;

        if !data.is_finite() {
            return Err(ProcessingError::Degenerate(format!(
                "{} produced non-finite values",
                transform.name()
            )));
        }

        Ok(data)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
