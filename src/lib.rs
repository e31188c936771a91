// Weather Dashboard Engine
// Author: Gabriel Demetrios Lafis

//! # Weather Dashboard Engine
//!
//! Aggregation, statistics and filter propagation for an interactive
//! weather dashboard.
//!
//! ## Features
//!
//! - Loading, validation and enrichment of flat weather records (JSON)
//! - Twelve chart transforms: grouped series, hierarchies, flow graphs,
//!   correlation matrices, Pareto series and kernel density curves
//! - Filter engine with IQR outlier removal
//! - State coordinator with typed events and debounced filter changes
//! - Chart renderer contract with a file-backed renderer
//! - CSV export, Markdown report and state snapshots
//!
//! ## Example
//!
//! ```rust
//! use weather_dashboard_engine::{
//!     data::{DatasetLoader, SyntheticSource},
//!     processing::{ChartKind, ChartPipeline, ChartSettings, FilterUpdate, Selection},
//!     state::StateCoordinator,
//! };
//!
//! // Load a generated dataset
//! let dataset = DatasetLoader::new().load(&SyntheticSource::new(42, 500)).unwrap();
//!
//! // Create a coordinator running every standard chart
//! let mut coordinator = StateCoordinator::new(ChartPipeline::standard(&ChartSettings::default()));
//! coordinator.set_dataset(dataset);
//!
//! // Narrow the view to March
//! coordinator.update_filters(&FilterUpdate::default().month(Selection::Only(3))).unwrap();
//!
//! assert!(coordinator.filtered_records().len() < 500);
//! assert!(coordinator.charts().get(ChartKind::Combined).is_some());
//! ```

pub mod data;
pub mod processing;
pub mod render;
pub mod state;
pub mod utils;

// Re-export main types
pub use data::{DataSet, DatasetLoader, RecordRef, WeatherRecord};
pub use processing::{ChartKind, ChartPipeline, DerivedChartData, FilterEngine, FilterState, FilterUpdate};
pub use render::{ChartRenderer, Dashboard, FileRenderer};
pub use state::StateCoordinator;
pub use utils::{Config, DashboardError};
