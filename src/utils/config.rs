// Configuration utilities
// Author: Gabriel Demetrios Lafis

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::data::DEFAULT_MIN_ROWS_WARNING;
use crate::processing::{ChartSettings, FilterState, Selection};
use super::{validate_not_empty, validate_positive, validate_range, DashboardError};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub filters: FilterState,
    pub debounce: DebounceConfig,
    pub charts: ChartSettings,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

/// Dataset configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub source: Option<String>,
    pub array_path: Option<String>,
    pub min_rows_warning: usize,
}

/// Debounce configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebounceConfig {
    pub delay_ms: u64,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: String,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            source: None,
            array_path: None,
            min_rows_warning: DEFAULT_MIN_ROWS_WARNING,
        }
    }
}

impl Default for DebounceConfig {
    fn default() -> Self {
        DebounceConfig { delay_ms: 300 }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            dir: "./output".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl DebounceConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Config {
    /// Load configuration from a `.json`, `.yaml` or `.yml` file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DashboardError> {
        let path = path.as_ref();
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config: Config = if path.extension().map_or(false, |ext| ext == "json") {
            serde_json::from_str(&contents)
                .map_err(|e| DashboardError::Config(format!("{}: {}", path.display(), e)))?
        } else if path.extension().map_or(false, |ext| ext == "yaml" || ext == "yml") {
            serde_yaml::from_str(&contents)
                .map_err(|e| DashboardError::Config(format!("{}: {}", path.display(), e)))?
        } else {
            return Err(DashboardError::Config(format!(
                "Unsupported config file format: {}",
                path.display()
            )));
        };

        config.validate()?;
        Ok(config)
    }

    /// Check values that would make the dashboard misbehave
    pub fn validate(&self) -> Result<(), DashboardError> {
        let charts = &self.charts;
        let checks = [
            validate_positive(charts.kde_grid_points, "charts.kde_grid_points"),
            validate_positive(charts.top_conditions, "charts.top_conditions"),
            validate_positive(charts.pareto_top, "charts.pareto_top"),
            validate_not_empty(&charts.pareto_group_by, "charts.pareto_group_by"),
            validate_not_empty(&charts.pareto_value, "charts.pareto_value"),
            validate_not_empty(&charts.kde_column, "charts.kde_column"),
            validate_not_empty(&self.output.dir, "output.dir"),
        ];

        for check in checks {
            check.map_err(DashboardError::Config)?;
        }

        if let Selection::Only(month) = self.filters.month {
            validate_range(month, 1, 12, "filters.month").map_err(DashboardError::Config)?;
        }

        if self.filters.temp_min > self.filters.temp_max {
            return Err(DashboardError::Config(
                "filters.temp_min must not exceed filters.temp_max".to_string(),
            ));
        }

        Ok(())
    }

    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(&self.output.dir)
    }

    /// Get the log level filter
    pub fn log_level_filter(&self) -> log::LevelFilter {
        match self.logging.level.to_lowercase().as_str() {
            "off" => log::LevelFilter::Off,
            "error" => log::LevelFilter::Error,
            "warn" => log::LevelFilter::Warn,
            "info" => log::LevelFilter::Info,
            "debug" => log::LevelFilter::Debug,
            "trace" => log::LevelFilter::Trace,
            _ => log::LevelFilter::Info,
        }
    }
}
