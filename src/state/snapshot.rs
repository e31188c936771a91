// Export and import of the user-facing dashboard state
// Author: Gabriel Demetrios Lafis

use std::error::Error;
use std::fmt;

use chrono::{DateTime, Utc};
use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::data::{DatasetMetadata, SpecialInfo};
use crate::processing::{FilterState, FilterUpdate, ProcessingError};
use super::{StateCoordinator, WeatherStats};

/// Serialized form of the dashboard state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    #[serde(default)]
    pub filters: FilterState,
    #[serde(default)]
    pub ui: SnapshotUi,
    #[serde(default)]
    pub weather_stats: WeatherStats,
    #[serde(default)]
    pub metadata: Option<SnapshotMetadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotUi {
    #[serde(default)]
    pub current_section: String,
}

/// Subset of the dataset metadata kept in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub total_rows: usize,
    pub total_columns: usize,
    pub loaded_at: DateTime<Utc>,
    pub special_info: SpecialInfo,
}

impl From<&DatasetMetadata> for SnapshotMetadata {
    fn from(metadata: &DatasetMetadata) -> Self {
        SnapshotMetadata {
            total_rows: metadata.total_rows,
            total_columns: metadata.total_columns,
            loaded_at: metadata.loaded_at,
            special_info: metadata.special_info.clone(),
        }
    }
}

/// Represents an error exporting or importing a snapshot
#[derive(Debug)]
pub enum SnapshotError {
    Json(serde_json::Error),
    Filters(ProcessingError),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SnapshotError::Json(err) => write!(f, "Invalid state document: {}", err),
            SnapshotError::Filters(err) => write!(f, "Invalid filters in state document: {}", err),
        }
    }
}

impl Error for SnapshotError {}

impl From<serde_json::Error> for SnapshotError {
    fn from(err: serde_json::Error) -> Self {
        SnapshotError::Json(err)
    }
}

impl From<ProcessingError> for SnapshotError {
    fn from(err: ProcessingError) -> Self {
        SnapshotError::Filters(err)
    }
}

impl StateCoordinator {
    /// Capture filters, section, statistics and dataset facts
    pub fn snapshot(&self) -> StateSnapshot {
        let state = self.state();
        StateSnapshot {
            filters: state.filters.clone(),
            ui: SnapshotUi {
                current_section: state.ui.current_section.clone(),
            },
            weather_stats: state.weather_stats.clone(),
            metadata: state.dataset.as_ref().map(|d| SnapshotMetadata::from(&d.metadata)),
        }
    }

    /// Pretty-printed JSON of `snapshot()`
    pub fn export_state(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }

    /// Restore filters and section from an exported document.
    ///
    /// Failures are recorded as the UI error before being returned.
    pub fn import_state(&mut self, json: &str) -> Result<(), SnapshotError> {
        match self.apply_snapshot_json(json) {
            Ok(()) => {
                info!("Dashboard state imported");
                Ok(())
            },
            Err(err) => {
                error!("Failed to import dashboard state: {}", err);
                self.set_error("Failed to import dashboard configuration");
                Err(err)
            },
        }
    }

    fn apply_snapshot_json(&mut self, json: &str) -> Result<(), SnapshotError> {
        let snapshot: StateSnapshot = serde_json::from_str(json)?;

        self.update_filters(&FilterUpdate::replace_with(&snapshot.filters))?;

        if !snapshot.ui.current_section.is_empty() {
            self.set_current_section(&snapshot.ui.current_section);
        }

        Ok(())
    }
}
