// Error handling utilities
// Author: Gabriel Demetrios Lafis

use thiserror::Error;

use crate::data::DataError;
use crate::processing::ProcessingError;
use crate::render::RenderError;
use crate::state::SnapshotError;

/// Application error type
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Dataset validation failed: {0}")]
    Validation(String),

    #[error("Failed to load dataset: {0}")]
    Load(DataError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid filter: {0}")]
    Filter(#[from] ProcessingError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("State snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DashboardError {
    /// Whether the user should be offered to try again
    pub fn is_retryable(&self) -> bool {
        matches!(self, DashboardError::Validation(_) | DashboardError::Load(_))
    }
}

impl From<DataError> for DashboardError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::ValidationError(msg) => DashboardError::Validation(msg),
            other => DashboardError::Load(other),
        }
    }
}

/// Result type alias for DashboardError
pub type DashboardResult<T> = Result<T, DashboardError>;
