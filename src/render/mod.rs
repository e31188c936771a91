// Render module for the chart renderer contract
// Author: Gabriel Demetrios Lafis

mod dashboard;

pub use dashboard::*;

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::processing::{ChartKind, DerivedChartData};

/// Represents an error drawing a chart
#[derive(Debug)]
pub enum RenderError {
    UnknownContainer(String),
    NotSupported(String),
    Io(std::io::Error),
    Other(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RenderError::UnknownContainer(id) => write!(f, "Unknown chart container: {}", id),
            RenderError::NotSupported(msg) => write!(f, "Not supported: {}", msg),
            RenderError::Io(err) => write!(f, "IO error: {}", err),
            RenderError::Other(msg) => write!(f, "Render error: {}", msg),
        }
    }
}

impl Error for RenderError {}

impl From<std::io::Error> for RenderError {
    fn from(err: std::io::Error) -> Self {
        RenderError::Io(err)
    }
}

impl From<serde_json::Error> for RenderError {
    fn from(err: serde_json::Error) -> Self {
        RenderError::Other(err.to_string())
    }
}

/// Image format for chart exports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Svg,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }
}

/// Consumer of prepared chart data.
///
/// Implementations draw into named containers; the engine only hands them
/// data that is already shaped for the chart kind.
#[cfg_attr(test, mockall::automock)]
pub trait ChartRenderer {
    /// Draw a chart into an empty container
    fn render(&mut self, container_id: &str, data: &DerivedChartData, kind: ChartKind) -> Result<(), RenderError>;

    /// Replace the data of an already drawn chart
    fn update(&mut self, container_id: &str, data: &DerivedChartData, kind: ChartKind) -> Result<(), RenderError>;

    /// Remove whatever is drawn in a container
    fn clear(&mut self, container_id: &str) -> Result<(), RenderError>;

    /// Export a drawn chart as an image file
    fn export_image(&self, container_id: &str, format: ImageFormat) -> Result<PathBuf, RenderError>;
}

/// Renderer that writes one JSON document per container
pub struct FileRenderer {
    base_dir: PathBuf,
    rendered: BTreeMap<String, ChartKind>,
}

impl FileRenderer {
    /// Create a new file renderer, creating `base_dir` if needed
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, RenderError> {
        let base_dir = base_dir.as_ref().to_path_buf();

        if !base_dir.exists() {
            fs::create_dir_all(&base_dir)?;
        }

        Ok(FileRenderer {
            base_dir,
            rendered: BTreeMap::new(),
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Containers currently holding a chart
    pub fn rendered(&self) -> impl Iterator<Item = (&str, ChartKind)> {
        self.rendered.iter().map(|(id, kind)| (id.as_str(), *kind))
    }

    pub fn is_rendered(&self, container_id: &str) -> bool {
        self.rendered.contains_key(container_id)
    }

    /// Get the path for a container document
    pub fn path_for(&self, container_id: &str) -> PathBuf {
        let mut path = self.base_dir.clone();
        path.push(format!("{}.json", container_id));
        path
    }

    fn check_container(container_id: &str) -> Result<(), RenderError> {
        let valid = !container_id.is_empty()
            && container_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        if valid {
            Ok(())
        } else {
            Err(RenderError::UnknownContainer(container_id.to_string()))
        }
    }

    fn write(&mut self, container_id: &str, data: &DerivedChartData, kind: ChartKind) -> Result<(), RenderError> {
        Self::check_container(container_id)?;

        let document = serde_json::json!({
            "container_id": container_id,
            "chart_type": kind,
            "rendered_at": Utc::now().to_rfc3339(),
            "data": data,
        });

        let path = self.path_for(container_id);
        fs::write(&path, serde_json::to_string_pretty(&document)?)?;
        self.rendered.insert(container_id.to_string(), kind);

        debug!("Chart '{}' written to {}", kind, path.display());
        Ok(())
    }
}

impl ChartRenderer for FileRenderer {
    fn render(&mut self, container_id: &str, data: &DerivedChartData, kind: ChartKind) -> Result<(), RenderError> {
        self.write(container_id, data, kind)
    }

    fn update(&mut self, container_id: &str, data: &DerivedChartData, kind: ChartKind) -> Result<(), RenderError> {
        if !self.rendered.contains_key(container_id) {
            debug!("Container '{}' not drawn yet, rendering instead of updating", container_id);
        }
        self.write(container_id, data, kind)
    }

    fn clear(&mut self, container_id: &str) -> Result<(), RenderError> {
        if self.rendered.remove(container_id).is_some() {
            let path = self.path_for(container_id);
            if path.exists() {
                fs::remove_file(path)?;
            }
            info!("Chart container '{}' cleared", container_id);
        }
        Ok(())
    }

    fn export_image(&self, container_id: &str, format: ImageFormat) -> Result<PathBuf, RenderError> {
        if !self.rendered.contains_key(container_id) {
            return Err(RenderError::UnknownContainer(container_id.to_string()));
        }

        Err(RenderError::NotSupported(format!(
            "{} export from a file renderer",
            format.extension()
        )))
    }
}
