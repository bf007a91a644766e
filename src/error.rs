use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlotError {
    #[error("input not found: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("no .txt files found in {}", .0.display())]
    NoInputFiles(PathBuf),

    #[error("no complete comparison groups found in {}", .0.display())]
    NoGroups(PathBuf),

    #[error("no valid data rows in {source_name} ({skipped} malformed rows skipped)")]
    NoData { source_name: String, skipped: usize },

    #[error("io error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not render chart {}: {message}", .path.display())]
    Render { path: PathBuf, message: String },
}

impl PlotError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PlotError::Io {
            path: path.into(),
            source,
        }
    }

    /// wraps any plotters backend or drawing area error
    pub fn render<E: std::fmt::Display>(path: impl Into<PathBuf>, e: E) -> Self {
        PlotError::Render {
            path: path.into(),
            message: e.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PlotError>;
