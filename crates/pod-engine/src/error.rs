//! Error types for the POD engine.

use std::path::PathBuf;

use projection::ProjectionError;
use thiserror::Error;

/// Errors that can occur while loading slices or answering wind queries.
#[derive(Error, Debug)]
pub enum PodError {
    /// Dataset root missing, unreadable or misconfigured.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The dataset root holds no area with a valid height directory.
    #[error("no datasets found under {}, expected <area>/<height>m/*.npy", .0.display())]
    NoDatasetsFound(PathBuf),

    /// A named input array exists in neither its height-qualified nor its
    /// plain form.
    #[error("missing input file '{name}' for area '{area}' at {height}m")]
    MissingInputFile {
        name: String,
        area: String,
        height: u32,
    },

    /// A required array violates a size invariant.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// An array file exists but could not be parsed.
    #[error("failed to read {}: {message}", .path.display())]
    Read { path: PathBuf, message: String },

    /// A point index outside the slice was passed to the reconstructor.
    #[error("point index {index} out of bounds for slice of {len} points")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Query parameters outside their domain.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Background load task failed.
    #[error("slice load failed: {0}")]
    Load(String),

    /// Coordinate reprojection failed.
    #[error(transparent)]
    Projection(#[from] ProjectionError),
}

impl PodError {
    /// Create a Configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(msg: impl Into<String>) -> Self {
        Self::ShapeMismatch(msg.into())
    }

    /// Create a Read error.
    pub fn read(path: impl Into<PathBuf>, msg: impl ToString) -> Self {
        Self::Read {
            path: path.into(),
            message: msg.to_string(),
        }
    }

    /// Create a MissingInputFile error.
    pub fn missing_input(name: impl Into<String>, area: impl Into<String>, height: u32) -> Self {
        Self::MissingInputFile {
            name: name.into(),
            area: area.into(),
            height,
        }
    }
}

/// Result type for POD engine operations.
pub type Result<T> = std::result::Result<T, PodError>;
