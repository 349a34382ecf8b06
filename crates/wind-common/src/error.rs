//! Error types for the wind service transport.

use thiserror::Error;

/// Result type alias using WindError.
pub type WindResult<T> = Result<T, WindError>;

/// Errors surfaced to clients of the wind service.
#[derive(Debug, Error)]
pub enum WindError {
    // === Request Errors ===
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Invalid bbox: {0}")]
    InvalidBbox(String),

    #[error("Invalid CRS: {0}")]
    InvalidCrs(String),

    // === Data Errors ===
    #[error("Dataset not found: {0}")]
    DatasetNotFound(String),

    #[error("Height {height}m not available for dataset {dataset}")]
    HeightNotAvailable { dataset: String, height: u32 },

    #[error("Projection error: {0}")]
    ProjectionError(String),

    // === Infrastructure Errors ===
    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl WindError {
    /// Create an InvalidParameter error.
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            WindError::MissingParameter(_)
            | WindError::InvalidParameter { .. }
            | WindError::InvalidBbox(_)
            | WindError::InvalidCrs(_) => 400,

            WindError::DatasetNotFound(_) | WindError::HeightNotAvailable { .. } => 404,

            _ => 500,
        }
    }
}

impl From<std::io::Error> for WindError {
    fn from(err: std::io::Error) -> Self {
        WindError::InternalError(err.to_string())
    }
}
