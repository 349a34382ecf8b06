//! Configuration for the POD engine.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{PodError, Result};

/// Configuration for the wind field engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodEngineConfig {
    /// Root directory laid out as `<area>/<height>m/*.npy`.
    pub data_dir: PathBuf,

    /// Kind of data source behind the root.
    pub source: SourceKind,
}

impl PodEngineConfig {
    /// Create a configuration for an NPY/POD dataset root.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            source: SourceKind::NpyPod,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Both `UWV_DATA_DIR` and `UWV_SOURCE` are required.
    pub fn from_env() -> Result<Self> {
        let data_dir = require_env("UWV_DATA_DIR")?;
        let source = SourceKind::parse(&require_env("UWV_SOURCE")?)?;

        Ok(Self {
            data_dir: PathBuf::from(data_dir),
            source,
        })
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.data_dir.is_dir() {
            return Err(PodError::configuration(format!(
                "UWV_DATA_DIR does not exist or is not a directory: {}",
                self.data_dir.display()
            )));
        }
        Ok(())
    }
}

fn require_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(PodError::configuration(format!(
            "Missing required environment variable: {}",
            name
        ))),
    }
}

/// Supported data source kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Per-height `.npy` arrays of a POD decomposition.
    NpyPod,
}

impl SourceKind {
    /// Parse a source kind, rejecting unknown names.
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim() {
            "npy_pod" => Ok(Self::NpyPod),
            other => Err(PodError::configuration(format!(
                "Unsupported UWV_SOURCE='{}'. Supported: npy_pod",
                other
            ))),
        }
    }

    /// Get the source name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NpyPod => "npy_pod",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_kind_parse() {
        assert_eq!(SourceKind::parse("npy_pod").unwrap(), SourceKind::NpyPod);
        assert_eq!(SourceKind::NpyPod.to_string(), "npy_pod");

        let err = SourceKind::parse("zarr").unwrap_err();
        assert!(err.to_string().contains("Unsupported UWV_SOURCE='zarr'"));
    }

    #[test]
    fn test_validate_requires_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(PodEngineConfig::new(dir.path()).validate().is_ok());

        let missing = PodEngineConfig::new(dir.path().join("nope"));
        assert!(matches!(
            missing.validate(),
            Err(PodError::Configuration(_))
        ));
    }
}
