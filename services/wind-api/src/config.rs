//! Service configuration loading.
//!
//! Everything comes from environment variables (optionally seeded from a
//! `.env` file by the binary). Grid limits may additionally be read from a
//! YAML file named by `WIND_LIMITS_FILE`.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use pod_engine::{PodEngineConfig, SourceKind};
use serde::{Deserialize, Serialize};
use wind_common::CrsCode;

/// Complete configuration of the wind service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Dataset root and source kind.
    pub engine: PodEngineConfig,

    /// CRS of the slice coordinates (`UWV_DATA_CRS`).
    pub data_crs: CrsCode,

    /// CRS of the resampled wind grid (`UWV_CRS_WIND`, defaults to the data CRS).
    pub wind_crs: CrsCode,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Reference wind speed used when a request omits `wsRef`.
    pub default_ws_ref: f64,

    /// Reference wind direction used when a request omits `wdRef`.
    pub default_wd_ref: f64,
}

impl ServiceConfig {
    /// Build a configuration directly, with default limits and references.
    pub fn new(engine: PodEngineConfig, data_crs: CrsCode) -> Self {
        Self {
            engine,
            data_crs,
            wind_crs: data_crs,
            limits: LimitsConfig::default(),
            default_ws_ref: 1.0,
            default_wd_ref: 0.0,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let engine = PodEngineConfig::from_env()?;

        let data_crs = parse_crs("UWV_DATA_CRS", &required("UWV_DATA_CRS")?)?;
        let wind_crs = match optional("UWV_CRS_WIND") {
            Some(value) => parse_crs("UWV_CRS_WIND", &value)?,
            None => data_crs,
        };

        let mut limits = match optional("WIND_LIMITS_FILE") {
            Some(path) => LimitsConfig::load_from_file(Path::new(&path))?,
            None => LimitsConfig::default(),
        };
        if let Some(dim) = parsed::<usize>("WIND_MAX_GRID_DIM")? {
            limits.max_grid_dim = dim;
        }
        if let Some(cells) = parsed::<usize>("WIND_MAX_GRID_CELLS")? {
            limits.max_grid_cells = cells;
        }

        let config = Self {
            engine,
            data_crs,
            wind_crs,
            limits,
            default_ws_ref: parsed("WIND_DEFAULT_WS_REF")?.unwrap_or(1.0),
            default_wd_ref: parsed("WIND_DEFAULT_WD_REF")?.unwrap_or(0.0),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check limits and default references.
    pub fn validate(&self) -> Result<()> {
        if self.limits.max_grid_dim == 0 || self.limits.max_grid_cells == 0 {
            return Err(anyhow!("grid limits must be positive: {:?}", self.limits));
        }
        if !(self.default_ws_ref.is_finite() && self.default_ws_ref > 0.0) {
            return Err(anyhow!(
                "WIND_DEFAULT_WS_REF must be a positive finite number, got {}",
                self.default_ws_ref
            ));
        }
        if !self.default_wd_ref.is_finite() {
            return Err(anyhow!(
                "WIND_DEFAULT_WD_REF must be finite, got {}",
                self.default_wd_ref
            ));
        }
        Ok(())
    }

    /// Dataset root directory.
    pub fn data_dir(&self) -> &PathBuf {
        &self.engine.data_dir
    }

    /// Configured data source kind.
    pub fn source(&self) -> SourceKind {
        self.engine.source
    }
}

/// Grid size limits for `/api/wind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum `nx` or `ny`.
    #[serde(default = "default_max_grid_dim")]
    pub max_grid_dim: usize,

    /// Maximum `nx * ny`.
    #[serde(default = "default_max_grid_cells")]
    pub max_grid_cells: usize,
}

fn default_max_grid_dim() -> usize {
    1024
}

fn default_max_grid_cells() -> usize {
    512 * 512
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_grid_dim: default_max_grid_dim(),
            max_grid_cells: default_max_grid_cells(),
        }
    }
}

impl LimitsConfig {
    /// Load limits from a YAML file, falling back to defaults when it is absent.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::warn!(
                "Limits file {} does not exist, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read: {:?}", path))?;
        serde_yaml::from_str(&content).with_context(|| format!("Failed to parse: {:?}", path))
    }
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

fn required(name: &str) -> Result<String> {
    optional(name).ok_or_else(|| anyhow!("Missing required environment variable: {}", name))
}

fn parsed<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    optional(name)
        .map(|value| {
            value
                .trim()
                .parse()
                .with_context(|| format!("Invalid value for {}: {}", name, value))
        })
        .transpose()
}

fn parse_crs(name: &str, value: &str) -> Result<CrsCode> {
    CrsCode::parse(value).with_context(|| format!("Invalid value for {}", name))
}
