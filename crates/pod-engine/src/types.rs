//! Core types for wind field queries and results.

use serde::{Deserialize, Serialize};
use wind_common::BoundingBox;

use crate::error::{PodError, Result};

/// Cache key for a height slice: (area id, height in meters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SliceKey {
    pub area: String,
    pub height: u32,
}

impl SliceKey {
    pub fn new(area: impl Into<String>, height: u32) -> Self {
        Self {
            area: area.into(),
            height,
        }
    }
}

impl std::fmt::Display for SliceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}m", self.area, self.height)
    }
}

/// Metadata describing one discovered area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaInfo {
    /// Area id (directory name).
    pub id: String,
    /// Human readable name.
    pub name: String,
    /// Available heights in meters, ascending.
    pub heights: Vec<u32>,
    /// Extent of the first discovered height slice, in the data CRS.
    pub extent: BoundingBox,
}

/// A gridded wind field request.
#[derive(Debug, Clone, PartialEq)]
pub struct WindFieldQuery {
    /// Area id.
    pub area: String,
    /// Height level in meters.
    pub height: u32,
    /// Requested box in the data CRS.
    pub bbox: BoundingBox,
    /// Grid columns.
    pub nx: usize,
    /// Grid rows.
    pub ny: usize,
    /// Reference wind speed (m/s).
    pub ws_ref: f64,
    /// Reference wind direction (degrees, any real value).
    pub wd_ref: f64,
}

impl WindFieldQuery {
    /// Create a query with unit reference speed and zero reference direction.
    pub fn new(area: impl Into<String>, height: u32, bbox: BoundingBox, nx: usize, ny: usize) -> Self {
        Self {
            area: area.into(),
            height,
            bbox,
            nx,
            ny,
            ws_ref: 1.0,
            wd_ref: 0.0,
        }
    }

    /// Set the reference wind conditions.
    pub fn with_reference(mut self, ws_ref: f64, wd_ref: f64) -> Self {
        self.ws_ref = ws_ref;
        self.wd_ref = wd_ref;
        self
    }

    /// Slice key addressed by this query.
    pub fn key(&self) -> SliceKey {
        SliceKey::new(self.area.clone(), self.height)
    }

    /// Check grid resolution and reference conditions.
    pub fn validate(&self) -> Result<()> {
        if self.nx == 0 || self.ny == 0 {
            return Err(PodError::InvalidQuery(format!(
                "grid resolution must be at least 1x1, got {}x{}",
                self.nx, self.ny
            )));
        }
        if !(self.ws_ref.is_finite() && self.ws_ref > 0.0) {
            return Err(PodError::InvalidQuery(format!(
                "ws_ref must be a positive finite number, got {}",
                self.ws_ref
            )));
        }
        if !self.wd_ref.is_finite() {
            return Err(PodError::InvalidQuery(format!(
                "wd_ref must be finite, got {}",
                self.wd_ref
            )));
        }
        Ok(())
    }
}

/// How a grid was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResampleMode {
    /// Cell averages with nearest-neighbor infill.
    BinAverageNnFill,
    /// The resampling box had no area.
    InvalidBbox,
    /// No slice point fell inside the effective box.
    NoPoints,
}

impl ResampleMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BinAverageNnFill => "bin_average_nn_fill",
            Self::InvalidBbox => "invalid_bbox",
            Self::NoPoints => "no_points",
        }
    }
}

/// Counters describing one resampling run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResampleDiagnostics {
    pub mode: ResampleMode,
    /// Samples that landed inside the grid.
    pub points_used: usize,
    /// Cells without any sample before infill.
    pub empty_cells_initial: usize,
}

impl ResampleDiagnostics {
    /// Diagnostics for a grid that received no samples.
    pub fn empty(mode: ResampleMode, cells: usize) -> Self {
        Self {
            mode,
            points_used: 0,
            empty_cells_initial: cells,
        }
    }
}

/// Scattered wind samples at slice points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WindFieldPoints {
    pub x: Vec<f32>,
    pub y: Vec<f32>,
    pub u: Vec<f32>,
    pub v: Vec<f32>,
    pub w: Vec<f32>,
}

impl WindFieldPoints {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Longitude/latitude of every grid cell center, row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridCoordinates {
    pub lon: Vec<f32>,
    pub lat: Vec<f32>,
}

/// A wind field resampled onto a regular grid.
///
/// `u` and `v` hold `ny` rows of `nx` cells each, row 0 at the minimum y of
/// `effective_bbox`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GriddedWindField {
    pub nx: usize,
    pub ny: usize,
    pub u: Vec<f32>,
    pub v: Vec<f32>,
    /// Minimum speed over finite cells, NaN when none is finite.
    pub speed_min: f32,
    /// Maximum speed over finite cells, NaN when none is finite.
    pub speed_max: f32,
    pub diagnostics: ResampleDiagnostics,
    /// Slice points selected by the effective box.
    pub subset_points: usize,
    /// Box actually resampled, in the data CRS.
    pub effective_bbox: BoundingBox,
    /// Cell-center coordinates, when requested.
    pub coordinates: Option<GridCoordinates>,
}

impl GriddedWindField {
    /// Number of grid cells.
    pub fn cells(&self) -> usize {
        self.nx * self.ny
    }

    /// `(u, v)` at a grid cell.
    pub fn at(&self, row: usize, col: usize) -> Option<(f32, f32)> {
        if row >= self.ny || col >= self.nx {
            return None;
        }
        let i = row * self.nx + col;
        Some((self.u[i], self.v[i]))
    }
}

/// Slice cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Completed slice loads.
    pub loads: u64,
    /// Resident slices.
    pub entries: usize,
}

impl CacheStats {
    /// Hit rate as a percentage.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_validation() {
        let bbox = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        assert!(WindFieldQuery::new("a", 10, bbox, 2, 2).validate().is_ok());
        assert!(WindFieldQuery::new("a", 10, bbox, 0, 2).validate().is_err());
        assert!(WindFieldQuery::new("a", 10, bbox, 2, 2)
            .with_reference(0.0, 0.0)
            .validate()
            .is_err());
        assert!(WindFieldQuery::new("a", 10, bbox, 2, 2)
            .with_reference(1.0, f64::NAN)
            .validate()
            .is_err());
        // Any finite direction is accepted
        assert!(WindFieldQuery::new("a", 10, bbox, 2, 2)
            .with_reference(3.0, -725.0)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_mode_serialization() {
        let json = serde_json::to_string(&ResampleMode::BinAverageNnFill).unwrap();
        assert_eq!(json, "\"bin_average_nn_fill\"");
        assert_eq!(ResampleMode::NoPoints.as_str(), "no_points");
    }

    #[test]
    fn test_cache_hit_rate() {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            loads: 1,
            entries: 1,
        };
        assert_eq!(stats.hit_rate(), 75.0);
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }

    #[test]
    fn test_slice_key_display() {
        assert_eq!(SliceKey::new("oslo", 100).to_string(), "oslo/100m");
    }
}
