//! Point and bounding box reprojection between supported CRSs.

use thiserror::Error;
use wind_common::{BoundingBox, CrsCode};

use crate::transverse_mercator::TransverseMercator;

/// Errors raised while reprojecting coordinates.
#[derive(Debug, Error, PartialEq)]
pub enum ProjectionError {
    /// Input coordinate is NaN or infinite.
    #[error("non-finite coordinate ({x}, {y})")]
    NonFinite { x: f64, y: f64 },

    /// Latitude outside [-90, 90].
    #[error("latitude {0} outside [-90, 90]")]
    LatitudeOutOfRange(f64),
}

/// Reprojects coordinates from a source CRS into a target CRS.
///
/// Geographic coordinates are always (lon, lat) in degrees, projected ones
/// (easting, northing) in meters.
#[derive(Debug, Clone)]
pub struct CrsTransformer {
    source: CrsCode,
    target: CrsCode,
    source_utm: Option<TransverseMercator>,
    target_utm: Option<TransverseMercator>,
}

impl CrsTransformer {
    /// Create a transformer from `source` to `target`.
    pub fn new(source: CrsCode, target: CrsCode) -> Self {
        Self {
            source,
            target,
            source_utm: utm_for(source),
            target_utm: utm_for(target),
        }
    }

    /// Source CRS.
    pub fn source(&self) -> CrsCode {
        self.source
    }

    /// Target CRS.
    pub fn target(&self) -> CrsCode {
        self.target
    }

    /// Transformer performing the opposite conversion.
    pub fn inverse(&self) -> Self {
        Self::new(self.target, self.source)
    }

    /// Reproject a single point.
    pub fn transform_point(&self, x: f64, y: f64) -> Result<(f64, f64), ProjectionError> {
        if !x.is_finite() || !y.is_finite() {
            return Err(ProjectionError::NonFinite { x, y });
        }

        if self.source == self.target {
            return Ok((x, y));
        }

        let (lon, lat) = match &self.source_utm {
            Some(tm) => tm.inverse(x, y),
            None => (x, y),
        };

        if !(-90.0..=90.0).contains(&lat) {
            return Err(ProjectionError::LatitudeOutOfRange(lat));
        }

        Ok(match &self.target_utm {
            Some(tm) => tm.forward(lon, lat),
            None => (lon, lat),
        })
    }

    /// Reproject a batch of points, failing on the first bad coordinate.
    pub fn transform_points(
        &self,
        points: &[(f64, f64)],
    ) -> Result<Vec<(f64, f64)>, ProjectionError> {
        points
            .iter()
            .map(|&(x, y)| self.transform_point(x, y))
            .collect()
    }

    /// Reproject a bounding box by transforming its four corners and taking
    /// the enclosing min/max.
    pub fn transform_bbox(&self, bbox: &BoundingBox) -> Result<BoundingBox, ProjectionError> {
        let corners = self.transform_points(&bbox.corners())?;
        // Four corners are always present
        Ok(BoundingBox::from_points(corners).unwrap_or(*bbox))
    }
}

fn utm_for(crs: CrsCode) -> Option<TransverseMercator> {
    match crs {
        CrsCode::Wgs84 => None,
        CrsCode::Utm { zone, north } => Some(TransverseMercator::utm(zone, north)),
    }
}
