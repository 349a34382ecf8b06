//! HTTP request handlers for the wind API.

pub mod datasets;
pub mod health;
pub mod wind;

use serde::{Deserialize, Serialize};
use wind_common::BoundingBox;

/// Geographic box as exchanged with clients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LonLatBox {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl From<BoundingBox> for LonLatBox {
    fn from(bbox: BoundingBox) -> Self {
        Self {
            min_lon: bbox.min_x,
            max_lon: bbox.max_x,
            min_lat: bbox.min_y,
            max_lat: bbox.max_y,
        }
    }
}

impl From<LonLatBox> for BoundingBox {
    fn from(b: LonLatBox) -> Self {
        BoundingBox::new(b.min_lon, b.min_lat, b.max_lon, b.max_lat)
    }
}
