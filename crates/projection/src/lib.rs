//! Coordinate reference system transformations.
//!
//! Implements the UTM projections used by wind datasets from scratch
//! without external dependencies.

pub mod transform;
pub mod transverse_mercator;

pub use transform::{CrsTransformer, ProjectionError};
pub use transverse_mercator::TransverseMercator;
