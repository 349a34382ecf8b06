//! Common types shared by the wind field engine and its HTTP service.

pub mod bbox;
pub mod crs;
pub mod error;

pub use bbox::BoundingBox;
pub use crs::CrsCode;
pub use error::{WindError, WindResult};
