//! POD wind-field engine.
//!
//! Reconstructs wind from a Proper Orthogonal Decomposition of CFD results
//! and resamples it onto regular grids:
//!
//! - **Slice Store**: lazy, load-once cache of per-(area, height) `.npy` data
//! - **Reconstructor**: `(Psi · A(wd) + Xmean) * ws` at selected points
//! - **Resampler**: bin averaging with toroidal neighbor infill
//! - **Service**: composes the three to answer gridded queries
//!
//! # Architecture
//!
//! ```text
//! WindFieldQuery
//!      │
//!      ▼
//! WindFieldService::answer
//!      │
//!      ├─► SliceStore::ensure_loaded(area, height)
//!      │         │
//!      │         ├─► Cache hit: shared Arc<HeightSlice>
//!      │         │
//!      │         └─► Cache miss: read .npy files (blocking pool), validate
//!      │
//!      ├─► Clip query box to slice extent, select points (rayon)
//!      │
//!      ├─► reconstruct(slice, indices, ws_ref, wd_ref)
//!      │
//!      └─► resample(points, effective box, nx, ny)
//!               │
//!               ▼
//!          GriddedWindField
//! ```

pub mod config;
pub mod error;
pub mod reconstruct;
pub mod resample;
pub mod service;
pub mod store;
pub mod testdata;
pub mod types;

// Re-export commonly used types at crate root
pub use config::{PodEngineConfig, SourceKind};
pub use error::{PodError, Result};
pub use reconstruct::{interpolate_periodic, reconstruct, PointVelocities};
pub use resample::{grid_cell_centers, resample, ResampledGrid, FILL_PASSES};
pub use service::WindFieldService;
pub use store::{HeightSlice, MeanFieldCheck, MeanFieldLayout, SliceStore};
pub use types::{
    AreaInfo, CacheStats, GridCoordinates, GriddedWindField, ResampleDiagnostics, ResampleMode,
    SliceKey, WindFieldPoints, WindFieldQuery,
};
