//! Wind query orchestration.
//!
//! The `WindFieldService` composes the slice store, the POD reconstructor and
//! the grid resampler to answer gridded wind field queries.
//!
//! # Example
//!
//! ```rust,ignore
//! use pod_engine::{WindFieldService, WindFieldQuery, PodEngineConfig};
//! use wind_common::BoundingBox;
//!
//! // Create service (typically at application startup)
//! let service = WindFieldService::from_config(&PodEngineConfig::from_env()?)?;
//!
//! // 64x64 grid at 100 m for a 10 m/s westerly reference wind
//! let bbox = BoundingBox::new(597_000.0, 6_642_000.0, 598_000.0, 6_643_000.0);
//! let query = WindFieldQuery::new("oslo", 100, bbox, 64, 64).with_reference(10.0, 270.0);
//! let field = service.answer(&query).await?;
//! ```

use std::time::Instant;

use metrics::{counter, histogram};
use projection::CrsTransformer;
use wind_common::BoundingBox;

use crate::config::PodEngineConfig;
use crate::error::Result;
use crate::reconstruct::reconstruct;
use crate::resample::{grid_cell_centers, resample, speed_range, ResampledGrid};
use crate::store::{HeightSlice, SliceStore};
use crate::types::{
    AreaInfo, CacheStats, GridCoordinates, GriddedWindField, ResampleMode, WindFieldPoints,
    WindFieldQuery,
};

/// High-level service answering wind field queries.
///
/// Owns the [`SliceStore`] and therefore the slice cache; share it behind an
/// `Arc` across request handlers.
pub struct WindFieldService {
    store: SliceStore,
}

impl WindFieldService {
    /// Create a service over an opened store.
    pub fn new(store: SliceStore) -> Self {
        Self { store }
    }

    /// Validate the configuration and open its dataset root.
    pub fn from_config(config: &PodEngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(SliceStore::open(&config.data_dir)?))
    }

    /// The underlying slice store.
    pub fn store(&self) -> &SliceStore {
        &self.store
    }

    /// Discovered areas, loading the first height slice of each.
    pub async fn list_areas(&self) -> Result<Vec<AreaInfo>> {
        self.store.list_areas().await
    }

    /// Get slice cache statistics.
    pub async fn cache_stats(&self) -> CacheStats {
        self.store.cache_stats().await
    }

    /// Answer a gridded wind field query.
    ///
    /// The query box is clipped to the slice extent; a box that misses the
    /// extent entirely is replaced by the full extent. An empty selection
    /// yields an all-NaN grid in `no_points` mode.
    pub async fn answer(&self, query: &WindFieldQuery) -> Result<GriddedWindField> {
        query.validate()?;
        let start = Instant::now();

        let slice = self.store.ensure_loaded(&query.area, query.height).await?;
        let (effective_bbox, indices) = select(&slice, &query.bbox);

        let field = if indices.is_empty() {
            let grid = ResampledGrid::empty(query.nx, query.ny, ResampleMode::NoPoints);
            GriddedWindField {
                nx: query.nx,
                ny: query.ny,
                u: grid.u,
                v: grid.v,
                speed_min: f32::NAN,
                speed_max: f32::NAN,
                diagnostics: grid.diagnostics,
                subset_points: 0,
                effective_bbox,
                coordinates: None,
            }
        } else {
            let points = points_at(&slice, &indices, query.ws_ref, query.wd_ref)?;
            let grid = resample(&points, &effective_bbox, query.nx, query.ny);
            let (speed_min, speed_max) = speed_range(&grid.u, &grid.v);
            GriddedWindField {
                nx: grid.nx,
                ny: grid.ny,
                u: grid.u,
                v: grid.v,
                speed_min,
                speed_max,
                diagnostics: grid.diagnostics,
                subset_points: indices.len(),
                effective_bbox,
                coordinates: None,
            }
        };

        let elapsed = start.elapsed();
        counter!("wind_queries_total", "mode" => field.diagnostics.mode.as_str()).increment(1);
        histogram!("wind_query_duration_seconds").record(elapsed.as_secs_f64());

        tracing::info!(
            area = %query.area,
            height = query.height,
            nx = query.nx,
            ny = query.ny,
            subset_points = field.subset_points,
            points_used = field.diagnostics.points_used,
            mode = field.diagnostics.mode.as_str(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Answered wind query"
        );

        Ok(field)
    }

    /// Reconstructed wind at the slice points inside the query's effective
    /// box, without resampling. `nx` and `ny` are validated but do not shape
    /// the result.
    pub async fn points(&self, query: &WindFieldQuery) -> Result<WindFieldPoints> {
        query.validate()?;
        let slice = self.store.ensure_loaded(&query.area, query.height).await?;
        let (_, indices) = select(&slice, &query.bbox);
        points_at(&slice, &indices, query.ws_ref, query.wd_ref)
    }

    /// Attach cell-center coordinates of the field's effective box,
    /// reprojected by `transformer` (typically wind CRS to WGS84).
    pub fn attach_coordinates(
        &self,
        field: &mut GriddedWindField,
        transformer: &CrsTransformer,
    ) -> Result<()> {
        let centers = grid_cell_centers(&field.effective_bbox, field.nx, field.ny);
        let projected = transformer.transform_points(&centers)?;

        let (lon, lat) = projected
            .into_iter()
            .map(|(lon, lat)| (lon as f32, lat as f32))
            .unzip();
        field.coordinates = Some(GridCoordinates { lon, lat });
        Ok(())
    }
}

/// Effective box and the indices of the slice points inside it.
fn select(slice: &HeightSlice, bbox: &BoundingBox) -> (BoundingBox, Vec<usize>) {
    let extent = slice.extent();
    let effective = bbox.intersection(&extent).unwrap_or_else(|| {
        tracing::debug!(?bbox, ?extent, "Query box misses slice extent, using full extent");
        extent
    });
    let indices = slice.select_points(&effective);
    (effective, indices)
}

fn points_at(
    slice: &HeightSlice,
    indices: &[usize],
    ws_ref: f64,
    wd_ref: f64,
) -> Result<WindFieldPoints> {
    let velocities = reconstruct(slice, indices, ws_ref, wd_ref)?;
    Ok(WindFieldPoints {
        x: indices.iter().map(|&i| slice.x()[i]).collect(),
        y: indices.iter().map(|&i| slice.y()[i]).collect(),
        u: velocities.u,
        v: velocities.v,
        w: velocities.w,
    })
}
