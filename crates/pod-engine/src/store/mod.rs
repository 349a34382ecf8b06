//! Slice Store: discovery, loading and caching of per-height POD data.
//!
//! Dataset layout:
//!
//! ```text
//! {root}/{area}/{height}m/{x|y|z|Psi|Xmean|A|wdNorm}[_{height}].npy
//! ```

mod cache;
pub mod discovery;
pub mod npy;
mod slice;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

pub use cache::SliceCache;
pub use discovery::{
    discover_areas, find_height_dir, parse_height_dir, validate_area_id, DiscoveredArea,
};
pub use npy::{reconcile_mean_field, MeanFieldCheck, MeanFieldLayout, NpyArray};
pub use slice::{HeightSlice, SliceArrays};

use crate::error::{PodError, Result};
use crate::types::{AreaInfo, CacheStats, SliceKey};

/// Loads height slices from a dataset root on first use and keeps them for
/// the lifetime of the store.
pub struct SliceStore {
    root: PathBuf,
    cache: SliceCache,
}

impl SliceStore {
    /// Open a store over `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(PodError::configuration(format!(
                "UWV_DATA_DIR does not exist or is not a directory: {}",
                root.display()
            )));
        }
        Ok(Self {
            root,
            cache: SliceCache::new(),
        })
    }

    /// Dataset root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Return the slice for (area, height), loading it on first use.
    ///
    /// Concurrent callers for the same key wait on one load. Non-canonical
    /// height directory names such as `070m` resolve to the same key.
    pub async fn ensure_loaded(&self, area: &str, height: u32) -> Result<Arc<HeightSlice>> {
        validate_area_id(area)?;
        let key = SliceKey::new(area, height);
        let area_dir = self.root.join(area);

        self.cache
            .get_or_load(&key, || async move {
                let area = area.to_string();
                tokio::task::spawn_blocking(move || {
                    let dir = find_height_dir(&area_dir, height)?
                        .unwrap_or_else(|| area_dir.join(format!("{}m", height)));
                    load_slice(&dir, &area, height)
                })
                .await
                .map_err(|e| PodError::Load(e.to_string()))?
            })
            .await
    }

    /// Areas with at least one height, with numerically sorted heights and
    /// the extent of the first discovered height.
    ///
    /// Loads (and caches) the first height slice of every area.
    pub async fn list_areas(&self) -> Result<Vec<AreaInfo>> {
        let root = self.root.clone();
        let discovered = tokio::task::spawn_blocking(move || discover_areas(&root))
            .await
            .map_err(|e| PodError::Load(e.to_string()))??;

        let mut areas = Vec::with_capacity(discovered.len());
        for area in discovered {
            let first = area.heights[0];
            let slice = self.ensure_loaded(&area.id, first).await?;

            let mut heights = area.heights.clone();
            heights.sort_unstable();
            heights.dedup();

            areas.push(AreaInfo {
                name: format!("{} (NPY/POD filesystem)", area.id),
                id: area.id,
                heights,
                extent: slice.extent(),
            });
        }

        if areas.is_empty() {
            return Err(PodError::NoDatasetsFound(self.root.clone()));
        }
        Ok(areas)
    }

    /// Get cache statistics.
    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    /// Check whether a slice is resident.
    pub async fn is_loaded(&self, area: &str, height: u32) -> bool {
        self.cache.contains(&SliceKey::new(area, height)).await
    }
}

/// Read, validate and assemble one slice. Blocking.
pub fn load_slice(dir: &Path, area: &str, height: u32) -> Result<HeightSlice> {
    let start = Instant::now();

    let load = |name: &str| npy::load_input(dir, area, name, height);
    let arrays = SliceArrays {
        x: load("x")?,
        y: load("y")?,
        z: load("z")?,
        coefficients: load("A")?,
        directions: load("wdNorm")?,
        mean: load("Xmean")?,
        psi: load("Psi")?,
    };

    let slice = HeightSlice::from_arrays(arrays)?;

    tracing::info!(
        area = %area,
        height = height,
        points = slice.len(),
        modes = slice.mode_count(),
        directions = slice.direction_count(),
        mean_layout = ?slice.mean_field_layout(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Loaded height slice"
    );

    Ok(slice)
}
