//! Application state for the wind API.

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusHandle;
use pod_engine::{AreaInfo, WindFieldService};
use projection::CrsTransformer;
use wind_common::CrsCode;

use crate::config::ServiceConfig;

/// Shared application state.
pub struct AppState {
    /// Service configuration.
    pub config: ServiceConfig,

    /// Wind field engine, owning the slice cache.
    pub service: WindFieldService,

    /// Areas discovered at startup.
    pub catalog: Vec<AreaInfo>,

    /// WGS84 to data CRS, for request boxes.
    pub lonlat_to_data: CrsTransformer,

    /// Data CRS to WGS84, for extents and effective boxes.
    pub data_to_lonlat: CrsTransformer,

    /// Wind grid CRS to WGS84, for cell-center coordinates.
    pub wind_to_lonlat: CrsTransformer,

    /// Prometheus recorder handle, when one is installed.
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    /// Open the dataset root and discover its areas.
    pub async fn new(config: ServiceConfig, prometheus: Option<PrometheusHandle>) -> Result<Self> {
        let service = WindFieldService::from_config(&config.engine)
            .context("Failed to open wind dataset root")?;
        let catalog = service
            .list_areas()
            .await
            .context("Failed to discover wind datasets")?;

        tracing::info!(
            data_dir = %config.data_dir().display(),
            source = %config.source(),
            data_crs = %config.data_crs,
            wind_crs = %config.wind_crs,
            areas = catalog.len(),
            "Wind datasets discovered"
        );

        Ok(Self {
            lonlat_to_data: CrsTransformer::new(CrsCode::Wgs84, config.data_crs),
            data_to_lonlat: CrsTransformer::new(config.data_crs, CrsCode::Wgs84),
            wind_to_lonlat: CrsTransformer::new(config.wind_crs, CrsCode::Wgs84),
            config,
            service,
            catalog,
            prometheus,
        })
    }

    /// Create state from environment configuration.
    pub async fn from_env(prometheus: Option<PrometheusHandle>) -> Result<Self> {
        let config = ServiceConfig::from_env()?;
        Self::new(config, prometheus).await
    }

    /// Look up a discovered area by id.
    pub fn find_area(&self, id: &str) -> Option<&AreaInfo> {
        self.catalog.iter().find(|area| area.id == id)
    }
}
