//! Dataset catalog handler.

use std::sync::Arc;

use axum::{extract::Extension, Json};
use metrics::counter;
use serde::Serialize;

use super::LonLatBox;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetInfo {
    pub id: String,
    pub name: String,
    pub dataset_extent: LonLatBox,
    pub available_heights_meters: Vec<u32>,
}

/// GET /api/datasets - Discovered areas with their WGS84 extent
pub async fn list_datasets_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<DatasetInfo>>, ApiError> {
    counter!("wind_api_requests_total", "endpoint" => "datasets").increment(1);

    let datasets = state
        .catalog
        .iter()
        .map(|area| -> Result<DatasetInfo, ApiError> {
            let extent = state
                .data_to_lonlat
                .transform_bbox(&area.extent)
                .map_err(pod_engine::PodError::from)?;
            Ok(DatasetInfo {
                id: area.id.clone(),
                name: area.name.clone(),
                dataset_extent: extent.into(),
                available_heights_meters: area.heights.clone(),
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    Ok(Json(datasets))
}
