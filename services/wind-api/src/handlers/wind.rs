//! Gridded wind field handler.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    Json,
};
use metrics::counter;
use pod_engine::{GriddedWindField, WindFieldQuery};
use serde::{Deserialize, Serialize};
use wind_common::{BoundingBox, WindError};

use super::LonLatBox;
use crate::encoding::encode_f32_le;
use crate::error::ApiError;
use crate::limits::GridRequest;
use crate::state::AppState;

/// Raw `/api/wind` query parameters. Everything arrives as text so that
/// missing and malformed values produce JSON errors.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindParams {
    pub dataset_id: Option<String>,
    pub height_meters: Option<String>,
    pub min_lon: Option<String>,
    pub min_lat: Option<String>,
    pub max_lon: Option<String>,
    pub max_lat: Option<String>,
    pub nx: Option<String>,
    pub ny: Option<String>,
    pub ws_ref: Option<String>,
    pub wd_ref: Option<String>,
    pub include_coords: Option<String>,
}

/// Validated wind request.
#[derive(Debug, Clone, PartialEq)]
pub struct WindRequest {
    pub dataset_id: String,
    pub height: u32,
    pub bbox: LonLatBox,
    pub grid: (usize, usize),
    pub ws_ref: f64,
    pub wd_ref: f64,
    pub include_coords: bool,
}

impl WindParams {
    /// Parse and validate against defaults and limits.
    pub fn validate(&self, state: &AppState) -> Result<WindRequest, ApiError> {
        let dataset_id = required("datasetId", &self.dataset_id)?.to_string();
        let height = parse::<u32>("heightMeters", required("heightMeters", &self.height_meters)?)?;

        let bbox = LonLatBox {
            min_lon: parse_finite("minLon", required("minLon", &self.min_lon)?)?,
            min_lat: parse_finite("minLat", required("minLat", &self.min_lat)?)?,
            max_lon: parse_finite("maxLon", required("maxLon", &self.max_lon)?)?,
            max_lat: parse_finite("maxLat", required("maxLat", &self.max_lat)?)?,
        };
        if bbox.min_lon >= bbox.max_lon || bbox.min_lat >= bbox.max_lat {
            return Err(WindError::InvalidBbox(format!(
                "expected minLon < maxLon and minLat < maxLat, got {:?}",
                bbox
            ))
            .into());
        }
        if bbox.min_lat < -90.0 || bbox.max_lat > 90.0 {
            return Err(WindError::InvalidBbox("latitude outside [-90, 90]".to_string()).into());
        }

        let grid = GridRequest {
            nx: parse("nx", required("nx", &self.nx)?)?,
            ny: parse("ny", required("ny", &self.ny)?)?,
        };
        grid.check_limits(&state.config.limits)?;

        let ws_ref = match &self.ws_ref {
            Some(raw) => parse_finite("wsRef", raw)?,
            None => state.config.default_ws_ref,
        };
        if ws_ref <= 0.0 {
            return Err(WindError::invalid_parameter("wsRef", "must be positive").into());
        }
        let wd_ref = match &self.wd_ref {
            Some(raw) => parse_finite("wdRef", raw)?,
            None => state.config.default_wd_ref,
        };
        let include_coords = match &self.include_coords {
            Some(raw) => parse_flag("includeCoords", raw)?,
            None => true,
        };

        Ok(WindRequest {
            dataset_id,
            height,
            bbox,
            grid: (grid.nx, grid.ny),
            ws_ref,
            wd_ref,
            include_coords,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindFieldResponse {
    pub dataset_id: String,
    pub height_meters: u32,
    pub bbox: LonLatBox,
    pub nx: usize,
    pub ny: usize,
    #[serde(rename = "u_b64")]
    pub u_b64: String,
    #[serde(rename = "v_b64")]
    pub v_b64: String,
    pub speed_min: Option<f32>,
    pub speed_max: Option<f32>,
    #[serde(rename = "lon_b64", skip_serializing_if = "Option::is_none")]
    pub lon_b64: Option<String>,
    #[serde(rename = "lat_b64", skip_serializing_if = "Option::is_none")]
    pub lat_b64: Option<String>,
    pub diagnostics: DiagnosticsBody,
}

#[derive(Debug, Serialize)]
pub struct DiagnosticsBody {
    pub resample_mode: &'static str,
    pub points_used: usize,
    pub empty_cells_initial: usize,
    pub subset_points: usize,
}

impl WindFieldResponse {
    fn new(request: &WindRequest, bbox: LonLatBox, field: &GriddedWindField) -> Self {
        let (lon_b64, lat_b64) = match &field.coordinates {
            Some(coords) => (
                Some(encode_f32_le(&coords.lon)),
                Some(encode_f32_le(&coords.lat)),
            ),
            None => (None, None),
        };

        Self {
            dataset_id: request.dataset_id.clone(),
            height_meters: request.height,
            bbox,
            nx: field.nx,
            ny: field.ny,
            u_b64: encode_f32_le(&field.u),
            v_b64: encode_f32_le(&field.v),
            speed_min: finite(field.speed_min),
            speed_max: finite(field.speed_max),
            lon_b64,
            lat_b64,
            diagnostics: DiagnosticsBody {
                resample_mode: field.diagnostics.mode.as_str(),
                points_used: field.diagnostics.points_used,
                empty_cells_initial: field.diagnostics.empty_cells_initial,
                subset_points: field.subset_points,
            },
        }
    }
}

/// GET /api/wind - Reconstructed wind resampled onto an nx by ny grid
pub async fn wind_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<WindParams>,
) -> Result<Json<WindFieldResponse>, ApiError> {
    counter!("wind_api_requests_total", "endpoint" => "wind").increment(1);
    let request = params.validate(&state)?;

    let area = state
        .find_area(&request.dataset_id)
        .ok_or_else(|| WindError::DatasetNotFound(request.dataset_id.clone()))?;
    if !area.heights.contains(&request.height) {
        return Err(WindError::HeightNotAvailable {
            dataset: request.dataset_id.clone(),
            height: request.height,
        }
        .into());
    }

    let data_bbox = state
        .lonlat_to_data
        .transform_bbox(&BoundingBox::from(request.bbox))
        .map_err(|e| WindError::InvalidBbox(e.to_string()))?;

    let (nx, ny) = request.grid;
    tracing::debug!(
        dataset = %request.dataset_id,
        height = request.height,
        ?data_bbox,
        estimated_bytes = GridRequest { nx, ny }.estimated_bytes(request.include_coords),
        "Wind request"
    );

    let query = WindFieldQuery::new(request.dataset_id.clone(), request.height, data_bbox, nx, ny)
        .with_reference(request.ws_ref, request.wd_ref);
    let mut field = state.service.answer(&query).await?;

    if request.include_coords {
        state
            .service
            .attach_coordinates(&mut field, &state.wind_to_lonlat)?;
    }

    let effective = state
        .data_to_lonlat
        .transform_bbox(&field.effective_bbox)
        .map_err(pod_engine::PodError::from)?;

    Ok(Json(WindFieldResponse::new(
        &request,
        effective.into(),
        &field,
    )))
}

fn finite(value: f32) -> Option<f32> {
    value.is_finite().then_some(value)
}

fn required<'a>(name: &str, value: &'a Option<String>) -> Result<&'a str, WindError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| WindError::MissingParameter(name.to_string()))
}

fn parse<T: FromStr>(name: &str, raw: &str) -> Result<T, WindError> {
    raw.trim()
        .parse()
        .map_err(|_| WindError::invalid_parameter(name, format!("cannot parse '{}'", raw)))
}

fn parse_finite(name: &str, raw: &str) -> Result<f64, WindError> {
    let value: f64 = parse(name, raw)?;
    if !value.is_finite() {
        return Err(WindError::invalid_parameter(name, "must be finite"));
    }
    Ok(value)
}

fn parse_flag(name: &str, raw: &str) -> Result<bool, WindError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(WindError::invalid_parameter(name, format!("expected a boolean, got '{}'", raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims() {
        assert_eq!(required("nx", &Some(" 8 ".into())).unwrap(), "8");
        assert!(matches!(
            required("nx", &Some("  ".into())),
            Err(WindError::MissingParameter(p)) if p == "nx"
        ));
        assert!(required("nx", &None).is_err());
    }

    #[test]
    fn test_parse_finite() {
        assert_eq!(parse_finite("wdRef", "-90.5").unwrap(), -90.5);
        assert!(parse_finite("wdRef", "NaN").is_err());
        assert!(parse_finite("wdRef", "inf").is_err());
        assert!(parse_finite("wdRef", "north").is_err());
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("includeCoords", "TRUE").unwrap());
        assert!(!parse_flag("includeCoords", "0").unwrap());
        assert!(parse_flag("includeCoords", "maybe").is_err());
    }

    #[test]
    fn test_nan_speeds_serialize_as_null() {
        assert_eq!(finite(f32::NAN), None);
        assert_eq!(finite(1.5), Some(1.5));
        let json = serde_json::to_value(DiagnosticsBody {
            resample_mode: "no_points",
            points_used: 0,
            empty_cells_initial: 4,
            subset_points: 0,
        })
        .unwrap();
        assert_eq!(json["resample_mode"], "no_points");
    }
}
