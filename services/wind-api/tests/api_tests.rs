//! HTTP tests for the wind API against a synthetic dataset on disk.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use pod_engine::testdata::{create_dataset, SyntheticSlice};
use pod_engine::PodEngineConfig;
use serde_json::Value;
use tempfile::TempDir;
use test_utils::create_point_cloud;
use test_utils::fixtures::{crs, datasets, extent, wind::DEFAULT_WIND, wind::WindParams};
use tower::ServiceExt;
use wind_api::build_router;
use wind_api::config::ServiceConfig;
use wind_api::encoding::decode_f32_le;
use wind_api::state::AppState;
use wind_common::CrsCode;

/// 20 x 20 cell-centered points at 50 m spacing inside `OSLO_UTM32N`.
fn oslo_points() -> (Vec<f32>, Vec<f32>) {
    let (x, y) = create_point_cloud(extent::OSLO_UTM32N, 20, 20);
    (
        x.into_iter().map(|v| v as f32).collect(),
        y.into_iter().map(|v| v as f32).collect(),
    )
}

async fn setup() -> (TempDir, Router) {
    let dir = tempfile::tempdir().unwrap();
    for height in datasets::HEIGHTS {
        let (x, y) = oslo_points();
        let slice = SyntheticSlice::uniform(x, y, 3.0, 4.0);
        create_dataset(dir.path(), datasets::SYNTHETIC, height, &slice).unwrap();
    }

    let config = ServiceConfig::new(
        PodEngineConfig::new(dir.path()),
        CrsCode::parse(crs::EPSG_32632).unwrap(),
    );
    let state = AppState::new(config, None).await.unwrap();
    (dir, build_router(Arc::new(state)))
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn decode(body: &Value, key: &str) -> Vec<f32> {
    decode_f32_le(body[key].as_str().unwrap()).unwrap()
}

// ============================================================================
// Health and catalog
// ============================================================================

#[tokio::test]
async fn test_health() {
    let (dir, app) = setup().await;
    let (status, body) = get(&app, "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["source"], "npy_pod");
    assert_eq!(body["dataDir"], dir.path().display().to_string());
}

#[tokio::test]
async fn test_datasets() {
    let (_dir, app) = setup().await;
    let (status, body) = get(&app, "/api/datasets").await;

    assert_eq!(status, StatusCode::OK);
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 1);

    let dataset = &list[0];
    assert_eq!(dataset["id"], datasets::SYNTHETIC);
    assert_eq!(dataset["availableHeightsMeters"], serde_json::json!([20, 100]));

    // The 1 km UTM block sits inside the fixture lon/lat box
    let (min_lon, min_lat, max_lon, max_lat) = extent::OSLO_LONLAT;
    let ext = &dataset["datasetExtent"];
    assert!(ext["minLon"].as_f64().unwrap() > min_lon);
    assert!(ext["maxLon"].as_f64().unwrap() < max_lon);
    assert!(ext["minLat"].as_f64().unwrap() > min_lat);
    assert!(ext["maxLat"].as_f64().unwrap() < max_lat);
    assert!(ext["minLon"].as_f64().unwrap() < ext["maxLon"].as_f64().unwrap());
}

#[tokio::test]
async fn test_metrics() {
    let (_dir, app) = setup().await;
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    // list_areas loaded the first height at startup
    assert!(text.contains("wind_slice_cache_entries 1\n"), "{}", text);
    // One startup miss, no hits yet
    assert!(
        text.contains(
            "# TYPE wind_slice_cache_hit_rate_percent gauge\nwind_slice_cache_hit_rate_percent 0\n"
        ),
        "{}",
        text
    );
}

// ============================================================================
// Wind queries
// ============================================================================

#[tokio::test]
async fn test_wind_uniform_field() {
    let (_dir, app) = setup().await;
    let (status, body) = get(&app, &DEFAULT_WIND.to_uri()).await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["datasetId"], datasets::SYNTHETIC);
    assert_eq!(body["heightMeters"], 100);
    assert_eq!(body["nx"], 8);
    assert_eq!(body["ny"], 6);

    let u = decode(&body, "u_b64");
    let v = decode(&body, "v_b64");
    assert_eq!(u.len(), 48);
    assert_eq!(v.len(), 48);
    assert!(u.iter().all(|&x| (x - 3.0).abs() < 1e-5));
    assert!(v.iter().all(|&x| (x - 4.0).abs() < 1e-5));

    assert!((body["speedMin"].as_f64().unwrap() - 5.0).abs() < 1e-5);
    assert!((body["speedMax"].as_f64().unwrap() - 5.0).abs() < 1e-5);

    let diagnostics = &body["diagnostics"];
    assert_eq!(diagnostics["resample_mode"], "bin_average_nn_fill");
    assert_eq!(diagnostics["subset_points"], 400);
    // Points on the upper edges of the extent fall outside the grid
    assert_eq!(diagnostics["points_used"], 361);
    assert_eq!(diagnostics["empty_cells_initial"], 0);
}

#[tokio::test]
async fn test_wind_effective_bbox_is_slice_extent() {
    let (_dir, app) = setup().await;
    let (_, wind) = get(&app, &DEFAULT_WIND.to_uri()).await;
    let (_, catalog) = get(&app, "/api/datasets").await;

    let extent = &catalog[0]["datasetExtent"];
    for key in ["minLon", "maxLon", "minLat", "maxLat"] {
        let a = wind["bbox"][key].as_f64().unwrap();
        let b = extent[key].as_f64().unwrap();
        assert!((a - b).abs() < 1e-9, "{}: {} vs {}", key, a, b);
    }
}

#[tokio::test]
async fn test_wind_coordinates() {
    let (_dir, app) = setup().await;
    let (_, body) = get(&app, &DEFAULT_WIND.to_uri()).await;

    let lon = decode(&body, "lon_b64");
    let lat = decode(&body, "lat_b64");
    assert_eq!(lon.len(), 48);
    assert_eq!(lat.len(), 48);

    let bbox = &body["bbox"];
    let (min_lon, max_lon) = (bbox["minLon"].as_f64().unwrap(), bbox["maxLon"].as_f64().unwrap());
    let (min_lat, max_lat) = (bbox["minLat"].as_f64().unwrap(), bbox["maxLat"].as_f64().unwrap());
    for (&x, &y) in lon.iter().zip(&lat) {
        assert!((x as f64) > min_lon - 1e-4 && (x as f64) < max_lon + 1e-4);
        assert!((y as f64) > min_lat - 1e-4 && (y as f64) < max_lat + 1e-4);
    }
    // Row 0 is the southern edge
    assert!(lat[0] < lat[47]);
}

#[tokio::test]
async fn test_wind_without_coordinates() {
    let (_dir, app) = setup().await;
    let params = WindParams {
        include_coords: Some(false),
        ..DEFAULT_WIND
    };
    let (status, body) = get(&app, &params.to_uri()).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.get("lon_b64").is_none());
    assert!(body.get("lat_b64").is_none());
    assert!(body.get("u_b64").is_some());
}

#[tokio::test]
async fn test_wind_reference_speed_scales() {
    let (_dir, app) = setup().await;
    let params = WindParams {
        ws_ref: Some(2.0),
        wd_ref: Some(270.0),
        ..DEFAULT_WIND
    };
    let (status, body) = get(&app, &params.to_uri()).await;

    assert_eq!(status, StatusCode::OK);
    assert!((body["speedMax"].as_f64().unwrap() - 10.0).abs() < 1e-4);
    assert!(decode(&body, "u_b64").iter().all(|&x| (x - 6.0).abs() < 1e-4));
}

#[tokio::test]
async fn test_wind_empty_selection() {
    let (_dir, app) = setup().await;
    // A few meters around (597500, 6642500), between lattice points
    let params = WindParams {
        min_lon: 10.74330,
        max_lon: 10.74336,
        min_lat: 59.90844,
        max_lat: 59.90848,
        nx: 2,
        ny: 2,
        ..DEFAULT_WIND
    };
    let (status, body) = get(&app, &params.to_uri()).await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert!(body["speedMin"].is_null());
    assert!(body["speedMax"].is_null());
    assert_eq!(body["diagnostics"]["resample_mode"], "no_points");
    assert_eq!(body["diagnostics"]["subset_points"], 0);
    assert!(decode(&body, "u_b64").iter().all(|x| x.is_nan()));
}

#[tokio::test]
async fn test_wind_second_height() {
    let (_dir, app) = setup().await;
    let params = WindParams {
        height_meters: 20,
        ..DEFAULT_WIND
    };
    let (status, body) = get(&app, &params.to_uri()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["heightMeters"], 20);
}

// ============================================================================
// Errors
// ============================================================================

#[tokio::test]
async fn test_wind_unknown_dataset() {
    let (_dir, app) = setup().await;
    let params = WindParams {
        dataset_id: "bergen",
        ..DEFAULT_WIND
    };
    let (status, body) = get(&app, &params.to_uri()).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("bergen"));
}

#[tokio::test]
async fn test_wind_unknown_height() {
    let (_dir, app) = setup().await;
    let params = WindParams {
        height_meters: 70,
        ..DEFAULT_WIND
    };
    let (status, _) = get(&app, &params.to_uri()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_wind_reversed_bbox() {
    let (_dir, app) = setup().await;
    let params = WindParams {
        min_lon: DEFAULT_WIND.max_lon,
        max_lon: DEFAULT_WIND.min_lon,
        ..DEFAULT_WIND
    };
    let (status, body) = get(&app, &params.to_uri()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("bbox"));
}

#[tokio::test]
async fn test_wind_grid_limits() {
    let (_dir, app) = setup().await;

    let zero = WindParams {
        nx: 0,
        ..DEFAULT_WIND
    };
    let (status, _) = get(&app, &zero.to_uri()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let huge = WindParams {
        nx: 1024,
        ny: 1024,
        ..DEFAULT_WIND
    };
    let (status, body) = get(&app, &huge.to_uri()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("grid cells"));
}

#[tokio::test]
async fn test_wind_bad_reference() {
    let (_dir, app) = setup().await;
    let params = WindParams {
        ws_ref: Some(0.0),
        ..DEFAULT_WIND
    };
    let (status, _) = get(&app, &params.to_uri()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get(&app, &format!("{}&wdRef=NaN", DEFAULT_WIND.to_uri())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("wdRef"));
}

#[tokio::test]
async fn test_wind_missing_parameter() {
    let (_dir, app) = setup().await;
    let (status, body) = get(&app, "/api/wind?datasetId=synthetic&heightMeters=100").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("minLon"));
}
