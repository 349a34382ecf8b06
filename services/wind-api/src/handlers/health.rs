//! Health and metrics handlers.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub source: String,
    pub data_dir: String,
}

/// GET /api/health - Basic health check
pub async fn health_handler(Extension(state): Extension<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        source: state.config.source().to_string(),
        data_dir: state.config.data_dir().display().to_string(),
    })
}

/// GET /metrics - Prometheus metrics
pub async fn metrics_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    let mut output = state
        .prometheus
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default();

    // Slice cache gauges come straight from the store
    let stats = state.service.cache_stats().await;
    output.push_str("# HELP wind_slice_cache_entries Height slices held in memory\n");
    output.push_str("# TYPE wind_slice_cache_entries gauge\n");
    output.push_str(&format!("wind_slice_cache_entries {}\n", stats.entries));
    output.push_str("# HELP wind_slice_cache_hit_rate_percent Slice cache hit rate in percent\n");
    output.push_str("# TYPE wind_slice_cache_hit_rate_percent gauge\n");
    output.push_str(&format!(
        "wind_slice_cache_hit_rate_percent {}\n",
        stats.hit_rate()
    ));

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        output,
    )
        .into_response()
}
