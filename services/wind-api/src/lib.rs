//! Wind API Service Library
//!
//! HTTP transport for the POD wind-field engine: dataset discovery and
//! gridded wind queries over JSON.

pub mod config;
pub mod encoding;
pub mod error;
pub mod handlers;
pub mod limits;
pub mod state;

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Build the application router with its middleware stack.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health::health_handler))
        .route("/api/datasets", get(handlers::datasets::list_datasets_handler))
        .route("/api/wind", get(handlers::wind::wind_handler))
        .route("/metrics", get(handlers::health::metrics_handler))
        // Middleware
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
