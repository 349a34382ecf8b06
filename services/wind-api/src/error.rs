//! HTTP error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pod_engine::PodError;
use serde_json::json;
use wind_common::WindError;

use crate::limits::LimitExceeded;

/// Error returned by handlers, rendered as `{"error": <message>}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<WindError> for ApiError {
    fn from(err: WindError) -> Self {
        let status = StatusCode::from_u16(err.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, err.to_string())
    }
}

impl From<PodError> for ApiError {
    fn from(err: PodError) -> Self {
        let wind = match err {
            PodError::InvalidQuery(message) => WindError::invalid_parameter("query", message),
            PodError::Projection(e) => WindError::ProjectionError(e.to_string()),
            other => WindError::InternalError(other.to_string()),
        };
        wind.into()
    }
}

impl From<LimitExceeded> for ApiError {
    fn from(err: LimitExceeded) -> Self {
        WindError::invalid_parameter(err.param(), err.to_string()).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, error = %self.message, "Request failed");
        }
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
