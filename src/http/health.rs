//! Liveness endpoint.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::http::server::AppState;

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// RFC 3339, second precision.
    pub timestamp: String,
}

/// `GET /health`
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let body = HealthResponse {
        status: "healthy".to_string(),
        timestamp: state.clock.now().to_rfc3339_opts(SecondsFormat::Secs, true),
    };
    (StatusCode::OK, Json(body))
}
