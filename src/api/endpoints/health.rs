//! Health check endpoint.

use axum::Json;
use serde::Serialize;

use crate::config;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: String,
}

/// `GET /` — liveness check for the front-end.
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: format!("{} is running", config::APP_NAME),
    })
}
