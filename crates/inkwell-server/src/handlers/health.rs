//! Liveness and readiness probes.

use crate::db::{check_health, DbHealth};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<DbHealth>,
}

impl HealthStatus {
    fn new(status: &'static str, database: Option<DbHealth>) -> Self {
        Self {
            status,
            version: env!("CARGO_PKG_VERSION"),
            timestamp: Utc::now(),
            database,
        }
    }
}

/// Process is up; no dependencies are probed.
pub async fn live() -> impl IntoResponse {
    Json(HealthStatus::new("alive", None))
}

/// Ready when the database answers within the probe timeout.
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let database = check_health(&state.db, PROBE_TIMEOUT).await;
    let (code, status) = if database.is_healthy {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
    };
    (code, Json(HealthStatus::new(status, Some(database))))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let database = check_health(&state.db, PROBE_TIMEOUT).await;
    let (code, status) = if database.is_healthy {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };
    (code, Json(HealthStatus::new(status, Some(database))))
}
