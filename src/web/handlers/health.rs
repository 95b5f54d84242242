//! # Health Check Handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::cache::CacheService;
use crate::health::HealthReport;
use crate::web::state::AppState;

/// Dependency health: GET /api/health
///
/// 200 when every probe passes, 503 otherwise; the body is the report either way.
pub async fn health_check<C: CacheService + 'static>(
    State(state): State<Arc<AppState<C>>>,
) -> (StatusCode, Json<HealthReport>) {
    let report = state.health.check_all_services().await;
    let status = if report.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report))
}

/// Process liveness: GET /health/live
///
/// Touches no dependency.
pub async fn liveness_check<C: CacheService + 'static>(
    State(state): State<Arc<AppState<C>>>,
) -> Json<Value> {
    Json(json!({
        "status": "alive",
        "environment": state.environment,
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
