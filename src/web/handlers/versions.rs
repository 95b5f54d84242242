//! # Version Handlers

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::info;

use crate::cache::CacheService;
use crate::resolver::{ProjectRef, RefSource, UpdateOutcome};
use crate::web::errors::{ApiError, ApiResult};
use crate::web::state::AppState;

#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub project: String,
    pub version: String,
    pub source: RefSource,
}

/// Every configured project: GET /api/versions
///
/// Projects that cannot be resolved are reported as `null`.
pub async fn list_versions<C: CacheService + 'static>(
    State(state): State<Arc<AppState<C>>>,
) -> Json<Value> {
    let mut body = Map::new();
    for (project, project_ref) in state.resolver.resolve_all().await {
        let version = project_ref.into_version().map_or(Value::Null, Value::String);
        body.insert(project, version);
    }
    body.insert("timestamp".to_string(), Value::String(Utc::now().to_rfc3339()));
    Json(Value::Object(body))
}

/// One project: GET /api/versions/{project}
pub async fn get_version<C: CacheService + 'static>(
    State(state): State<Arc<AppState<C>>>,
    Path(project): Path<String>,
) -> ApiResult<Json<VersionResponse>> {
    match state.resolver.get_project_ref(&project).await {
        ProjectRef::Found { version, source } => Ok(Json(VersionResponse {
            project,
            version,
            source,
        })),
        ProjectRef::NotConfigured => Err(ApiError::not_found(project)),
        ProjectRef::Unavailable => Err(ApiError::CacheUnavailable),
    }
}

/// Patch the build config: PUT /api/versions
pub async fn update_versions<C: CacheService + 'static>(
    State(state): State<Arc<AppState<C>>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<UpdateOutcome>> {
    let Json(patch) = payload?;
    let outcome = state.resolver.update_build_config(&patch).await?;
    info!(
        projects = ?outcome.updated,
        invalidated = outcome.invalidated,
        "Build config updated via API"
    );
    Ok(Json(outcome))
}
