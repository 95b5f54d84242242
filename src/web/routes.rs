//! Web API Routes

use axum::routing::get;
use axum::Router;
use std::sync::Arc;

use crate::cache::CacheService;
use crate::web::{handlers, state::AppState};

/// Version lookup and update routes
pub fn version_routes<C: CacheService + 'static>() -> Router<Arc<AppState<C>>> {
    Router::new()
        .route(
            "/api/versions",
            get(handlers::versions::list_versions::<C>)
                .put(handlers::versions::update_versions::<C>),
        )
        .route(
            "/api/versions/{project}",
            get(handlers::versions::get_version::<C>),
        )
}

/// Dependency health and process liveness
pub fn health_routes<C: CacheService + 'static>() -> Router<Arc<AppState<C>>> {
    Router::new()
        .route("/api/health", get(handlers::health::health_check::<C>))
        .route("/health/live", get(handlers::health::liveness_check::<C>))
}
