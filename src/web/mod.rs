//! # Web API Module
//!
//! axum application exposing version lookups, build-config updates, and
//! health endpoints.

use axum::http::{header, HeaderValue, StatusCode};
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use crate::cache::CacheService;
use crate::error::VersionError;

pub mod errors;
pub mod handlers;
pub mod routes;
pub mod state;

pub use errors::{ApiError, ApiResult};
pub use state::AppState;

/// Create the web application with all routes and middleware
pub fn create_app<C: CacheService + 'static>(state: Arc<AppState<C>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let common_middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            state.request_timeout,
        ))
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ));

    Router::new()
        .merge(routes::version_routes::<C>())
        .merge(routes::health_routes::<C>())
        .layer(common_middleware)
        .with_state(state)
}

/// Bind `bind_address` and serve until `shutdown` resolves
pub async fn serve<C, F>(
    state: Arc<AppState<C>>,
    bind_address: &str,
    shutdown: F,
) -> Result<(), VersionError>
where
    C: CacheService + 'static,
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(bind_address)
        .await
        .map_err(|e| VersionError::Server(format!("Failed to bind to {bind_address}: {e}")))?;

    info!(address = %bind_address, "Web server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| VersionError::Server(e.to_string()))?;

    info!("Web server stopped");
    Ok(())
}
