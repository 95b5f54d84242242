//! # Web API Application State

use crate::health::HealthAggregator;
use crate::resolver::VersionResolver;
use std::sync::Arc;
use std::time::Duration;

/// Shared state handed to every handler
#[derive(Debug)]
pub struct AppState<C> {
    pub resolver: Arc<VersionResolver<C>>,
    pub health: HealthAggregator,
    pub environment: String,
    pub request_timeout: Duration,
}

impl<C> AppState<C> {
    pub fn new(
        resolver: Arc<VersionResolver<C>>,
        health: HealthAggregator,
        environment: impl Into<String>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            resolver,
            health,
            environment: environment.into(),
            request_timeout,
        }
    }
}
