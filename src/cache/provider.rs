//! Cache provider
//!
//! Uses enum dispatch for zero-cost abstraction over the configured backend.

use super::errors::CacheResult;
use super::providers::{NoOpCacheService, RedisCacheService};
use super::traits::CacheService;
use crate::config::CacheConfig;
use std::time::Duration;
use tracing::info;

/// Internal cache backend enum for zero-cost dispatch
#[derive(Debug, Clone)]
enum CacheBackend {
    /// Redis cache provider (boxed to reduce enum size)
    Redis(Box<RedisCacheService>),

    /// No-op cache provider (always miss, always succeed)
    NoOp(NoOpCacheService),
}

/// Cache provider selected from configuration
///
/// - **Redis**: the normal deployment; shared across instances
/// - **NoOp**: `cache.enabled = false`; every lookup falls through to the build config
#[derive(Debug, Clone)]
pub struct CacheProvider {
    backend: CacheBackend,
}

impl CacheProvider {
    /// Create a cache provider from configuration
    ///
    /// Fails only when the Redis URL cannot be parsed; an unreachable backend
    /// is not an error at this point.
    pub fn from_config(config: &CacheConfig) -> CacheResult<Self> {
        if !config.enabled {
            info!("Cache disabled by configuration, build config serves every lookup");
            return Ok(Self::noop());
        }

        let service = RedisCacheService::from_config(config)?;
        info!(
            backend = "redis",
            url = %service.display_url(),
            ttl_seconds = config.ttl_seconds,
            "Cache provider initialized"
        );

        Ok(Self {
            backend: CacheBackend::Redis(Box::new(service)),
        })
    }

    /// Create a NoOp provider (for explicit opt-out or testing)
    pub fn noop() -> Self {
        Self {
            backend: CacheBackend::NoOp(NoOpCacheService::new()),
        }
    }

    /// Check if caching is actually enabled (not NoOp)
    pub fn is_enabled(&self) -> bool {
        !matches!(self.backend, CacheBackend::NoOp(_))
    }
}

impl CacheService for CacheProvider {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        match &self.backend {
            CacheBackend::Redis(s) => s.get(key).await,
            CacheBackend::NoOp(s) => s.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        match &self.backend {
            CacheBackend::Redis(s) => s.set(key, value, ttl).await,
            CacheBackend::NoOp(s) => s.set(key, value, ttl).await,
        }
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        match &self.backend {
            CacheBackend::Redis(s) => s.delete(key).await,
            CacheBackend::NoOp(s) => s.delete(key).await,
        }
    }

    async fn ping(&self) -> CacheResult<String> {
        match &self.backend {
            CacheBackend::Redis(s) => s.ping().await,
            CacheBackend::NoOp(s) => s.ping().await,
        }
    }

    fn provider_name(&self) -> &'static str {
        match &self.backend {
            CacheBackend::Redis(s) => s.provider_name(),
            CacheBackend::NoOp(s) => s.provider_name(),
        }
    }
}
