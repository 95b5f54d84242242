//! No-op cache provider
//!
//! Always returns None/success. Used when caching is disabled by
//! configuration, in which case every lookup is served by the build config.

use crate::cache::errors::CacheResult;
use crate::cache::traits::CacheService;
use crate::constants::PING_ACK;
use std::time::Duration;

/// No-op cache service that never caches anything
///
/// All reads return None, all writes succeed silently.
#[derive(Debug, Clone, Default)]
pub struct NoOpCacheService;

impl NoOpCacheService {
    /// Create a new no-op cache service
    pub fn new() -> Self {
        Self
    }
}

impl CacheService for NoOpCacheService {
    async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> CacheResult<()> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn ping(&self) -> CacheResult<String> {
        Ok(PING_ACK.to_string())
    }

    fn provider_name(&self) -> &'static str {
        "noop"
    }
}
