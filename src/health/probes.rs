//! Built-in health probes

use super::HealthProbe;
use crate::cache::CacheService;
use crate::config::DatabaseConfig;
use crate::constants::{services, PING_ACK};
use crate::error::VersionError;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

/// Cache liveness: a ping that must come back as `PONG`
#[derive(Debug, Clone)]
pub struct CacheProbe<C> {
    cache: C,
}

impl<C> CacheProbe<C> {
    pub fn new(cache: C) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl<C: CacheService> HealthProbe for CacheProbe<C> {
    fn name(&self) -> &str {
        services::REDIS
    }

    async fn check(&self) -> Result<(), String> {
        let reply = self.cache.ping().await.map_err(|e| e.to_string())?;
        if reply == PING_ACK {
            Ok(())
        } else {
            Err(format!("unexpected ping reply '{reply}'"))
        }
    }
}

/// Secondary store liveness: `SELECT 1` must return a row
#[derive(Debug, Clone)]
pub struct DatabaseProbe {
    pool: PgPool,
}

impl DatabaseProbe {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Build a lazily-connecting probe, or `None` when no database is configured
    pub fn from_config(
        config: &DatabaseConfig,
        acquire_timeout: Duration,
    ) -> Result<Option<Self>, VersionError> {
        let Some(url) = config.url.as_deref() else {
            return Ok(None);
        };

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .acquire_timeout(acquire_timeout)
            .connect_lazy(url)?;

        Ok(Some(Self::new(pool)))
    }
}

#[async_trait]
impl HealthProbe for DatabaseProbe {
    fn name(&self) -> &str {
        services::DATABASE
    }

    async fn check(&self) -> Result<(), String> {
        let rows = sqlx::query("SELECT 1")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.to_string())?;
        if rows.is_empty() {
            Err("SELECT 1 returned no rows".to_string())
        } else {
            Ok(())
        }
    }
}
