//! # Version Checker Configuration System
//!
//! Typed configuration for the service. Values are layered by the
//! [`ConfigManager`] from built-in defaults, TOML files, and environment
//! variables, then validated before anything is constructed from them.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use version_checker::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let redis_url = &manager.config().cache.url;
//! let ttl = manager.config().cache.ttl();
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use crate::constants::{self, reconnect};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root configuration structure mirroring `config/version-checker.toml`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VersionCheckerConfig {
    /// Deployment environment (development, test, production)
    pub environment: String,

    /// HTTP server settings
    pub server: ServerConfig,

    /// Cache backend settings
    pub cache: CacheConfig,

    /// Reconnect backoff settings
    pub reconnect: ReconnectConfig,

    /// Health probe settings
    pub health: HealthConfig,

    /// Optional secondary data store
    pub database: DatabaseConfig,

    /// Lookup behavior
    pub resolver: ResolverConfig,

    /// Project-reference schema settings
    pub validation: ValidationConfig,

    /// Logging output
    pub logging: LoggingConfig,

    /// Initial build config: project name -> version
    pub projects: BTreeMap<String, String>,
}

impl Default for VersionCheckerConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            server: ServerConfig::default(),
            cache: CacheConfig::default(),
            reconnect: ReconnectConfig::default(),
            health: HealthConfig::default(),
            database: DatabaseConfig::default(),
            resolver: ResolverConfig::default(),
            validation: ValidationConfig::default(),
            logging: LoggingConfig::default(),
            projects: BTreeMap::new(),
        }
    }
}

impl VersionCheckerConfig {
    /// Check cross-field constraints that serde cannot express
    pub fn validate(&self) -> ConfigResult<()> {
        if self.cache.url.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "url",
                "cache configuration",
            ));
        }
        if !self.cache.url.starts_with("redis://") && !self.cache.url.starts_with("rediss://") {
            return Err(ConfigurationError::invalid_value(
                "cache.url",
                crate::cache::providers::redis::redact_url(&self.cache.url),
                "must use the redis:// or rediss:// scheme",
            ));
        }
        if self.cache.ttl_seconds == 0 {
            return Err(ConfigurationError::invalid_value(
                "cache.ttl_seconds",
                "0",
                "must be at least one second",
            ));
        }
        if self.cache.operation_timeout_ms == 0 || self.cache.connect_timeout_ms == 0 {
            return Err(ConfigurationError::invalid_value(
                "cache.operation_timeout_ms",
                "0",
                "timeouts must be non-zero",
            ));
        }
        if self.reconnect.base_delay_ms == 0 {
            return Err(ConfigurationError::invalid_value(
                "reconnect.base_delay_ms",
                "0",
                "must be non-zero",
            ));
        }
        if self.reconnect.max_delay_ms < self.reconnect.base_delay_ms {
            return Err(ConfigurationError::invalid_value(
                "reconnect.max_delay_ms",
                self.reconnect.max_delay_ms.to_string(),
                format!(
                    "must be >= base_delay_ms ({})",
                    self.reconnect.base_delay_ms
                ),
            ));
        }
        if self.server.port == 0 {
            return Err(ConfigurationError::invalid_value(
                "server.port",
                "0",
                "must be a usable TCP port",
            ));
        }
        if self.health.probe_timeout_ms == 0 {
            return Err(ConfigurationError::invalid_value(
                "health.probe_timeout_ms",
                "0",
                "must be non-zero",
            ));
        }
        if let Some(name) = self
            .projects
            .keys()
            .chain(self.validation.allowed_projects.iter())
            .find(|name| crate::validation::is_reserved_project_name(name))
        {
            return Err(ConfigurationError::invalid_value(
                "projects",
                name.clone(),
                "reserved project name",
            ));
        }
        if self.validation.max_version_len == 0 {
            return Err(ConfigurationError::invalid_value(
                "validation.max_version_len",
                "0",
                "must be non-zero",
            ));
        }
        Ok(())
    }

    /// Project names accepted by `update_build_config`
    ///
    /// An explicit `validation.allowed_projects` list wins; otherwise the
    /// projects seeded from `[projects]` are the recognized set.
    pub fn recognized_projects(&self) -> Vec<String> {
        if self.validation.allowed_projects.is_empty() {
            self.projects.keys().cloned().collect()
        } else {
            self.validation.allowed_projects.clone()
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: constants::DEFAULT_HTTP_PORT,
            request_timeout_ms: 30_000,
        }
    }
}

impl ServerConfig {
    /// Address the listener binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Cache backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Redis connection URL
    pub url: String,
    /// `false` swaps in the no-op backend
    pub enabled: bool,
    /// Prepended to project names to form cache keys
    pub key_prefix: String,
    pub ttl_seconds: u64,
    pub operation_timeout_ms: u64,
    pub connect_timeout_ms: u64,
    /// Delete cached entries for patched projects on update
    pub invalidate_on_update: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: constants::DEFAULT_REDIS_URL.to_string(),
            enabled: true,
            key_prefix: String::new(),
            ttl_seconds: constants::CACHE_TTL_SECONDS,
            operation_timeout_ms: 2_000,
            connect_timeout_ms: 5_000,
            invalidate_on_update: false,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

/// Reconnect backoff configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReconnectConfig {
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub max_attempts: u32,
    /// Whether an error event after exhaustion starts a fresh cycle
    pub restart_after_exhaustion: bool,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: reconnect::BASE_DELAY_MS,
            max_delay_ms: reconnect::MAX_DELAY_MS,
            max_attempts: reconnect::MAX_ATTEMPTS,
            restart_after_exhaustion: true,
        }
    }
}

/// Health probe configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthConfig {
    pub probe_timeout_ms: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            probe_timeout_ms: 3_000,
        }
    }
}

impl HealthConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

/// Secondary data store, probed for health only
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Postgres URL; no database probe when unset
    pub url: Option<String>,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 2,
        }
    }
}

/// Lookup behavior
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Sentinel served when the cache is down and the project is not configured
    pub fallback_version: Option<String>,
}

/// Project-reference schema configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Explicit list of updatable projects; empty means "the seeded projects"
    pub allowed_projects: Vec<String>,
    pub max_version_len: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            allowed_projects: Vec::new(),
            max_version_len: 128,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive; environment-derived when unset, `RUST_LOG` wins
    pub level: Option<String>,
    pub directory: String,
    /// Write JSON log files in addition to the console
    pub file_output: bool,
    /// Emit console logs as JSON instead of human-readable text
    pub json_console: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: None,
            directory: "logs".to_string(),
            file_output: true,
            json_console: false,
        }
    }
}
