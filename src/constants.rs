//! # System Constants
//!
//! Operational defaults shared by the resolver, the reconnect supervisor and
//! the health probes. Every value here can be overridden through configuration;
//! these are the values used when nothing else is specified.

use std::time::Duration;

/// Cache entry lifetime for resolved project versions
pub const CACHE_TTL_SECONDS: u64 = 3600;

/// Default Redis endpoint when neither config nor `REDIS_URL` supply one
pub const DEFAULT_REDIS_URL: &str = "redis://localhost:6379";

/// Default HTTP port when neither config nor `PORT` supply one
pub const DEFAULT_HTTP_PORT: u16 = 3000;

/// Acknowledgement token a healthy Redis returns for `PING`
pub const PING_ACK: &str = "PONG";

/// Reconnect backoff defaults
pub mod reconnect {
    pub const BASE_DELAY_MS: u64 = 1000;
    pub const MAX_DELAY_MS: u64 = 10_000;
    pub const MAX_ATTEMPTS: u32 = 5;
}

/// Service names reported in health reports
pub mod services {
    pub const REDIS: &str = "redis";
    pub const DATABASE: &str = "database";
}

/// Environment variables read at startup in addition to `VERSION_CHECKER__*`
pub mod env {
    pub const REDIS_URL: &str = "REDIS_URL";
    pub const PORT: &str = "PORT";
    pub const ENVIRONMENT: &str = "VERSION_CHECKER_ENV";
    pub const APP_ENV: &str = "APP_ENV";
    pub const CONFIG_PREFIX: &str = "VERSION_CHECKER";
}

/// Default cache TTL as a `Duration`
pub fn cache_ttl() -> Duration {
    Duration::from_secs(CACHE_TTL_SECONDS)
}
