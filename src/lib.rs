#![allow(clippy::doc_markdown)] // Allow technical terms like Redis, PostgreSQL in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Version Checker
//!
//! Resolves project names (build targets such as `chrome` or `brave-core`)
//! to version strings. Lookups go through a Redis read-through cache in front
//! of an authoritative in-memory build config, and keep working when Redis
//! does not.
//!
//! ## Architecture
//!
//! - **Resolver**: cache hit, else build config plus write-back; on cache
//!   failure the build config answers directly
//! - **Supervisor**: reconnects to the cache with bounded exponential backoff
//!   (1s, 2s, 4s, 8s, 10s, then stop) whenever a connection error is seen
//! - **Health**: concurrent dependency probes folded into one report
//!
//! HTTP handlers and CLI commands are thin layers over these.
//!
//! ## Module Organization
//!
//! - [`resolver`] - Read-through lookups and validated build-config updates
//! - [`resilience`] - Backoff policy and connection supervisor
//! - [`cache`] - Cache trait and Redis / no-op providers
//! - [`health`] - Health probes and aggregation
//! - [`validation`] - Project-reference schema for updates
//! - [`web`] - axum application
//! - [`cli`] - Command implementations for the `version-checker` binary
//! - [`config`] - Layered configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use version_checker::bootstrap::ServiceContext;
//! use version_checker::config::ConfigManager;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let context = ServiceContext::bootstrap(ConfigManager::load()?).await?;
//!
//! let chrome = context.resolver.get_project_ref("chrome").await;
//! println!("chrome: {}", chrome.version().unwrap_or("not found"));
//!
//! context.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod bootstrap;
pub mod cache;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod health;
pub mod logging;
pub mod resilience;
pub mod resolver;
pub mod validation;
pub mod web;

pub use cache::{CacheError, CacheProvider, CacheService};
pub use crate::config::{ConfigManager, VersionCheckerConfig};
pub use error::{Result, VersionError};
pub use health::{HealthAggregator, HealthReport, HealthStatus, ServiceStatus};
pub use resilience::{BackoffPolicy, ConnectionState, ConnectionSupervisor, SupervisedCache};
pub use resolver::{BuildConfig, ProjectRef, RefSource, UpdateOutcome, VersionResolver};
pub use validation::{ProjectRefSchema, ValidationError};
