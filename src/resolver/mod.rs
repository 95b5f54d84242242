//! # Version Resolver
//!
//! Read-through cache in front of the authoritative [`BuildConfig`].
//!
//! - **Hit**: the cached value is returned and the build config is not read,
//!   so a cached value can mask a newer configured one until it expires.
//! - **Miss**: the build config answers and the value is written back with
//!   the configured TTL. A failed write-back is logged and ignored.
//! - **Cache failure**: the build config answers without any write-back.
//!
//! Lookups never return an error; see [`ProjectRef`].

pub mod build_config;
pub mod types;

pub use build_config::BuildConfig;
pub use types::{ProjectRef, RefSource, UpdateOutcome};

use crate::cache::CacheService;
use crate::config::VersionCheckerConfig;
use crate::error::VersionError;
use crate::logging::log_error;
use crate::validation::ProjectRefSchema;
use futures::future::join_all;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Resolver behavior knobs, usually taken from configuration
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    pub key_prefix: String,
    pub ttl: Duration,
    pub invalidate_on_update: bool,
    pub fallback_version: Option<String>,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            key_prefix: String::new(),
            ttl: crate::constants::cache_ttl(),
            invalidate_on_update: false,
            fallback_version: None,
        }
    }
}

impl ResolverOptions {
    pub fn from_config(config: &VersionCheckerConfig) -> Self {
        Self {
            key_prefix: config.cache.key_prefix.clone(),
            ttl: config.cache.ttl(),
            invalidate_on_update: config.cache.invalidate_on_update,
            fallback_version: config.resolver.fallback_version.clone(),
        }
    }
}

#[derive(Debug)]
pub struct VersionResolver<C> {
    cache: C,
    build_config: Arc<BuildConfig>,
    schema: ProjectRefSchema,
    options: ResolverOptions,
}

impl<C: CacheService> VersionResolver<C> {
    pub fn new(
        cache: C,
        build_config: Arc<BuildConfig>,
        schema: ProjectRefSchema,
        options: ResolverOptions,
    ) -> Self {
        Self {
            cache,
            build_config,
            schema,
            options,
        }
    }

    /// Seed the build config from `[projects]` and take every option from config
    pub fn from_config(cache: C, config: &VersionCheckerConfig) -> Self {
        let build_config: BuildConfig = config.projects.clone().into_iter().collect();
        Self::new(
            cache,
            Arc::new(build_config),
            ProjectRefSchema::from_config(config),
            ResolverOptions::from_config(config),
        )
    }

    pub fn build_config(&self) -> &Arc<BuildConfig> {
        &self.build_config
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    fn cache_key(&self, project: &str) -> String {
        format!("{}{}", self.options.key_prefix, project)
    }

    /// Resolve a project to its version
    pub async fn get_project_ref(&self, project: &str) -> ProjectRef {
        let key = self.cache_key(project);

        match self.cache.get(&key).await {
            Ok(Some(version)) => {
                debug!(project = %project, "Cache hit");
                ProjectRef::Found {
                    version,
                    source: RefSource::Cache,
                }
            }
            Ok(None) => {
                let Some(version) = self.build_config.get(project) else {
                    debug!(project = %project, "Project not configured");
                    return ProjectRef::NotConfigured;
                };

                if let Err(e) = self.cache.set(&key, &version, self.options.ttl).await {
                    warn!(project = %project, error = %e, "Failed to populate cache");
                } else {
                    debug!(
                        project = %project,
                        ttl_seconds = self.options.ttl.as_secs(),
                        "Cache populated from build config"
                    );
                }

                ProjectRef::Found {
                    version,
                    source: RefSource::Config,
                }
            }
            Err(e) => {
                warn!(
                    project = %project,
                    error = %e,
                    "Cache lookup failed, serving from build config"
                );

                match (self.build_config.get(project), &self.options.fallback_version) {
                    (Some(version), _) => ProjectRef::Found {
                        version,
                        source: RefSource::Degraded,
                    },
                    (None, Some(fallback)) => ProjectRef::Found {
                        version: fallback.clone(),
                        source: RefSource::Fallback,
                    },
                    (None, None) => ProjectRef::Unavailable,
                }
            }
        }
    }

    /// Resolve every configured project concurrently, sorted by name
    pub async fn resolve_all(&self) -> Vec<(String, ProjectRef)> {
        let projects = self.build_config.projects();
        let mut lookups = Vec::with_capacity(projects.len());
        for project in &projects {
            lookups.push(self.get_project_ref(project));
        }
        let refs = join_all(lookups).await;
        projects.into_iter().zip(refs).collect()
    }

    /// Validate a JSON patch and merge it into the build config
    ///
    /// A rejected patch leaves the build config untouched. Cache entries for
    /// the patched projects are deleted only when invalidation is enabled.
    pub async fn update_build_config(&self, patch: &Value) -> Result<UpdateOutcome, VersionError> {
        let patch = match self.schema.validate(patch) {
            Ok(patch) => patch,
            Err(e) => {
                log_error(
                    "resolver",
                    "update_build_config",
                    &e.to_string(),
                    Some("patch rejected, build config unchanged"),
                );
                return Err(e.into());
            }
        };

        let updated = self.build_config.apply(&patch);
        info!(projects = ?updated, "Build config updated");

        let mut invalidated = 0;
        if self.options.invalidate_on_update {
            for project in &updated {
                match self.cache.delete(&self.cache_key(project)).await {
                    Ok(()) => invalidated += 1,
                    Err(e) => warn!(
                        project = %project,
                        error = %e,
                        "Failed to invalidate cache entry"
                    ),
                }
            }
        }

        Ok(UpdateOutcome {
            updated,
            invalidated,
        })
    }

    /// Single-project convenience over [`update_build_config`](Self::update_build_config)
    pub async fn update_project(
        &self,
        project: &str,
        version: &str,
    ) -> Result<UpdateOutcome, VersionError> {
        let mut patch = serde_json::Map::new();
        patch.insert(project.to_string(), Value::String(version.to_string()));
        self.update_build_config(&Value::Object(patch)).await
    }
}
