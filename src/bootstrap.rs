//! # Service Bootstrap
//!
//! Wires configuration into the running components: cache provider, reconnect
//! supervisor, resolver and health probes. Shared by every CLI command and
//! the HTTP server.

use crate::cache::{CacheProvider, CacheService};
use crate::config::ConfigManager;
use crate::error::VersionError;
use crate::health::{CacheProbe, DatabaseProbe, HealthAggregator};
use crate::resilience::{BackoffPolicy, ConnectionSupervisor, SupervisedCache, SupervisorOptions};
use crate::resolver::VersionResolver;
use crate::web::AppState;
use std::sync::Arc;
use tracing::info;

/// Cache handle used by the running service
pub type ServiceCache = SupervisedCache<CacheProvider>;

/// Every long-lived component of one process
#[derive(Debug)]
pub struct ServiceContext {
    pub config: Arc<ConfigManager>,
    pub supervisor: Arc<ConnectionSupervisor<CacheProvider>>,
    pub resolver: Arc<VersionResolver<ServiceCache>>,
    pub health: HealthAggregator,
}

impl ServiceContext {
    /// Build every component from configuration
    ///
    /// Must be called from within a tokio runtime; the supervisor task is
    /// spawned here and the cache backend is pinged eagerly in the background.
    pub async fn bootstrap(config: Arc<ConfigManager>) -> Result<Self, VersionError> {
        let settings = config.config();

        let provider = CacheProvider::from_config(&settings.cache)?;
        let supervisor = ConnectionSupervisor::start(
            provider,
            BackoffPolicy::from_config(&settings.reconnect),
            SupervisorOptions::from_config(&settings.reconnect),
        );

        let resolver = Arc::new(VersionResolver::from_config(supervisor.client(), settings));

        let mut health = HealthAggregator::new(settings.health.probe_timeout())
            .with_probe(CacheProbe::new(supervisor.client()));
        if let Some(probe) =
            DatabaseProbe::from_config(&settings.database, settings.health.probe_timeout())?
        {
            health = health.with_probe(probe);
        }

        info!(
            environment = config.environment(),
            cache = resolver.cache().provider_name(),
            projects = resolver.build_config().len(),
            services = ?health.service_names(),
            "Service bootstrap complete"
        );

        Ok(Self {
            config,
            supervisor,
            resolver,
            health,
        })
    }

    /// State for the HTTP layer
    pub fn app_state(&self) -> Arc<AppState<ServiceCache>> {
        Arc::new(AppState::new(
            Arc::clone(&self.resolver),
            self.health.clone(),
            self.config.environment(),
            self.config.config().server.request_timeout(),
        ))
    }

    /// Stop background work
    pub async fn shutdown(&self) {
        self.supervisor.shutdown().await;
        info!("Service shut down");
    }
}
