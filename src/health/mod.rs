//! # Health Aggregation
//!
//! Runs every registered [`HealthProbe`] concurrently and folds the results
//! into a [`HealthReport`]. A probe that errors or overruns the probe timeout
//! is reported as `failed`; nothing escapes the aggregator.

pub mod probes;

pub use probes::{CacheProbe, DatabaseProbe};

use async_trait::async_trait;
use futures::future::join_all;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// A dependency liveness check
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Key used in the report's `services` map
    fn name(&self) -> &str;

    /// `Err` carries a human-readable reason
    async fn check(&self) -> Result<(), String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Ok,
    Failed,
}

/// Aggregate health, built fresh for every check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub services: BTreeMap<String, ServiceStatus>,
}

impl HealthReport {
    /// Healthy iff every service is ok
    pub fn from_services(services: BTreeMap<String, ServiceStatus>) -> Self {
        let status = if services.values().all(|s| *s == ServiceStatus::Ok) {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        };
        Self { status, services }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

/// Stateless between calls; holds only the probe list
#[derive(Clone)]
pub struct HealthAggregator {
    probes: Vec<Arc<dyn HealthProbe>>,
    probe_timeout: Duration,
}

impl std::fmt::Debug for HealthAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthAggregator")
            .field(
                "probes",
                &self.probes.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("probe_timeout", &self.probe_timeout)
            .finish()
    }
}

impl HealthAggregator {
    pub fn new(probe_timeout: Duration) -> Self {
        Self {
            probes: Vec::new(),
            probe_timeout,
        }
    }

    pub fn with_probe(mut self, probe: impl HealthProbe + 'static) -> Self {
        self.probes.push(Arc::new(probe));
        self
    }

    pub fn add_probe(&mut self, probe: Arc<dyn HealthProbe>) {
        self.probes.push(probe);
    }

    pub fn service_names(&self) -> Vec<String> {
        self.probes.iter().map(|p| p.name().to_string()).collect()
    }

    /// Probe every dependency concurrently
    pub async fn check_all_services(&self) -> HealthReport {
        let mut checks = Vec::with_capacity(self.probes.len());
        for probe in &self.probes {
            checks.push(run_probe(probe.as_ref(), self.probe_timeout));
        }

        HealthReport::from_services(join_all(checks).await.into_iter().collect())
    }
}

/// Run one probe under the timeout; failures are logged, never returned
async fn run_probe(probe: &dyn HealthProbe, timeout: Duration) -> (String, ServiceStatus) {
    let started = Instant::now();
    let outcome = match tokio::time::timeout(timeout, probe.check()).await {
        Ok(result) => result,
        Err(_) => Err(format!("timed out after {}ms", timeout.as_millis())),
    };
    let duration_ms = started.elapsed().as_millis() as u64;

    let status = match outcome {
        Ok(()) => {
            debug!(service = probe.name(), duration_ms, "Health probe passed");
            ServiceStatus::Ok
        }
        Err(reason) => {
            warn!(
                service = probe.name(),
                duration_ms,
                error = %reason,
                "Health probe failed"
            );
            ServiceStatus::Failed
        }
    };
    (probe.name().to_string(), status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Fixed {
        name: &'static str,
        result: Result<(), String>,
        delay: Duration,
    }

    #[async_trait]
    impl HealthProbe for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        async fn check(&self) -> Result<(), String> {
            tokio::time::sleep(self.delay).await;
            self.result.clone()
        }
    }

    fn probe(name: &'static str, result: Result<(), String>) -> Fixed {
        Fixed {
            name,
            result,
            delay: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn all_ok_is_healthy() {
        let report = HealthAggregator::new(Duration::from_secs(1))
            .with_probe(probe("redis", Ok(())))
            .with_probe(probe("database", Ok(())))
            .check_all_services()
            .await;

        assert!(report.is_healthy());
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({"status": "healthy", "services": {"redis": "ok", "database": "ok"}})
        );
    }

    #[tokio::test]
    async fn one_failure_makes_it_unhealthy() {
        let report = HealthAggregator::new(Duration::from_secs(1))
            .with_probe(probe("redis", Err("refused".to_string())))
            .with_probe(probe("database", Ok(())))
            .check_all_services()
            .await;

        assert_eq!(report.status, HealthStatus::Unhealthy);
        assert_eq!(report.services["redis"], ServiceStatus::Failed);
        assert_eq!(report.services["database"], ServiceStatus::Ok);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_probe_times_out_as_failed() {
        let slow = Fixed {
            name: "redis",
            result: Ok(()),
            delay: Duration::from_secs(30),
        };
        let report = HealthAggregator::new(Duration::from_millis(500))
            .with_probe(slow)
            .check_all_services()
            .await;

        assert_eq!(report.services["redis"], ServiceStatus::Failed);
    }

    #[tokio::test]
    async fn no_probes_is_vacuously_healthy() {
        let report = HealthAggregator::new(Duration::from_secs(1))
            .check_all_services()
            .await;
        assert!(report.is_healthy());
        assert!(report.services.is_empty());
    }
}
