//! # CLI Commands
//!
//! Implementations behind `version-checker show|update|health`. Output goes to
//! caller-supplied writers so the binary prints to stdout/stderr and tests
//! capture buffers.

use crate::cache::CacheService;
use crate::health::HealthAggregator;
use crate::resolver::VersionResolver;
use std::io::{self, Write};

/// Print `<project>: <version>` for each project, or for every configured one
pub async fn show<C: CacheService>(
    resolver: &VersionResolver<C>,
    projects: &[String],
    out: &mut impl Write,
) -> io::Result<()> {
    let projects = if projects.is_empty() {
        resolver.build_config().projects()
    } else {
        projects.to_vec()
    };

    for project in &projects {
        match resolver.get_project_ref(project).await.into_version() {
            Some(version) => writeln!(out, "{project}: {version}")?,
            None => writeln!(out, "{project}: not found")?,
        }
    }
    Ok(())
}

/// Apply a single-project update; returns whether it was accepted
pub async fn update<C: CacheService>(
    resolver: &VersionResolver<C>,
    project: &str,
    version: &str,
    out: &mut impl Write,
    err: &mut impl Write,
) -> io::Result<bool> {
    match resolver.update_project(project, version).await {
        Ok(_) => {
            writeln!(out, "[INFO] {project} updated to {}", version.trim())?;
            Ok(true)
        }
        Err(e) => {
            writeln!(err, "[ERROR] {e}")?;
            Ok(false)
        }
    }
}

/// Print the health report as JSON; returns whether everything is healthy
pub async fn health(aggregator: &HealthAggregator, out: &mut impl Write) -> io::Result<bool> {
    let report = aggregator.check_all_services().await;
    let rendered = serde_json::to_string_pretty(&report).map_err(io::Error::other)?;
    writeln!(out, "{rendered}")?;
    Ok(report.is_healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::NoOpCacheService;
    use crate::config::VersionCheckerConfig;
    use crate::health::CacheProbe;
    use std::time::Duration;

    fn resolver() -> VersionResolver<NoOpCacheService> {
        let mut config = VersionCheckerConfig::default();
        config.projects.insert("chrome".to_string(), "120.0".to_string());
        config.projects.insert("brave-core".to_string(), "1.60.0".to_string());
        VersionResolver::from_config(NoOpCacheService::new(), &config)
    }

    #[tokio::test]
    async fn show_lists_all_configured_projects() {
        let mut out = Vec::new();
        show(&resolver(), &[], &mut out).await.unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "brave-core: 1.60.0\nchrome: 120.0\n"
        );
    }

    #[tokio::test]
    async fn show_reports_missing_projects() {
        let mut out = Vec::new();
        show(&resolver(), &["firefox".to_string()], &mut out)
            .await
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "firefox: not found\n");
    }

    #[tokio::test]
    async fn update_prints_outcome() {
        let resolver = resolver();
        let (mut out, mut err) = (Vec::new(), Vec::new());

        assert!(update(&resolver, "brave-core", "3.0.0", &mut out, &mut err)
            .await
            .unwrap());
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "[INFO] brave-core updated to 3.0.0\n"
        );

        let mut out = Vec::new();
        assert!(!update(&resolver, "brave-core", "", &mut out, &mut err)
            .await
            .unwrap());
        let err = String::from_utf8(err).unwrap();
        assert!(err.starts_with("[ERROR] "));
        assert!(err.contains("version is empty"));
        assert_eq!(resolver.build_config().get("brave-core").as_deref(), Some("3.0.0"));
    }

    #[tokio::test]
    async fn health_prints_json() {
        let aggregator = HealthAggregator::new(Duration::from_secs(1))
            .with_probe(CacheProbe::new(NoOpCacheService::new()));
        let mut out = Vec::new();

        assert!(health(&aggregator, &mut out).await.unwrap());
        let report: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(report["status"], "healthy");
        assert_eq!(report["services"]["redis"], "ok");
    }
}
