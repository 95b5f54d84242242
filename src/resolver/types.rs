//! Resolution results

use serde::Serialize;
use std::fmt;

/// Where a resolved version came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RefSource {
    /// Cache hit
    Cache,
    /// Cache miss, served from the build config and written back
    Config,
    /// Cache failed, served from the build config
    Degraded,
    /// Cache failed and the project is not configured; the configured sentinel
    Fallback,
}

impl RefSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefSource::Cache => "cache",
            RefSource::Config => "config",
            RefSource::Degraded => "degraded",
            RefSource::Fallback => "fallback",
        }
    }
}

impl fmt::Display for RefSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of [`VersionResolver::get_project_ref`](super::VersionResolver::get_project_ref)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectRef {
    Found { version: String, source: RefSource },
    /// Absent from both the cache and the build config
    NotConfigured,
    /// The cache failed and the build config has no entry either
    Unavailable,
}

impl ProjectRef {
    pub fn version(&self) -> Option<&str> {
        match self {
            ProjectRef::Found { version, .. } => Some(version),
            _ => None,
        }
    }

    pub fn into_version(self) -> Option<String> {
        match self {
            ProjectRef::Found { version, .. } => Some(version),
            _ => None,
        }
    }

    pub fn source(&self) -> Option<RefSource> {
        match self {
            ProjectRef::Found { source, .. } => Some(*source),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, ProjectRef::Found { .. })
    }
}

/// Result of a successful build-config update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateOutcome {
    /// Patched projects, sorted
    pub updated: Vec<String>,
    /// Cache entries deleted for the patched projects
    pub invalidated: usize,
}
