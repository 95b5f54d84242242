//! Authoritative in-memory build configuration

use crate::validation::ProjectPatch;
use dashmap::DashMap;
use std::collections::BTreeMap;

/// Project name -> version, the source of truth behind the cache
///
/// Entries are overwritten, never removed. Each key is updated atomically; a
/// multi-project patch is not applied as one atomic step.
#[derive(Debug, Default)]
pub struct BuildConfig {
    entries: DashMap<String, String>,
}

impl BuildConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, project: &str) -> Option<String> {
        self.entries.get(project).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, project: &str) -> bool {
        self.entries.contains_key(project)
    }

    /// Merge a validated patch, returning the patched project names
    pub fn apply(&self, patch: &ProjectPatch) -> Vec<String> {
        patch
            .iter()
            .map(|(project, version)| {
                self.entries.insert(project.to_string(), version.to_string());
                project.to_string()
            })
            .collect()
    }

    /// Configured project names, sorted
    pub fn projects(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for BuildConfig
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ProjectRefSchema;
    use serde_json::json;

    #[test]
    fn apply_overwrites_only_patched_keys() {
        let config: BuildConfig = [("chrome", "120.0"), ("brave-core", "1.60.0")]
            .into_iter()
            .collect();
        let patch = ProjectRefSchema::new(["chrome", "brave-core"], 128)
            .validate(&json!({"brave-core": "3.0.0"}))
            .unwrap();

        assert_eq!(config.apply(&patch), vec!["brave-core".to_string()]);
        assert_eq!(config.get("brave-core").as_deref(), Some("3.0.0"));
        assert_eq!(config.get("chrome").as_deref(), Some("120.0"));
        assert_eq!(config.len(), 2);
    }

    #[test]
    fn projects_are_sorted() {
        let config: BuildConfig = [("chrome", "1"), ("brave-core", "2")].into_iter().collect();
        assert_eq!(config.projects(), vec!["brave-core", "chrome"]);
        assert!(config.get("firefox").is_none());
    }
}
