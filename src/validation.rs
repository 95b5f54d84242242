//! Project-reference schema
//!
//! Validates build-config patches before they reach the resolver. A patch is
//! a JSON object mapping project names to version strings; every violation
//! is collected so a caller sees all problems at once.

use crate::config::VersionCheckerConfig;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Maximum length of a project name
const MAX_PROJECT_NAME_LEN: usize = 64;

/// Names that collide with fields of the version listing
pub const RESERVED_PROJECT_NAMES: &[&str] = &["timestamp"];

/// A patch rejected by [`ProjectRefSchema::validate`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .violations.join("; "))]
pub struct ValidationError {
    violations: Vec<String>,
}

impl ValidationError {
    pub fn new(violations: Vec<String>) -> Self {
        Self { violations }
    }

    pub fn violations(&self) -> &[String] {
        &self.violations
    }
}

/// A patch that passed validation; values are trimmed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPatch(BTreeMap<String, String>);

impl ProjectPatch {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn projects(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }
}

/// Schema for build-config patches
///
/// An empty recognized set accepts any well-formed project name.
#[derive(Debug, Clone)]
pub struct ProjectRefSchema {
    projects: BTreeSet<String>,
    max_version_len: usize,
}

impl ProjectRefSchema {
    pub fn new<I, S>(projects: I, max_version_len: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            projects: projects.into_iter().map(Into::into).collect(),
            max_version_len,
        }
    }

    pub fn from_config(config: &VersionCheckerConfig) -> Self {
        Self::new(
            config.recognized_projects(),
            config.validation.max_version_len,
        )
    }

    pub fn is_recognized(&self, project: &str) -> bool {
        self.projects.is_empty() || self.projects.contains(project)
    }

    /// Validate a JSON patch
    pub fn validate(&self, input: &Value) -> Result<ProjectPatch, ValidationError> {
        let Value::Object(map) = input else {
            return Err(ValidationError::new(vec![format!(
                "patch must be a JSON object, got {}",
                json_type_name(input)
            )]));
        };

        if map.is_empty() {
            return Err(ValidationError::new(vec!["patch is empty".to_string()]));
        }

        let mut violations = Vec::new();
        let mut accepted = BTreeMap::new();

        for (project, value) in map {
            let mut ok = true;

            if is_reserved_project_name(project) {
                violations.push(format!("'{project}': reserved project name"));
                ok = false;
            } else if !is_valid_project_name(project) {
                violations.push(format!("'{project}': invalid project name"));
                ok = false;
            } else if !self.is_recognized(project) {
                violations.push(format!("'{project}': unknown project"));
                ok = false;
            }

            match value {
                Value::String(version) => {
                    if let Err(reason) = self.check_version(version) {
                        violations.push(format!("'{project}': {reason}"));
                        ok = false;
                    } else if ok {
                        accepted.insert(project.clone(), version.trim().to_string());
                    }
                }
                other => violations.push(format!(
                    "'{project}': version must be a string, got {}",
                    json_type_name(other)
                )),
            }
        }

        if violations.is_empty() {
            Ok(ProjectPatch(accepted))
        } else {
            Err(ValidationError::new(violations))
        }
    }

    fn check_version(&self, version: &str) -> Result<(), String> {
        let version = version.trim();
        if version.is_empty() {
            return Err("version is empty".to_string());
        }
        if version.chars().count() > self.max_version_len {
            return Err(format!(
                "version longer than {} characters",
                self.max_version_len
            ));
        }
        if let Some(c) = version.chars().find(|c| !is_version_char(*c)) {
            return Err(format!("version contains invalid character '{c}'"));
        }
        Ok(())
    }
}

fn is_version_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '+' | '-')
}

pub(crate) fn is_reserved_project_name(name: &str) -> bool {
    RESERVED_PROJECT_NAMES.contains(&name)
}

pub(crate) fn is_valid_project_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_PROJECT_NAME_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
