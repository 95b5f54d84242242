//! Configuration Loader
//!
//! Environment-aware configuration loading. Sources are layered, later ones
//! winning:
//!
//! 1. Built-in defaults (`VersionCheckerConfig::default`)
//! 2. `config/version-checker.toml`
//! 3. `config/version-checker.<environment>.toml`
//! 4. `VERSION_CHECKER__SECTION__KEY` environment variables
//! 5. `REDIS_URL` and `PORT`

use super::error::{ConfigResult, ConfigurationError};
use super::VersionCheckerConfig;
use crate::constants::env;
use ::config::{Config, Environment, File, FileFormat};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const BASE_FILE_STEM: &str = "version-checker";

/// Loaded, validated configuration plus where it came from
#[derive(Debug)]
pub struct ConfigManager {
    config: VersionCheckerConfig,
    environment: String,
    config_directory: PathBuf,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        Self::load_from_directory(None)
    }

    /// Load configuration from a specific directory
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> ConfigResult<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load configuration from a specific directory with explicit environment
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let config_directory = config_dir.unwrap_or_else(Self::default_config_directory);
        let files = vec![
            (config_directory.join(format!("{BASE_FILE_STEM}.toml")), false),
            (
                config_directory.join(format!("{BASE_FILE_STEM}.{environment}.toml")),
                false,
            ),
        ];

        Self::assemble(files, config_directory, environment, Self::process_env()).map(Arc::new)
    }

    /// Load configuration from one explicit file (e.g. `--config`)
    ///
    /// Unlike directory discovery, a missing file is an error here.
    pub fn load_from_file(path: &Path) -> ConfigResult<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_from_file_with_env(path, &environment)
    }

    /// Load one explicit file with explicit environment
    pub fn load_from_file_with_env(
        path: &Path,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        if !path.is_file() {
            return Err(ConfigurationError::config_file_not_found(path));
        }

        let config_directory = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Self::assemble(
            vec![(path.to_path_buf(), true)],
            config_directory,
            environment,
            Self::process_env(),
        )
        .map(Arc::new)
    }

    /// Wrap an already-built configuration (tests, embedding)
    pub fn from_config(config: VersionCheckerConfig) -> ConfigResult<Arc<ConfigManager>> {
        config.validate()?;
        Ok(Arc::new(ConfigManager {
            environment: config.environment.clone(),
            config,
            config_directory: Self::default_config_directory(),
        }))
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &VersionCheckerConfig {
        &self.config
    }

    /// Environment the configuration was loaded for
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Directory the configuration files were looked up in
    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    /// Sanitized configuration for debugging/logging
    pub fn debug_config(&self) -> serde_json::Value {
        Self::sanitize_config_for_logging(&self.config)
    }

    /// Detect the deployment environment
    pub fn detect_environment() -> String {
        std::env::var(env::ENVIRONMENT)
            .or_else(|_| std::env::var(env::APP_ENV))
            .unwrap_or_else(|_| "development".to_string())
    }

    fn default_config_directory() -> PathBuf {
        PathBuf::from("config")
    }

    fn process_env() -> HashMap<String, String> {
        std::env::vars().collect()
    }

    /// Layer every source and validate the result
    fn assemble(
        files: Vec<(PathBuf, bool)>,
        config_directory: PathBuf,
        environment: &str,
        env_vars: HashMap<String, String>,
    ) -> ConfigResult<ConfigManager> {
        debug!(
            environment = environment,
            directory = %config_directory.display(),
            "Loading configuration"
        );

        let mut builder = Config::builder();
        for (path, required) in &files {
            if path.is_file() {
                debug!(file = %path.display(), "Adding configuration file");
            }
            builder = builder.add_source(
                File::from(path.as_path())
                    .format(FileFormat::Toml)
                    .required(*required),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix(env::CONFIG_PREFIX)
                .separator("__")
                .try_parsing(true)
                .ignore_empty(true)
                .source(Some(env_vars.clone())),
        );

        builder = builder
            .set_override("environment", environment)
            .map_err(|e| ConfigurationError::environment_override("environment", e.to_string()))?;

        if let Some(url) = env_vars.get(env::REDIS_URL).filter(|v| !v.is_empty()) {
            builder = builder
                .set_override("cache.url", url.as_str())
                .map_err(|e| ConfigurationError::environment_override(env::REDIS_URL, e.to_string()))?;
        }

        if let Some(port) = env_vars.get(env::PORT).filter(|v| !v.is_empty()) {
            let port: u16 = port.parse().map_err(|_| {
                ConfigurationError::environment_override(
                    env::PORT,
                    format!("'{port}' is not a valid port number"),
                )
            })?;
            builder = builder
                .set_override("server.port", i64::from(port))
                .map_err(|e| ConfigurationError::environment_override(env::PORT, e.to_string()))?;
        }

        let source_name = files
            .iter()
            .map(|(p, _)| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");

        let config: VersionCheckerConfig = builder
            .build()
            .map_err(|e| ConfigurationError::load_error(&source_name, e))?
            .try_deserialize()
            .map_err(|e| ConfigurationError::load_error(&source_name, e))?;

        config.validate()?;

        debug!(
            "Configuration loaded: {}",
            serde_json::to_string(&Self::sanitize_config_for_logging(&config))
                .unwrap_or_else(|_| "[serialization error]".to_string())
        );
        info!(
            environment = environment,
            projects = config.projects.len(),
            cache_enabled = config.cache.enabled,
            "Configuration loaded successfully"
        );

        Ok(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory,
        })
    }

    /// Mask credentials embedded in connection URLs
    fn sanitize_config_for_logging(config: &VersionCheckerConfig) -> serde_json::Value {
        let mut sanitized = config.clone();
        sanitized.cache.url = crate::cache::providers::redis::redact_url(&sanitized.cache.url);
        sanitized.database.url = sanitized
            .database
            .url
            .as_deref()
            .map(crate::cache::providers::redis::redact_url);
        serde_json::to_value(&sanitized).unwrap_or(serde_json::Value::Null)
    }
}
