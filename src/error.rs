//! Crate-level error type

use crate::cache::CacheError;
use crate::config::ConfigurationError;
use crate::validation::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VersionError {
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Server error: {0}")]
    Server(String),
}

impl VersionError {
    pub fn is_validation(&self) -> bool {
        matches!(self, VersionError::Validation(_))
    }
}

impl From<sqlx::Error> for VersionError {
    fn from(err: sqlx::Error) -> Self {
        VersionError::Database(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, VersionError>;
