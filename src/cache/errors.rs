//! Cache error types

use thiserror::Error;

/// Errors that can occur during cache operations
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    /// Failed to connect to the cache backend, or the connection dropped
    #[error("Cache connection error: {0}")]
    ConnectionError(String),

    /// Cache operation timed out
    #[error("Cache operation timed out: {0}")]
    Timeout(String),

    /// The backend answered, but not with what we expected
    #[error("Cache backend error: {0}")]
    BackendError(String),

    /// Client could not be constructed from configuration
    #[error("Invalid cache configuration: {0}")]
    InvalidConfig(String),
}

impl CacheError {
    /// Whether this error means the backend is unreachable.
    ///
    /// Only these errors are reported to the reconnect supervisor; a backend
    /// that answers with an unexpected reply is reachable.
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, Self::ConnectionError(_) | Self::Timeout(_))
    }
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_failures_are_classified() {
        assert!(CacheError::ConnectionError("refused".into()).is_connection_failure());
        assert!(CacheError::Timeout("GET".into()).is_connection_failure());
        assert!(!CacheError::BackendError("WRONGTYPE".into()).is_connection_failure());
        assert!(!CacheError::InvalidConfig("bad url".into()).is_connection_failure());
    }

    #[test]
    fn error_display() {
        let err = CacheError::ConnectionError("Connection refused".into());
        assert_eq!(err.to_string(), "Cache connection error: Connection refused");
    }
}
