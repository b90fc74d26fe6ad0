//! Error types for storage operations
//!
//! This module defines the error type shared by the cache tier and the
//! persistence tier. Connection failures are kept apart from query failures
//! because callers treat them differently: a store that cannot be reached at
//! all is a hard failure, a failed query is just a miss.

use crate::schema::RecordError;
use thiserror::Error;

/// Main error type for storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Connection error - a fresh connection could not be established
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Query execution error
    #[error("Query error: {0}")]
    QueryError(String),

    /// Operation timeout
    #[error("Operation timed out after {timeout_seconds}s: {context}")]
    TimeoutError {
        timeout_seconds: u64,
        context: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Serialization/Deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Cache backend error (anything the key-value store reports that is not a connection fault)
    #[error("Cache backend error: {0}")]
    CacheBackendError(String),

    /// A stored row or cached payload violates the record invariants
    #[error("Invalid record: {0}")]
    InvalidRecord(#[from] RecordError),

    /// Generic error with context
    #[error("Error: {0}")]
    Other(String),
}

impl StoreError {
    /// Whether this error means the backing store could not be reached at all
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, StoreError::ConnectionError(_))
    }
}

/// Result type alias for storage operations
pub type Result<T> = std::result::Result<T, StoreError>;

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => StoreError::ConnectionError(e.to_string()),
            sqlx::Error::Configuration(_) => StoreError::ConfigError(e.to_string()),
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                StoreError::SerializationError(e.to_string())
            }
            other => StoreError::QueryError(other.to_string()),
        }
    }
}

impl From<redis::RedisError> for StoreError {
    fn from(e: redis::RedisError) -> Self {
        if e.is_connection_refusal() || e.is_connection_dropped() || e.is_io_error() {
            StoreError::ConnectionError(e.to_string())
        } else if e.is_timeout() {
            StoreError::TimeoutError {
                timeout_seconds: 0,
                context: e.to_string(),
            }
        } else {
            StoreError::CacheBackendError(e.to_string())
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::SerializationError(e.to_string())
    }
}

impl From<String> for StoreError {
    fn from(s: String) -> Self {
        StoreError::Other(s)
    }
}

impl From<&str> for StoreError {
    fn from(s: &str) -> Self {
        StoreError::Other(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = StoreError::ConnectionError("Failed to connect".to_string());
        assert_eq!(error.to_string(), "Connection error: Failed to connect");

        let timeout_error = StoreError::TimeoutError {
            timeout_seconds: 5,
            context: "health check".to_string(),
        };
        assert!(timeout_error.to_string().contains("timed out after 5s"));
    }

    #[test]
    fn test_error_conversion() {
        let error: StoreError = "test error".into();
        assert!(matches!(error, StoreError::Other(_)));

        let error: StoreError = "test error".to_string().into();
        assert!(matches!(error, StoreError::Other(_)));
    }

    #[test]
    fn test_sqlx_pool_errors_are_connection_failures() {
        let error: StoreError = sqlx::Error::PoolTimedOut.into();
        assert!(error.is_connection_failure());

        let error: StoreError = sqlx::Error::RowNotFound.into();
        assert!(!error.is_connection_failure());
        assert!(matches!(error, StoreError::QueryError(_)));
    }

    #[test]
    fn test_serde_errors_are_serialization_errors() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let error: StoreError = parse_err.into();
        assert!(matches!(error, StoreError::SerializationError(_)));
    }
}
