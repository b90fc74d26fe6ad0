//! Configuration for the cache tier

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Namespace tag prepended to every normalized cache key
pub const DEFAULT_KEY_PREFIX: &str = "qa:";

/// Configuration for the cache tier and the in-process backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Time-to-live applied to every write-back
    pub default_ttl: Duration,

    /// Namespace tag for cache keys
    pub key_prefix: String,

    /// Maximum number of entries held by the in-process backend
    pub max_entries: usize,

    /// Enable periodic removal of expired entries in the in-process backend
    pub enable_auto_cleanup: bool,

    /// Interval for automatic cleanup checks
    pub cleanup_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            // 1 hour
            default_ttl: Duration::from_secs(3600),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            max_entries: 10_000,
            enable_auto_cleanup: true,
            // Cleanup every 5 minutes
            cleanup_interval: Duration::from_secs(300),
        }
    }
}

impl CacheConfig {
    /// Create a new builder for cache configuration
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.default_ttl.as_secs() == 0 {
            return Err("default_ttl must be at least one second".to_string());
        }

        if self.max_entries == 0 {
            return Err("max_entries must be greater than 0".to_string());
        }

        if self.key_prefix.chars().any(char::is_whitespace) {
            return Err("key_prefix must not contain whitespace".to_string());
        }

        Ok(())
    }
}

/// Builder for cache configuration
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    default_ttl: Option<Duration>,
    key_prefix: Option<String>,
    max_entries: Option<usize>,
    enable_auto_cleanup: Option<bool>,
    cleanup_interval: Option<Duration>,
}

impl CacheConfigBuilder {
    /// Set the TTL for write-backs
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = Some(ttl);
        self
    }

    /// Set the key namespace tag
    pub fn key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// Set maximum number of in-process cache entries
    pub fn max_entries(mut self, max: usize) -> Self {
        self.max_entries = Some(max);
        self
    }

    /// Enable or disable automatic cleanup
    pub fn enable_auto_cleanup(mut self, enable: bool) -> Self {
        self.enable_auto_cleanup = Some(enable);
        self
    }

    /// Set cleanup interval
    pub fn cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = Some(interval);
        self
    }

    /// Build the configuration with defaults for unset values
    pub fn build(self) -> CacheConfig {
        let defaults = CacheConfig::default();

        CacheConfig {
            default_ttl: self.default_ttl.unwrap_or(defaults.default_ttl),
            key_prefix: self.key_prefix.unwrap_or(defaults.key_prefix),
            max_entries: self.max_entries.unwrap_or(defaults.max_entries),
            enable_auto_cleanup: self
                .enable_auto_cleanup
                .unwrap_or(defaults.enable_auto_cleanup),
            cleanup_interval: self.cleanup_interval.unwrap_or(defaults.cleanup_interval),
        }
    }

    /// Build and validate the configuration
    pub fn build_validated(self) -> Result<CacheConfig, String> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}
