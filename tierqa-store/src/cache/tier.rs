//! Cache tier: record-level get/set over a key-value backend
//!
//! The cache is an optimization, never a dependency for correctness. Every
//! failure on this path is logged, counted and turned into a miss (reads) or
//! dropped (writes).

use crate::cache::{
    backend::CacheBackend,
    config::CacheConfig,
    types::{normalize_key, CacheCounters, CacheOutcome, CacheStats},
};
use crate::schema::Record;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Record cache in front of the persistence tier
pub struct CacheTier {
    backend: Option<Arc<dyn CacheBackend>>,
    /// False only when caching was turned off on purpose
    expected: bool,
    config: CacheConfig,
    counters: CacheCounters,
}

impl CacheTier {
    /// Create a tier over a reachable backend
    pub fn new(backend: Arc<dyn CacheBackend>, config: CacheConfig) -> Self {
        Self {
            backend: Some(backend),
            expected: true,
            config,
            counters: CacheCounters::default(),
        }
    }

    /// Create a tier with no backend: every read misses, every write is a no-op
    pub fn disabled(config: CacheConfig) -> Self {
        Self {
            backend: None,
            expected: false,
            config,
            counters: CacheCounters::default(),
        }
    }

    /// Like [`CacheTier::disabled`], for a backend that was configured but
    /// could not be connected. Health reports count it as a degradation.
    pub fn unavailable(config: CacheConfig) -> Self {
        Self {
            expected: true,
            ..Self::disabled(config)
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    /// Whether a backend was configured, reachable or not
    pub fn is_expected(&self) -> bool {
        self.expected
    }

    /// Name of the configured backend, `"none"` when disabled
    pub fn backend_name(&self) -> &'static str {
        self.backend.as_ref().map_or("none", |b| b.name())
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// TTL applied by [`CacheTier::set_default`]
    pub fn default_ttl(&self) -> Duration {
        self.config.default_ttl
    }

    /// Cache key for `question`
    pub fn key_for(&self, question: &str) -> String {
        normalize_key(&self.config.key_prefix, question)
    }

    /// Look up the record cached for `question`
    ///
    /// Transport faults and undecodable payloads are treated as absent.
    pub async fn get(&self, question: &str) -> Option<Record> {
        let backend = self.backend.as_ref()?;
        let key = self.key_for(question);

        let (outcome, record) = match backend.get(&key).await {
            Ok(Some(payload)) => match serde_json::from_str::<Record>(&payload) {
                Ok(record) => (CacheOutcome::Hit, Some(record)),
                Err(e) => {
                    warn!(key = %key, "Discarding undecodable cache payload: {}", e);
                    (CacheOutcome::Error, None)
                }
            },
            Ok(None) => (CacheOutcome::Miss, None),
            Err(e) => {
                warn!(key = %key, backend = backend.name(), "Cache read failed: {}", e);
                (CacheOutcome::Error, None)
            }
        };

        self.counters.record_read(outcome);
        debug!(key = %key, outcome = %outcome, "Cache lookup");
        record
    }

    /// Store `record` under the key for `question`, expiring after `ttl`
    ///
    /// Fire-and-forget: failures are logged and swallowed.
    pub async fn set(&self, question: &str, record: &Record, ttl: Duration) {
        let Some(backend) = self.backend.as_ref() else {
            return;
        };
        let key = self.key_for(question);

        let payload = match serde_json::to_string(record) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(key = %key, "Failed to serialize record for cache: {}", e);
                self.counters.record_write(false);
                return;
            }
        };

        match backend.set(key.clone(), payload, ttl).await {
            Ok(()) => {
                debug!(key = %key, ttl_secs = ttl.as_secs(), "Cache write");
                self.counters.record_write(true);
            }
            Err(e) => {
                warn!(key = %key, backend = backend.name(), "Cache write failed: {}", e);
                self.counters.record_write(false);
            }
        }
    }

    /// [`CacheTier::set`] with the configured default TTL
    pub async fn set_default(&self, question: &str, record: &Record) {
        self.set(question, record, self.config.default_ttl).await
    }

    /// Whether the backend currently answers; `false` when disabled
    pub async fn is_reachable(&self) -> bool {
        match self.backend.as_ref() {
            Some(backend) => match backend.ping().await {
                Ok(()) => true,
                Err(e) => {
                    warn!(backend = backend.name(), "Cache ping failed: {}", e);
                    false
                }
            },
            None => false,
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }
}
