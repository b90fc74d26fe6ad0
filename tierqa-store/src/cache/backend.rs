//! Key-value backend abstraction for the cache tier

use crate::cache::types::{CacheKey, CacheValue};
use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// A fast key-value store with per-key expiry
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Fetch the value stored under `key`, `None` when absent or expired
    async fn get(&self, key: &str) -> Result<Option<CacheValue>>;

    /// Store `value` under `key`, expiring after `ttl`
    async fn set(&self, key: CacheKey, value: CacheValue, ttl: Duration) -> Result<()>;

    /// Round-trip to the backend to confirm it is reachable
    async fn ping(&self) -> Result<()>;

    /// Short backend name for logs and health reports
    fn name(&self) -> &'static str;
}
