//! In-process cache entry with TTL support

use crate::cache::types::CacheValue;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// A cached value and the instant it stops being served
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: CacheValue,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Create a new cache entry that expires `ttl` from now
    pub fn new(value: CacheValue, ttl: Duration) -> Self {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::seconds(3600));

        Self {
            value,
            expires_at: Utc::now() + ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}
