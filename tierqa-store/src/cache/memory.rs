//! In-process cache backend with TTL expiry and LRU eviction

use crate::cache::{
    backend::CacheBackend,
    config::CacheConfig,
    entry::CacheEntry,
    types::{CacheKey, CacheValue},
};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// In-process cache with TTL support and LRU eviction
///
/// Used when no external key-value store is configured, and in tests.
/// Expired entries are dropped lazily on read and in bulk by
/// [`MemoryCache::cleanup_expired`].
pub struct MemoryCache {
    max_entries: usize,

    store: Arc<RwLock<MemoryStore>>,
}

/// Internal cache storage
#[derive(Default)]
struct MemoryStore {
    /// Main storage: key -> entry
    entries: HashMap<CacheKey, CacheEntry>,

    /// LRU tracking: front is least recently used
    lru_queue: VecDeque<CacheKey>,

    /// Entries dropped because they expired
    evictions_ttl: u64,

    /// Entries dropped to respect `max_entries`
    evictions_size: u64,
}

impl MemoryCache {
    /// Create a new in-process cache sized by `config.max_entries`
    pub fn new(config: &CacheConfig) -> Self {
        info!(
            "Initializing in-process cache (max_entries: {})",
            config.max_entries
        );

        Self {
            max_entries: config.max_entries.max(1),
            store: Arc::new(RwLock::new(MemoryStore::default())),
        }
    }

    /// Number of entries currently held, expired ones included
    pub async fn len(&self) -> usize {
        self.store.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.entries.is_empty()
    }

    /// Entries evicted for expiry and for size, in that order
    pub async fn evictions(&self) -> (u64, u64) {
        let store = self.store.read().await;
        (store.evictions_ttl, store.evictions_size)
    }

    /// Remove all expired entries, returning how many were removed
    pub async fn cleanup_expired(&self) -> usize {
        let mut store = self.store.write().await;

        let expired_keys: Vec<CacheKey> = store
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            Self::remove_entry(&mut store, key);
        }
        store.evictions_ttl += expired_keys.len() as u64;

        if !expired_keys.is_empty() {
            debug!("Cleaned up {} expired entries", expired_keys.len());
        }
        expired_keys.len()
    }

    fn remove_entry(store: &mut MemoryStore, key: &str) {
        if store.entries.remove(key).is_some() {
            store.lru_queue.retain(|k| k != key);
        }
    }

    fn evict_if_needed(&self, store: &mut MemoryStore) {
        while store.entries.len() >= self.max_entries {
            match store.lru_queue.pop_front() {
                Some(key) => {
                    debug!("Evicting entry due to max_entries limit: {}", key);
                    store.entries.remove(&key);
                    store.evictions_size += 1;
                }
                None => break,
            }
        }
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<CacheValue>> {
        let mut store = self.store.write().await;

        let expired = match store.entries.get(key) {
            None => return Ok(None),
            Some(entry) => entry.is_expired(),
        };

        if expired {
            debug!("Cache entry expired: {}", key);
            Self::remove_entry(&mut store, key);
            store.evictions_ttl += 1;
            return Ok(None);
        }

        let value = store.entries.get(key).map(|entry| entry.value.clone());

        store.lru_queue.retain(|k| k != key);
        store.lru_queue.push_back(key.to_string());

        Ok(value)
    }

    async fn set(&self, key: CacheKey, value: CacheValue, ttl: Duration) -> Result<()> {
        let entry = CacheEntry::new(value, ttl);
        let mut store = self.store.write().await;

        if store.entries.contains_key(&key) {
            store.lru_queue.retain(|k| k != &key);
        } else {
            self.evict_if_needed(&mut store);
        }

        store.entries.insert(key.clone(), entry);
        store.lru_queue.push_back(key);
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Background task for automatic cleanup of expired entries
pub async fn start_auto_cleanup(cache: Arc<MemoryCache>, interval: Duration) {
    info!(
        "Starting automatic cache cleanup task (interval: {:?})",
        interval
    );

    loop {
        tokio::time::sleep(interval).await;

        let removed = cache.cleanup_expired().await;
        if removed > 0 {
            debug!("Auto cleanup removed {} entries", removed);
        }
    }
}
