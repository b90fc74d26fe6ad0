//! # Record Caching Layer
//!
//! This module implements the cache tier that sits in front of the
//! persistence tier.
//!
//! ## Features
//!
//! - **Key Normalization**: questions are trimmed, lower-cased and namespaced
//!   so every casing/whitespace variant maps to one key
//! - **TTL-Based Expiration**: every write-back carries an expiry
//! - **Pluggable Backends**: Redis, or an in-process TTL/LRU store
//! - **Graceful Degradation**: backend faults become misses, failed writes
//!   are dropped, and a tier without a backend simply never hits
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tierqa_store::cache::{CacheConfig, CacheTier, MemoryCache};
//! use tierqa_store::Record;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = CacheConfig::builder()
//!     .default_ttl(Duration::from_secs(3600))
//!     .max_entries(10_000)
//!     .build();
//!
//! let tier = CacheTier::new(Arc::new(MemoryCache::new(&config)), config);
//!
//! let record = Record::new(7, "What is Rust?", None, "A systems language")?;
//! tier.set_default("What is Rust?", &record).await;
//!
//! if let Some(hit) = tier.get("what is rust?").await {
//!     println!("Cache hit: {}", hit.answer());
//! }
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod config;
pub mod entry;
pub mod memory;
pub mod redis;
pub mod tier;
pub mod types;

pub use backend::CacheBackend;
pub use config::{CacheConfig, CacheConfigBuilder, DEFAULT_KEY_PREFIX};
pub use entry::CacheEntry;
pub use memory::{start_auto_cleanup, MemoryCache};
pub use self::redis::{RedisCache, RedisConfig};
pub use tier::CacheTier;
pub use types::{normalize_key, CacheKey, CacheOutcome, CacheStats, CacheValue};
