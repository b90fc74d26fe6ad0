//! # tierqa-store
//!
//! Cache and persistence tiers for the tierqa question-answering service.
//!
//! ## Features
//!
//! - Validated, immutable [`Record`] answer unit
//! - Cache tier with key normalization, TTL and graceful degradation
//! - Redis and in-process cache backends
//! - Postgres persistence tier with case-insensitive lookup and idempotent upsert
//! - Two-method health check with retry and degraded state detection
//!
//! ## Persistence Tier
//!
//! ```no_run
//! use tierqa_store::{PgClient, PgConfig, Record, RecordStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = PgClient::connect(PgConfig {
//!         host: "localhost".to_string(),
//!         ..PgConfig::default()
//!     })
//!     .await?;
//!
//!     let record = Record::new(8, "What is Rust?", None, "A systems language")?;
//!     client.upsert(&record).await?;
//!
//!     let found = client.find_by_title("WHAT IS RUST?").await?;
//!     assert_eq!(found, Some(record));
//!     Ok(())
//! }
//! ```
//!
//! ## Health Check with Retry
//!
//! ```no_run
//! use tierqa_store::{PgClient, PgConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = PgClient::connect(PgConfig::default()).await?;
//!
//!     let result = client.health_check_with_retry().await;
//!     if result.status.is_operational() {
//!         println!("Database is operational ({}ms)", result.response_time_ms);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod connection;
pub mod error;
pub mod schema;
pub mod store;

// Re-export main types for convenience
pub use cache::{
    normalize_key, CacheBackend, CacheConfig, CacheConfigBuilder, CacheStats, CacheTier,
    MemoryCache, RedisCache, RedisConfig,
};
pub use connection::{
    HealthCheckConfig, HealthCheckMethod, HealthCheckResult, HealthStatus, PgClient, PgConfig,
};
pub use error::{Result, StoreError};
pub use schema::{Record, RecordError};
pub use store::{MemoryRecordStore, RecordStore};
