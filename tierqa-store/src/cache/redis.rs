//! Redis cache backend

use crate::cache::{
    backend::CacheBackend,
    types::{CacheKey, CacheValue},
};
use crate::error::{Result, StoreError};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::fmt;
use std::time::Duration;
use tracing::info;

/// Connection settings for the Redis backend
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    /// Logical database index
    pub db: i64,
    /// Upper bound on the initial connection, retries included
    pub connect_timeout: Duration,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: "redis_cache".to_string(),
            port: 6379,
            db: 0,
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl RedisConfig {
    fn url(&self) -> String {
        format!("redis://{}:{}/{}", self.host, self.port, self.db)
    }
}

/// Redis-backed cache using a multiplexed, auto-reconnecting connection
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
    endpoint: String,
}

impl fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCache")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl RedisCache {
    /// Connect and confirm the server answers `PING`
    ///
    /// Fails when the server cannot be reached; callers are expected to fall
    /// back to a disabled cache tier rather than abort.
    pub async fn connect(config: &RedisConfig) -> Result<Self> {
        let endpoint = format!("{}:{}", config.host, config.port);
        info!("Connecting to Redis at {} (db: {})", endpoint, config.db);

        let client = redis::Client::open(config.url())
            .map_err(|e| StoreError::ConfigError(e.to_string()))?;
        let conn = tokio::time::timeout(config.connect_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| StoreError::TimeoutError {
                timeout_seconds: config.connect_timeout.as_secs(),
                context: format!("connecting to Redis at {}", endpoint),
            })??;

        let cache = Self { conn, endpoint };
        cache.ping().await?;

        info!("Successfully connected to Redis");
        Ok(cache)
    }
}

#[async_trait]
impl CacheBackend for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<CacheValue>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: CacheKey, value: CacheValue, ttl: Duration) -> Result<()> {
        let mut conn = self.conn.clone();
        // SET EX rejects a zero expiry
        let seconds = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(key, value, seconds).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        if pong == "PONG" {
            Ok(())
        } else {
            Err(StoreError::CacheBackendError(format!(
                "unexpected PING reply: {}",
                pong
            )))
        }
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
