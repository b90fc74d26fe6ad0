//! Process configuration from environment variables
//!
//! A `.env` file in the working directory is loaded first when present.

use anyhow::{anyhow, bail, Context, Result};
use std::str::FromStr;
use std::time::Duration;

use tierqa_store::{CacheConfig, PgConfig, RedisConfig};

use crate::generator::GeminiConfig;

/// Which persistence tier to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

impl FromStr for StoreKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreKind::Postgres),
            "memory" => Ok(StoreKind::Memory),
            other => bail!("unknown store kind '{}' (expected postgres or memory)", other),
        }
    }
}

/// Which cache backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKind {
    Redis,
    Memory,
    None,
}

impl FromStr for CacheKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "redis" => Ok(CacheKind::Redis),
            "memory" => Ok(CacheKind::Memory),
            "none" | "off" => Ok(CacheKind::None),
            other => bail!("unknown cache kind '{}' (expected redis, memory or none)", other),
        }
    }
}

/// Everything needed to assemble the service
///
/// `Debug` output never contains the database password or the API key.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store: StoreKind,
    pub postgres: PgConfig,
    pub cache: CacheKind,
    pub redis: RedisConfig,
    pub cache_config: CacheConfig,
    pub gemini: GeminiConfig,
    pub generator_timeout: Duration,
    pub api_host: String,
    pub api_port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: StoreKind::Postgres,
            postgres: PgConfig::default(),
            cache: CacheKind::Redis,
            redis: RedisConfig::default(),
            cache_config: CacheConfig::default(),
            gemini: GeminiConfig::default(),
            generator_timeout: Duration::from_secs(120),
            api_host: "0.0.0.0".to_string(),
            api_port: 8000,
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(v) = get("TIERQA_STORE") {
            config.store = v.parse::<StoreKind>().context("TIERQA_STORE")?;
        }
        if let Some(v) = get("TIERQA_CACHE") {
            config.cache = v.parse::<CacheKind>().context("TIERQA_CACHE")?;
        }

        if let Some(v) = get("POSTGRES_HOST") {
            config.postgres.host = v;
        }
        if let Some(v) = get("POSTGRES_PORT") {
            config.postgres.port = parse_var("POSTGRES_PORT", &v)?;
        }
        if let Some(v) = get("POSTGRES_USER") {
            config.postgres.user = v;
        }
        if let Some(v) = get("POSTGRES_PASSWORD") {
            config.postgres.password = v;
        }
        if let Some(v) = get("POSTGRES_DB") {
            config.postgres.database = v;
        }

        if let Some(v) = get("REDIS_HOST") {
            config.redis.host = v;
        }
        if let Some(v) = get("REDIS_PORT") {
            config.redis.port = parse_var("REDIS_PORT", &v)?;
        }

        if let Some(v) = get("CACHE_TTL_SECONDS") {
            let secs: u64 = parse_var("CACHE_TTL_SECONDS", &v)?;
            config.cache_config.default_ttl = Duration::from_secs(secs);
        }
        config
            .cache_config
            .validate()
            .map_err(|e| anyhow!("invalid cache configuration: {}", e))?;

        config.gemini.api_key = get("GEMINI_API_KEY");
        if let Some(v) = get("GEMINI_MODEL") {
            config.gemini.model = v;
        }
        if let Some(v) = get("GEMINI_API_BASE") {
            config.gemini.api_base = v;
        }
        if let Some(v) = get("GENERATOR_TIMEOUT_SECONDS") {
            let secs: u64 = parse_var("GENERATOR_TIMEOUT_SECONDS", &v)?;
            if secs == 0 {
                bail!("GENERATOR_TIMEOUT_SECONDS must be greater than 0");
            }
            config.generator_timeout = Duration::from_secs(secs);
            config.gemini.request_timeout = config.generator_timeout;
        }

        if let Some(v) = get("API_HOST") {
            config.api_host = v;
        }
        if let Some(v) = get("API_PORT") {
            config.api_port = parse_var("API_PORT", &v)?;
        }

        Ok(config)
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| anyhow!("invalid value '{}' for {}: {}", value, key, e))
}
