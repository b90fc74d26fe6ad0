use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use tierqa_store::{
    schema::ensure_schema, CacheStats, CacheTier, HealthCheckResult, HealthStatus, MemoryCache,
    MemoryRecordStore, PgClient, Record, RecordStore, RedisCache,
};

use crate::config::{AppConfig, CacheKind, StoreKind};
use crate::error::AskError;
use crate::generator::{AnswerGenerator, GeminiGenerator};
use crate::parser::parse_generated;

/// Which tier produced an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Cache,
    Db,
    Llm,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Cache => write!(f, "cache"),
            Source::Db => write!(f, "db"),
            Source::Llm => write!(f, "llm"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AskResponse {
    pub source: Source,
    pub record: Record,
    pub message: String,
}

impl AskResponse {
    fn new(source: Source, record: Record) -> Self {
        Self {
            source,
            message: record.to_message(),
            record,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Upper bound on one generator call
    pub generator_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            generator_timeout: Duration::from_secs(120),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheHealth {
    pub backend: &'static str,
    /// False when caching is turned off by configuration
    pub expected: bool,
    pub enabled: bool,
    pub reachable: bool,
    pub stats: CacheStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub database: HealthCheckResult,
    pub cache: CacheHealth,
    pub generator: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthReport {
    pub fn http_status_code(&self) -> u16 {
        self.status.to_http_status_code()
    }
}

/// Resolves questions through cache, database and language model, in that order
pub struct Orchestrator {
    cache: Arc<CacheTier>,
    store: Arc<dyn RecordStore>,
    generator: Arc<dyn AnswerGenerator>,
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(
        cache: Arc<CacheTier>,
        store: Arc<dyn RecordStore>,
        generator: Arc<dyn AnswerGenerator>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            cache,
            store,
            generator,
            config,
        }
    }

    /// Build every tier from configuration
    ///
    /// An unreachable cache degrades to an unavailable tier and an unreachable
    /// database only logs a warning; neither stops start-up.
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let store: Arc<dyn RecordStore> = match config.store {
            StoreKind::Postgres => {
                let client = PgClient::connect(config.postgres.clone())
                    .await
                    .context("Failed to configure Postgres client")?;
                if let Err(e) = ensure_schema(client.pool()).await {
                    warn!("Could not ensure record table, continuing: {}", e);
                }
                Arc::new(client)
            }
            StoreKind::Memory => {
                info!("Using in-memory record store");
                Arc::new(MemoryRecordStore::new())
            }
        };

        let cache = match config.cache {
            CacheKind::Redis => match RedisCache::connect(&config.redis).await {
                Ok(redis) => CacheTier::new(Arc::new(redis), config.cache_config.clone()),
                Err(e) => {
                    warn!("Redis unavailable, running without cache: {}", e);
                    CacheTier::unavailable(config.cache_config.clone())
                }
            },
            CacheKind::Memory => {
                let memory = Arc::new(MemoryCache::new(&config.cache_config));
                if config.cache_config.enable_auto_cleanup {
                    tokio::spawn(tierqa_store::cache::start_auto_cleanup(
                        memory.clone(),
                        config.cache_config.cleanup_interval,
                    ));
                }
                CacheTier::new(memory, config.cache_config.clone())
            }
            CacheKind::None => {
                info!("Cache disabled by configuration");
                CacheTier::disabled(config.cache_config.clone())
            }
        };

        let generator = GeminiGenerator::new(config.gemini.clone())
            .context("Failed to build Gemini client")?;
        if !generator.is_configured() {
            warn!(
                "GEMINI_API_KEY is not set; questions missing from cache and database will fail"
            );
        }

        Ok(Self::new(
            Arc::new(cache),
            store,
            Arc::new(generator),
            OrchestratorConfig {
                generator_timeout: config.generator_timeout,
            },
        ))
    }

    /// Answer `question` from the cheapest tier that has it
    ///
    /// Lower tiers are back-filled after a miss. Back-fill failures are
    /// logged and never fail the call.
    pub async fn ask(&self, question: &str) -> Result<AskResponse, AskError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AskError::InputInvalid(
                "question must not be empty".to_string(),
            ));
        }

        if let Some(record) = self.cache.get(question).await {
            debug!("Answered from cache");
            return Ok(AskResponse::new(Source::Cache, record));
        }

        match self.store.find_by_title(question).await {
            Ok(Some(record)) => {
                debug!("Answered from database");
                self.cache.set_default(question, &record).await;
                return Ok(AskResponse::new(Source::Db, record));
            }
            Ok(None) => {}
            Err(e) if e.is_connection_failure() => {
                error!("Database unreachable: {}", e);
                return Err(AskError::StorageUnavailable);
            }
            Err(e) => warn!("Database lookup failed, treating as miss: {}", e),
        }

        let raw = self.generate(question).await?;
        let record = parse_generated(&raw, question).map_err(|e| {
            error!("Could not parse model reply: {}", e);
            AskError::from(e)
        })?;

        if let Err(e) = self.store.upsert(&record).await {
            warn!("Failed to persist generated record: {}", e);
        }
        self.cache.set_default(question, &record).await;

        info!(score = record.score(), "Answered from language model");
        Ok(AskResponse::new(Source::Llm, record))
    }

    async fn generate(&self, question: &str) -> Result<String, AskError> {
        let timeout = self.config.generator_timeout;
        match tokio::time::timeout(timeout, self.generator.generate(question)).await {
            Ok(Ok(raw)) => Ok(raw),
            Ok(Err(e)) => {
                error!(generator = self.generator.name(), "Generation failed: {}", e);
                Err(e.into())
            }
            Err(_) => {
                error!(
                    generator = self.generator.name(),
                    "Generation timed out after {:?}",
                    timeout
                );
                Err(AskError::UpstreamConnectivityFailure(format!(
                    "no reply within {}s",
                    timeout.as_secs()
                )))
            }
        }
    }

    /// Database health, cache reachability and cache counters
    ///
    /// A configured cache that does not answer degrades the report; a cache
    /// turned off by configuration does not.
    pub async fn health(&self) -> HealthReport {
        let database = self.store.health().await;
        let reachable = self.cache.is_reachable().await;

        let mut status = database.status;
        if self.cache.is_expected() && !reachable {
            status = status.worst(HealthStatus::Degraded);
        }

        HealthReport {
            status,
            database,
            cache: CacheHealth {
                backend: self.cache.backend_name(),
                expected: self.cache.is_expected(),
                enabled: self.cache.is_enabled(),
                reachable,
                stats: self.cache.stats(),
            },
            generator: self.generator.name().to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn cache(&self) -> &CacheTier {
        &self.cache
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }
}
