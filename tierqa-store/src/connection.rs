//! Postgres connection management and health check implementation
//!
//! This module provides the persistence-tier client, including a
//! two-method health check with retry and degraded-state detection.

use crate::error::{Result, StoreError};
use crate::schema::{self, Record};
use crate::store::RecordStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{PgPool, Row};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Connection settings for the Postgres store
#[derive(Clone)]
pub struct PgConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    /// Upper bound on pooled connections
    pub max_connections: u32,
    /// How long to wait for a fresh connection before reporting the store unreachable
    pub acquire_timeout: Duration,
}

impl Default for PgConfig {
    fn default() -> Self {
        Self {
            host: "postgres".to_string(),
            port: 5432,
            user: "admin".to_string(),
            password: "admin123".to_string(),
            database: "mydatabase".to_string(),
            max_connections: 16,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

impl fmt::Debug for PgConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("database", &self.database)
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout", &self.acquire_timeout)
            .finish()
    }
}

impl PgConfig {
    fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
    }
}

/// Configuration for health check behavior
#[derive(Debug, Clone)]
pub struct HealthCheckConfig {
    /// Health check method to use
    pub method: HealthCheckMethod,
    /// Timeout for a single health check query
    pub timeout: Duration,
    /// Whether to enable retry logic
    pub enable_retries: bool,
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Delay between retry attempts
    pub retry_delay: Duration,
    /// Response time threshold for degraded state (in milliseconds)
    pub degraded_threshold_ms: u64,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            method: HealthCheckMethod::Simple,
            timeout: Duration::from_secs(5),
            enable_retries: true,
            max_retries: 2,
            retry_delay: Duration::from_millis(500),
            degraded_threshold_ms: 1000,
        }
    }
}

/// Health check method variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthCheckMethod {
    /// `SELECT 1` (fastest, minimal overhead)
    Simple,
    /// `SELECT current_database()` (reports which database answered)
    Detailed,
}

/// Health status enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    /// Store is healthy and responsive
    Healthy,
    /// Store is responsive but slow, or an optional dependency is down
    Degraded,
    /// Store is not responsive or erroring
    Unhealthy,
}

impl HealthStatus {
    /// Convert to HTTP status code equivalent
    pub fn to_http_status_code(&self) -> u16 {
        match self {
            HealthStatus::Healthy => 200,
            HealthStatus::Degraded => 200,
            HealthStatus::Unhealthy => 503,
        }
    }

    /// Check if status is healthy or degraded (operational)
    pub fn is_operational(&self) -> bool {
        matches!(self, HealthStatus::Healthy | HealthStatus::Degraded)
    }

    /// The worse of two statuses
    pub fn worst(self, other: HealthStatus) -> HealthStatus {
        use HealthStatus::*;
        match (self, other) {
            (Unhealthy, _) | (_, Unhealthy) => Unhealthy,
            (Degraded, _) | (_, Degraded) => Degraded,
            _ => Healthy,
        }
    }
}

/// Detailed health check result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    /// Overall health status
    pub status: HealthStatus,
    /// Response time in milliseconds
    pub response_time_ms: u64,
    /// Database name (if available)
    pub database_name: Option<String>,
    /// Timestamp of the health check
    pub timestamp: DateTime<Utc>,
    /// Error message (if unhealthy)
    pub error: Option<String>,
    /// Health check method used
    pub check_method: HealthCheckMethod,
    /// Number of retry attempts made
    pub retry_count: u32,
}

impl HealthCheckResult {
    /// Create a healthy result, degraded when slower than the threshold
    pub fn healthy(
        response_time: Duration,
        database_name: Option<String>,
        method: HealthCheckMethod,
        degraded_threshold_ms: u64,
    ) -> Self {
        let response_time_ms = response_time.as_millis() as u64;
        let status = if response_time_ms > degraded_threshold_ms {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };

        Self {
            status,
            response_time_ms,
            database_name,
            timestamp: Utc::now(),
            error: None,
            check_method: method,
            retry_count: 0,
        }
    }

    /// Create an unhealthy result
    pub fn unhealthy(response_time: Duration, error: &str, method: HealthCheckMethod) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            response_time_ms: response_time.as_millis() as u64,
            database_name: None,
            timestamp: Utc::now(),
            error: Some(error.to_string()),
            check_method: method,
            retry_count: 0,
        }
    }

    fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }
}

/// Postgres client backing the persistence tier
pub struct PgClient {
    pool: PgPool,
    health_config: HealthCheckConfig,
}

impl PgClient {
    /// Create a client with the default health check configuration
    ///
    /// The pool connects lazily: construction never blocks on the database,
    /// so a process can start while Postgres is still coming up. Reachability
    /// is reported by the health checks and by every query.
    ///
    /// # Example
    /// ```no_run
    /// use tierqa_store::{PgClient, PgConfig};
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let client = PgClient::connect(PgConfig::default()).await?;
    ///     let healthy = client.health_check().await?;
    ///     println!("Database healthy: {}", healthy);
    ///     Ok(())
    /// }
    /// ```
    pub async fn connect(config: PgConfig) -> Result<Self> {
        Self::with_health_config(config, HealthCheckConfig::default()).await
    }

    /// Create a client with a custom health check configuration
    pub async fn with_health_config(
        config: PgConfig,
        health_config: HealthCheckConfig,
    ) -> Result<Self> {
        if config.max_connections == 0 {
            return Err(StoreError::ConfigError(
                "max_connections must be greater than 0".to_string(),
            ));
        }

        info!(
            "Connecting to Postgres at {}:{} (database: {})",
            config.host, config.port, config.database
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_lazy_with(config.connect_options());

        Ok(Self {
            pool,
            health_config,
        })
    }

    /// Simple health check using `SELECT 1`
    ///
    /// # Returns
    /// * `Ok(true)` if the database answered
    /// * `Err(StoreError)` if it did not
    pub async fn health_check(&self) -> Result<bool> {
        debug!("Executing simple health check (SELECT 1)");

        let timeout = self.health_config.timeout;
        tokio::time::timeout(timeout, sqlx::query("SELECT 1").execute(&self.pool))
            .await
            .map_err(|_| StoreError::TimeoutError {
                timeout_seconds: timeout.as_secs(),
                context: "health check".to_string(),
            })??;

        debug!("Simple health check passed");
        Ok(true)
    }

    /// Detailed health check using `SELECT current_database()`
    ///
    /// Never fails: every error is captured in the returned result.
    pub async fn health_check_detailed(&self) -> HealthCheckResult {
        debug!("Executing detailed health check (SELECT current_database())");
        let start = Instant::now();
        let timeout = self.health_config.timeout;

        let query = sqlx::query("SELECT current_database() AS name").fetch_one(&self.pool);

        match tokio::time::timeout(timeout, query).await {
            Ok(Ok(row)) => {
                let elapsed = start.elapsed();
                let db_name: Option<String> = row.try_get("name").ok();
                debug!("Detailed health check passed ({}ms)", elapsed.as_millis());

                HealthCheckResult::healthy(
                    elapsed,
                    db_name,
                    HealthCheckMethod::Detailed,
                    self.health_config.degraded_threshold_ms,
                )
            }
            Ok(Err(e)) => {
                error!("Detailed health check query failed: {}", e);
                HealthCheckResult::unhealthy(
                    start.elapsed(),
                    &format!("Query execution failed: {}", StoreError::from(e)),
                    HealthCheckMethod::Detailed,
                )
            }
            Err(_) => {
                error!("Detailed health check timed out after {:?}", timeout);
                HealthCheckResult::unhealthy(
                    start.elapsed(),
                    &format!("Timed out after {}s", timeout.as_secs()),
                    HealthCheckMethod::Detailed,
                )
            }
        }
    }

    /// Execute the configured health check with retry logic
    ///
    /// Always returns a `HealthCheckResult`; retries only while the store is
    /// unhealthy and attempts remain.
    pub async fn health_check_with_retry(&self) -> HealthCheckResult {
        let mut retry_count = 0;
        let max_retries = if self.health_config.enable_retries {
            self.health_config.max_retries
        } else {
            0
        };

        loop {
            let start = Instant::now();

            let result = match self.health_config.method {
                HealthCheckMethod::Simple => match self.health_check().await {
                    Ok(_) => HealthCheckResult::healthy(
                        start.elapsed(),
                        None,
                        HealthCheckMethod::Simple,
                        self.health_config.degraded_threshold_ms,
                    ),
                    Err(e) => HealthCheckResult::unhealthy(
                        start.elapsed(),
                        &e.to_string(),
                        HealthCheckMethod::Simple,
                    ),
                },
                HealthCheckMethod::Detailed => self.health_check_detailed().await,
            };

            if result.status.is_operational() || retry_count >= max_retries {
                return result.with_retry_count(retry_count);
            }

            retry_count += 1;
            warn!(
                "Health check failed (attempt {}/{}), retrying after {:?}",
                retry_count,
                max_retries + 1,
                self.health_config.retry_delay
            );
            tokio::time::sleep(self.health_config.retry_delay).await;
        }
    }

    /// Get a reference to the underlying connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Get the current health check configuration
    pub fn health_config(&self) -> &HealthCheckConfig {
        &self.health_config
    }

    /// Update the health check configuration
    pub fn set_health_config(&mut self, config: HealthCheckConfig) {
        self.health_config = config;
    }
}

#[async_trait]
impl RecordStore for PgClient {
    async fn find_by_title(&self, question: &str) -> Result<Option<Record>> {
        schema::find_record_by_title(&self.pool, question).await
    }

    async fn upsert(&self, record: &Record) -> Result<()> {
        schema::upsert_record(&self.pool, record).await
    }

    async fn health(&self) -> HealthCheckResult {
        self.health_check_with_retry().await
    }
}
