//! Persistence tier abstraction and an in-process implementation

use crate::connection::{HealthCheckMethod, HealthCheckResult};
use crate::error::Result;
use crate::schema::Record;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// Durable record storage, keyed by title
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Case-insensitive exact match against stored titles.
    ///
    /// Implementations must report an unreachable store as
    /// [`StoreError::ConnectionError`](crate::StoreError::ConnectionError).
    async fn find_by_title(&self, question: &str) -> Result<Option<Record>>;

    /// Insert the record, or overwrite the row whose title matches case-insensitively.
    async fn upsert(&self, record: &Record) -> Result<()>;

    async fn health(&self) -> HealthCheckResult;
}

/// In-process record store with the same semantics as the Postgres table
///
/// Rows are keyed by upper-cased title, matching the unique `UPPER(title)`
/// index of the table.
#[derive(Clone, Default)]
pub struct MemoryRecordStore {
    rows: Arc<RwLock<HashMap<String, Record>>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn find_by_title(&self, question: &str) -> Result<Option<Record>> {
        let key = question.to_uppercase();
        let found = self.rows.read().await.get(&key).cloned();

        debug!(hit = found.is_some(), "Memory store lookup");
        Ok(found)
    }

    async fn upsert(&self, record: &Record) -> Result<()> {
        let mut rows = self.rows.write().await;
        rows.insert(record.title().to_uppercase(), record.clone());
        Ok(())
    }

    async fn health(&self) -> HealthCheckResult {
        HealthCheckResult::healthy(
            Duration::ZERO,
            Some("memory".to_string()),
            HealthCheckMethod::Simple,
            u64::MAX,
        )
    }
}
