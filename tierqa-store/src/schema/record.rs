//! Record table operations
//!
//! Rows live in `public.querys`. Titles are unique ignoring case, enforced by
//! an index on `UPPER(title)`; lookups and upserts both match on it.

use crate::error::{Result, StoreError};
use crate::schema::types::Record;
use sqlx::{FromRow, PgPool};
use tracing::debug;

/// Fully qualified name of the record table
pub const RECORD_TABLE: &str = "public.querys";

/// Unique index on the upper-cased title
const TITLE_INDEX: &str = "querys_title_upper_key";

#[derive(Debug, FromRow)]
struct RecordRow {
    score: i32,
    title: String,
    body: Option<String>,
    answer: String,
}

impl TryFrom<RecordRow> for Record {
    type Error = StoreError;

    fn try_from(row: RecordRow) -> Result<Self> {
        Ok(Record::new(i64::from(row.score), row.title, row.body, row.answer)?)
    }
}

/// Create the record table and its title index if they do not exist yet
///
/// # Example
/// ```no_run
/// use tierqa_store::{PgClient, PgConfig, schema::ensure_schema};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let client = PgClient::connect(PgConfig::default()).await?;
///     ensure_schema(client.pool()).await?;
///     Ok(())
/// }
/// ```
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    let ddl = format!(
        "CREATE TABLE IF NOT EXISTS {RECORD_TABLE} (
            score INTEGER NOT NULL CHECK (score BETWEEN 1 AND 10),
            title TEXT NOT NULL,
            body TEXT NULL,
            answer TEXT NOT NULL
        )"
    );
    sqlx::query(&ddl).execute(pool).await?;

    let index = format!(
        "CREATE UNIQUE INDEX IF NOT EXISTS {TITLE_INDEX} ON {RECORD_TABLE} (UPPER(title))"
    );
    sqlx::query(&index).execute(pool).await?;

    debug!("Ensured table {} exists", RECORD_TABLE);
    Ok(())
}

/// Find a record whose title matches `question` case-insensitively
///
/// A connection is acquired up front so that an unreachable database is
/// reported as [`StoreError::ConnectionError`], distinct from a failed query.
///
/// # Returns
/// * `Ok(Some(Record))` if a row matches
/// * `Ok(None)` if no row matches
/// * `Err(StoreError)` on failure
pub async fn find_record_by_title(pool: &PgPool, question: &str) -> Result<Option<Record>> {
    let mut conn = pool
        .acquire()
        .await
        .map_err(|e| StoreError::ConnectionError(e.to_string()))?;

    let sql = format!(
        "SELECT score, title, body, answer FROM {RECORD_TABLE}
         WHERE UPPER(title) = UPPER($1) LIMIT 1"
    );

    let row: Option<RecordRow> = sqlx::query_as(&sql)
        .bind(question)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| StoreError::QueryError(format!("Failed to read record: {}", e)))?;

    row.map(Record::try_from).transpose()
}

/// Insert a record, or overwrite the row whose title matches ignoring case
///
/// The stored title takes the spelling of the newer record. Runs in a single
/// transaction. The update is skipped when the stored row already holds the
/// same values, so repeating an upsert leaves the table as is.
pub async fn upsert_record(pool: &PgPool, record: &Record) -> Result<()> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| StoreError::ConnectionError(e.to_string()))?;

    let sql = format!(
        "INSERT INTO {RECORD_TABLE} AS q (score, title, body, answer)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT ((UPPER(title))) DO UPDATE SET
            title = EXCLUDED.title,
            score = EXCLUDED.score,
            answer = EXCLUDED.answer,
            body = EXCLUDED.body
         WHERE (q.title, q.score, q.answer, q.body) IS DISTINCT FROM
               (EXCLUDED.title, EXCLUDED.score, EXCLUDED.answer, EXCLUDED.body)"
    );

    sqlx::query(&sql)
        .bind(i32::from(record.score()))
        .bind(record.title())
        .bind(record.body())
        .bind(record.answer())
        .execute(&mut *tx)
        .await
        .map_err(|e| StoreError::QueryError(format!("Failed to upsert record: {}", e)))?;

    tx.commit().await?;

    debug!("Upserted record for title: {}", record.title());
    Ok(())
}
