//! Record schema module
//!
//! This module defines the [`Record`] answer unit and the SQL operations
//! that read and write it in Postgres.

pub mod record;
pub mod types;

pub use record::{ensure_schema, find_record_by_title, upsert_record, RECORD_TABLE};
pub use types::{Record, RecordError, MAX_SCORE, MIN_SCORE};
