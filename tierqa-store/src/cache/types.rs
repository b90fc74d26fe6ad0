//! Core type definitions for the cache tier

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Cache key type - a namespaced, normalized question
pub type CacheKey = String;

/// Cache value type - a serialized record
pub type CacheValue = String;

/// Canonicalize a question into a cache key.
///
/// Trims surrounding whitespace, lower-cases the whole string and prepends
/// `prefix`. Both the read and the write path go through this function, so a
/// value written for a question is found again under any casing or
/// surrounding-whitespace variant of it.
///
/// ```
/// use tierqa_store::cache::normalize_key;
///
/// assert_eq!(normalize_key("qa:", "  What Is Rust? "), "qa:what is rust?");
/// assert_eq!(normalize_key("qa:", " Foo "), normalize_key("qa:", "foo"));
/// ```
pub fn normalize_key(prefix: &str, question: &str) -> CacheKey {
    format!("{}{}", prefix, question.trim().to_lowercase())
}

/// Outcome class of a cache read, as logged and counted by the tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheOutcome {
    Hit,
    Miss,
    Error,
}

impl fmt::Display for CacheOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheOutcome::Hit => write!(f, "hit"),
            CacheOutcome::Miss => write!(f, "miss"),
            CacheOutcome::Error => write!(f, "error"),
        }
    }
}

/// Statistics for cache tier monitoring
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads that returned a record
    pub hits: u64,

    /// Reads that found nothing
    pub misses: u64,

    /// Reads that failed and were treated as a miss
    pub read_errors: u64,

    /// Successful write-backs
    pub writes: u64,

    /// Write-backs that failed and were swallowed
    pub write_errors: u64,
}

impl CacheStats {
    /// Calculate cache hit rate as a percentage of all reads
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses + self.read_errors;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }

    /// Calculate miss rate as a percentage
    pub fn miss_rate(&self) -> f64 {
        100.0 - self.hit_rate()
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CacheStats {{ hits: {}, misses: {}, read_errors: {}, hit_rate: {:.2}%, \
             writes: {}, write_errors: {} }}",
            self.hits,
            self.misses,
            self.read_errors,
            self.hit_rate(),
            self.writes,
            self.write_errors
        )
    }
}

/// Lock-free counters behind [`CacheStats`]
#[derive(Debug, Default)]
pub(crate) struct CacheCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    read_errors: AtomicU64,
    writes: AtomicU64,
    write_errors: AtomicU64,
}

impl CacheCounters {
    pub(crate) fn record_read(&self, outcome: CacheOutcome) {
        let counter = match outcome {
            CacheOutcome::Hit => &self.hits,
            CacheOutcome::Miss => &self.misses,
            CacheOutcome::Error => &self.read_errors,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_write(&self, ok: bool) {
        if ok {
            self.writes.fetch_add(1, Ordering::Relaxed);
        } else {
            self.write_errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            read_errors: self.read_errors.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            write_errors: self.write_errors.load(Ordering::Relaxed),
        }
    }
}
