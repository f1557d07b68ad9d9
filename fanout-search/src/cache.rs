//! In-memory response cache with a fixed time-to-live.
//!
//! Entries are keyed by the (normalised query, result limit) pair. Expiry is
//! checked on read: an entry older than the TTL is reported absent but stays
//! in storage until it is overwritten or the cache is cleared. The cache has
//! no capacity bound. Each [`ResponseCache`] is independent, so tests and
//! separate services never share entries.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tokio::time::Instant;

use crate::types::AggregatedResponse;

/// Composite cache key: normalised query + requested result limit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Lowercased, trimmed query string.
    query: String,
    max_results: usize,
}

impl CacheKey {
    /// Build a key. The query is trimmed and lowercased so that
    /// `"Rust "` and `"rust"` share an entry.
    pub fn new(query: &str, max_results: usize) -> Self {
        Self {
            query: query.trim().to_lowercase(),
            max_results,
        }
    }
}

#[derive(Debug)]
struct CachedEntry {
    response: AggregatedResponse,
    inserted_at: Instant,
}

/// TTL-checked response cache.
pub struct ResponseCache {
    entries: Cache<CacheKey, Arc<CachedEntry>>,
    ttl: Duration,
}

impl ResponseCache {
    /// Create an empty cache. A zero `ttl` disables caching entirely.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Cache::builder().build(),
            ttl,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    /// Look up a fresh response for `key`.
    ///
    /// Returns `None` on a miss or when the stored entry has outlived the TTL.
    pub async fn get(&self, key: &CacheKey) -> Option<AggregatedResponse> {
        if !self.is_enabled() {
            return None;
        }
        let entry = self.entries.get(key).await?;
        if entry.inserted_at.elapsed() > self.ttl {
            tracing::trace!(query = %key.query, "cache entry expired");
            return None;
        }
        Some(entry.response.clone())
    }

    /// Store `response` under `key`, replacing any previous entry.
    pub async fn insert(&self, key: CacheKey, response: AggregatedResponse) {
        if !self.is_enabled() {
            return;
        }
        let entry = CachedEntry {
            response,
            inserted_at: Instant::now(),
        };
        self.entries.insert(key, Arc::new(entry)).await;
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }

    /// Number of stored entries, expired ones included.
    pub async fn len(&self) -> u64 {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count()
    }
}
