use crate::models::Listing;
use moka::future::Cache;
use std::sync::Arc;

/// Per-call ingestion cache
///
/// Keys are fully parameter-qualified upstream calls, values the normalized
/// listings that call produced. Entries never expire; `clear` is the only way
/// to drop them. Clones share the same underlying storage.
#[derive(Clone)]
pub struct ListingCache {
    entries: Cache<String, Arc<Vec<Listing>>>,
}

impl ListingCache {
    /// Create an unbounded cache without TTL
    pub fn new() -> Self {
        Self {
            entries: Cache::builder().build(),
        }
    }

    pub async fn get(&self, key: &str) -> Option<Arc<Vec<Listing>>> {
        let hit = self.entries.get(key).await;
        if hit.is_some() {
            tracing::trace!("Cache hit: {}", key);
        } else {
            tracing::trace!("Cache miss: {}", key);
        }
        hit
    }

    pub async fn insert(&self, key: String, listings: Arc<Vec<Listing>>) {
        tracing::trace!("Cache set: {} ({} listings)", key, listings.len());
        self.entries.insert(key, listings).await;
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.entries.invalidate_all();
        tracing::debug!("Ingestion cache cleared");
    }

    /// Approximate number of entries
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }

    /// Apply pending bookkeeping so `entry_count` is exact
    pub async fn sync(&self) {
        self.entries.run_pending_tasks().await;
    }
}

impl Default for ListingCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Build the cache key for one upstream call
    pub fn call(query: &str, ordinal: u32) -> String {
        format!("{}#{}", query, ordinal)
    }
}
