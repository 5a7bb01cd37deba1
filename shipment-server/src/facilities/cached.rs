//! Caching layer for facility search.
//!
//! Operators type a few characters and pause; the same prefixes recur across
//! a session, so a short-TTL cache absorbs most of the traffic without
//! letting results go stale against facility edits.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;

use super::client::{FacilityClient, FacilityDto};
use super::error::FacilityError;

/// Cache key: (normalized query, limit).
type SearchKey = (String, usize);

/// Cached search results.
type SearchEntry = Arc<Vec<FacilityDto>>;

/// Configuration for the facility search cache.
#[derive(Debug, Clone)]
pub struct FacilityCacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached queries.
    pub max_capacity: u64,
}

impl Default for FacilityCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            max_capacity: 1000,
        }
    }
}

/// Facility search client with caching.
pub struct CachedFacilityClient {
    client: FacilityClient,
    cache: MokaCache<SearchKey, SearchEntry>,
}

impl CachedFacilityClient {
    /// Create a new cached client.
    pub fn new(client: FacilityClient, config: &FacilityCacheConfig) -> Self {
        let cache = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { client, cache }
    }

    /// Search facilities, using the cache if the same query was seen recently.
    ///
    /// Queries are trimmed and lowercased for the cache key, so `"Harbor "`
    /// and `"harbor"` share an entry.
    pub async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<SearchEntry, FacilityError> {
        let key = (query.trim().to_lowercase(), limit);

        if let Some(cached) = self.cache.get(&key).await {
            return Ok(cached);
        }

        let facilities = self.client.search(query.trim(), limit).await?;
        let entry = Arc::new(facilities);
        self.cache.insert(key, entry.clone()).await;

        Ok(entry)
    }

    /// Access the underlying client for operations that bypass the cache.
    pub fn client(&self) -> &FacilityClient {
        &self.client
    }

    /// Number of cached queries (for monitoring).
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}
