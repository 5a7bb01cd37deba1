//! Postal-code timezone resolution with an accumulating cache.

use std::collections::HashMap;
use std::sync::Arc;

use chrono_tz::Tz;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::PostalCode;

use super::client::TimezoneClient;
use super::error::TimezoneError;

/// An immutable view of resolved postal-code timezones.
///
/// Snapshots of the resolver's accumulated mapping are handed to conversion
/// code so that load and commit see one consistent view without holding the
/// resolver's lock across the whole operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimezoneMap {
    entries: HashMap<PostalCode, Tz>,
}

impl TimezoneMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from explicit entries.
    pub fn from_entries(entries: impl IntoIterator<Item = (PostalCode, Tz)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Look up the timezone for a postal code.
    pub fn get(&self, code: &PostalCode) -> Option<Tz> {
        self.entries.get(code).copied()
    }

    /// Insert a single resolution.
    pub fn insert(&mut self, code: PostalCode, tz: Tz) {
        self.entries.insert(code, tz);
    }

    /// Merge another map into this one. Existing keys are overwritten, so
    /// responses applied out of order settle last-applied-wins per key.
    pub fn merge(&mut self, other: TimezoneMap) {
        self.entries.extend(other.entries);
    }

    /// Number of resolved postal codes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no postal codes have been resolved.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the resolved entries.
    pub fn iter(&self) -> impl Iterator<Item = (&PostalCode, &Tz)> {
        self.entries.iter()
    }
}

/// Postal-code to timezone resolver.
///
/// Resolutions accumulate across lookups: a fresh batch merges into, never
/// replaces, previously resolved entries. Batch lookups are deduplicated
/// against the accumulated mapping, so only unknown codes go to the service.
///
/// Cheap to clone; clones share the underlying mapping.
#[derive(Clone)]
pub struct TimezoneResolver {
    inner: Arc<RwLock<TimezoneMap>>,
    client: TimezoneClient,
}

impl TimezoneResolver {
    /// Create a resolver with an empty mapping.
    pub fn new(client: TimezoneClient) -> Self {
        Self {
            inner: Arc::new(RwLock::new(TimezoneMap::new())),
            client,
        }
    }

    /// Create a resolver seeded with an existing mapping (e.g. from the disk
    /// cache, or fixed entries in tests).
    pub fn with_entries(client: TimezoneClient, entries: TimezoneMap) -> Self {
        Self {
            inner: Arc::new(RwLock::new(entries)),
            client,
        }
    }

    /// Look up the timezone bound to a postal code, if resolved.
    pub async fn resolve(&self, code: &PostalCode) -> Option<Tz> {
        let guard = self.inner.read().await;
        guard.get(code)
    }

    /// Take a snapshot of the accumulated mapping.
    pub async fn snapshot(&self) -> TimezoneMap {
        let guard = self.inner.read().await;
        guard.clone()
    }

    /// Number of resolved postal codes.
    pub async fn len(&self) -> usize {
        let guard = self.inner.read().await;
        guard.len()
    }

    /// Whether the mapping is empty.
    pub async fn is_empty(&self) -> bool {
        let guard = self.inner.read().await;
        guard.is_empty()
    }

    /// Resolve a batch of postal codes, requesting only those not already in
    /// the mapping. Returns the number of newly resolved codes.
    ///
    /// Responses merge into the shared mapping as they arrive; an in-flight
    /// request is never cancelled by a newer one, and overlapping responses
    /// settle last-applied-wins per key.
    pub async fn ensure_resolved(&self, codes: &[PostalCode]) -> Result<usize, TimezoneError> {
        let missing: Vec<PostalCode> = {
            let guard = self.inner.read().await;
            let mut seen = std::collections::HashSet::new();
            codes
                .iter()
                .filter(|code| guard.get(code).is_none() && seen.insert((*code).clone()))
                .cloned()
                .collect()
        };

        if missing.is_empty() {
            return Ok(0);
        }

        debug!(count = missing.len(), "resolving postal codes");
        let resolved = self.client.resolve_batch(&missing).await?;
        let count = resolved.len();
        self.apply(resolved).await;

        Ok(count)
    }

    /// Merge a resolved mapping into the accumulated one.
    pub async fn apply(&self, resolved: TimezoneMap) {
        let mut guard = self.inner.write().await;
        guard.merge(resolved);
    }
}
