//! Disk-based cache for resolved timezones.
//!
//! Postal-code timezone bindings change essentially never, so the accumulated
//! mapping is worth keeping across restarts to spare the lookup service a
//! cold start.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use crate::domain::PostalCode;

use super::error::TimezoneError;
use super::resolver::TimezoneMap;

/// Default cache TTL: 7 days.
const DEFAULT_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Cached timezone mapping with metadata.
#[derive(Debug, Serialize, Deserialize)]
struct CachedZones {
    /// Unix timestamp when the cache was written.
    cached_at_secs: u64,
    /// Postal code → IANA zone identifier.
    zones: HashMap<String, String>,
}

/// Configuration for the timezone disk cache.
#[derive(Debug, Clone)]
pub struct TimezoneCacheConfig {
    /// Path to the cache file.
    pub path: PathBuf,
    /// How long the cache remains valid.
    pub ttl: Duration,
}

impl TimezoneCacheConfig {
    /// Create a new cache config with the given path and default TTL (7 days).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ttl: DEFAULT_TTL,
        }
    }

    /// Set a custom TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

impl Default for TimezoneCacheConfig {
    fn default() -> Self {
        Self::new("timezones_cache.json")
    }
}

/// Disk cache for the resolved timezone mapping.
#[derive(Debug, Clone)]
pub struct TimezoneDiskCache {
    config: TimezoneCacheConfig,
}

impl TimezoneDiskCache {
    /// Create a new cache with the given config.
    pub fn new(config: TimezoneCacheConfig) -> Self {
        Self { config }
    }

    /// Try to load the mapping from the cache.
    ///
    /// Returns `None` if the cache doesn't exist, is invalid, or has expired.
    /// Entries with unparseable postal codes or zone names are dropped.
    pub fn load(&self) -> Option<TimezoneMap> {
        let contents = std::fs::read_to_string(&self.config.path).ok()?;
        let cached: CachedZones = serde_json::from_str(&contents).ok()?;

        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .ok()?
            .as_secs();

        let age_secs = now.saturating_sub(cached.cached_at_secs);
        if age_secs >= self.config.ttl.as_secs() {
            return None;
        }

        let mut map = TimezoneMap::new();
        for (code, zone) in cached.zones {
            let Ok(code) = PostalCode::parse(&code) else {
                continue;
            };
            let Ok(tz) = zone.parse::<chrono_tz::Tz>() else {
                continue;
            };
            map.insert(code, tz);
        }

        Some(map)
    }

    /// Save a mapping to the cache.
    ///
    /// Creates parent directories if they don't exist.
    pub fn save(&self, map: &TimezoneMap) -> Result<(), TimezoneError> {
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map_err(|_| TimezoneError::Cache {
                message: "system time before unix epoch".to_string(),
            })?
            .as_secs();

        let cached = CachedZones {
            cached_at_secs: now,
            zones: map
                .iter()
                .map(|(code, tz)| (code.as_str().to_string(), tz.name().to_string()))
                .collect(),
        };

        if let Some(parent) = self.config.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| TimezoneError::Cache {
                message: format!("failed to create cache directory: {}", e),
            })?;
        }

        let json = serde_json::to_string_pretty(&cached).map_err(|e| TimezoneError::Cache {
            message: format!("failed to serialize cache: {}", e),
        })?;

        std::fs::write(&self.config.path, json).map_err(|e| TimezoneError::Cache {
            message: format!("failed to write cache file: {}", e),
        })?;

        Ok(())
    }

    /// Get the cache file path.
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Get the cache TTL.
    pub fn ttl(&self) -> Duration {
        self.config.ttl
    }
}
