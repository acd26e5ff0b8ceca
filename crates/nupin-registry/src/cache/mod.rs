//! Version index caching with TTL

use std::time::{Duration, SystemTime};

use dashmap::DashMap;
use nupin_core::{package_key, Version};

/// Default time-to-live for cached version lists
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Cache entry with TTL
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Cached version list
    pub versions: Vec<Version>,
    /// When the entry was stored
    pub stored_at: SystemTime,
    /// Time-to-live duration
    pub ttl: Duration,
}

impl CacheEntry {
    pub fn new(versions: Vec<Version>, ttl: Duration) -> Self {
        Self {
            versions,
            stored_at: SystemTime::now(),
            ttl,
        }
    }

    /// Check if cache entry is still fresh
    pub fn is_fresh(&self) -> bool {
        match self.stored_at.elapsed() {
            Ok(elapsed) => elapsed < self.ttl,
            Err(_) => false, // Clock went backwards, consider stale
        }
    }
}

/// In-memory cache of per-package version lists
#[derive(Debug)]
pub struct MetadataCache {
    cache: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            cache: DashMap::new(),
            ttl,
        }
    }

    /// Get cached versions if fresh
    pub fn get(&self, id: &str) -> Option<Vec<Version>> {
        let key = package_key(id);
        let versions = {
            let entry = self.cache.get(&key)?;
            entry.is_fresh().then(|| entry.versions.clone())
        };
        if versions.is_none() {
            // Remove stale entry
            self.cache.remove(&key);
        }
        versions
    }

    pub fn insert(&self, id: &str, versions: Vec<Version>) {
        self.cache.insert(package_key(id), CacheEntry::new(versions, self.ttl));
    }

    /// Forget one package so the next lookup goes to the network
    pub fn invalidate(&self, id: &str) {
        self.cache.remove(&package_key(id));
    }

    pub fn clear(&self) {
        self.cache.clear();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl Default for MetadataCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
