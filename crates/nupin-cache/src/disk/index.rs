//! Cache index for archive metadata

use chrono::Utc;
use dashmap::DashMap;
use nupin_core::{package_key, NupinError, Version};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::CacheResult;

/// Metadata for a cached archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Blake3 hash of the archive
    pub hash: String,
    /// Size in bytes
    pub size: u64,
    /// When the entry was stored (as timestamp)
    pub stored_at: i64,
    /// When the entry was last accessed (as timestamp)
    pub last_accessed: i64,
}

impl CacheEntry {
    pub fn new(hash: String, size: u64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            hash,
            size,
            stored_at: now,
            last_accessed: now,
        }
    }

    /// Update last accessed time
    pub fn touch(&mut self) {
        self.last_accessed = Utc::now().timestamp();
    }
}

/// Index key for one package version
pub fn entry_key(id: &str, version: &Version) -> String {
    format!("{}@{}", package_key(id), version)
}

/// Index of cached archives
#[derive(Debug)]
pub struct CacheIndex {
    entries: DashMap<String, CacheEntry>,
    index_path: PathBuf,
}

impl CacheIndex {
    /// Load existing index or create new one.
    ///
    /// An unreadable index is discarded; archives it described are then
    /// treated as unverified until stored again.
    pub fn load_or_create<P: AsRef<Path>>(index_path: P) -> CacheResult<Self> {
        let index_path = index_path.as_ref().to_path_buf();
        let entries = DashMap::new();

        if index_path.exists() {
            let content = fs::read_to_string(&index_path).map_err(|e| {
                NupinError::io(format!("Failed to read {}", index_path.display()), e)
            })?;
            match serde_json::from_str::<Vec<(String, CacheEntry)>>(&content) {
                Ok(loaded) => {
                    for (key, entry) in loaded {
                        entries.insert(key, entry);
                    }
                },
                Err(e) => warn!("Discarding corrupt cache index {}: {}", index_path.display(), e),
            }
        }

        Ok(Self { entries, index_path })
    }

    pub fn insert(&self, key: String, entry: CacheEntry) {
        self.entries.insert(key, entry);
    }

    /// Get an entry by key, updating its access time
    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        let mut entry = self.entries.get_mut(key)?;
        entry.touch();
        Some(entry.clone())
    }

    pub fn remove(&self, key: &str) -> Option<CacheEntry> {
        self.entries.remove(key).map(|(_, entry)| entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Save index to disk
    pub fn save(&self) -> CacheResult<()> {
        let mut entries: Vec<(String, CacheEntry)> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let content = serde_json::to_string_pretty(&entries).map_err(NupinError::serialization)?;

        if let Some(parent) = self.index_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| NupinError::io("Failed to create cache directory".to_string(), e))?;
        }

        fs::write(&self.index_path, content)
            .map_err(|e| NupinError::io("Failed to write cache index".to_string(), e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_entry_key_lowercases_id_only() {
        let version: Version = "1.0.0-RC1".parse().unwrap();
        assert_eq!(entry_key("Newtonsoft.Json", &version), "newtonsoft.json@1.0.0-RC1");
    }

    #[test]
    fn test_get_touches_entry() {
        let dir = tempdir().unwrap();
        let index = CacheIndex::load_or_create(dir.path().join("index.json")).unwrap();

        let mut entry = CacheEntry::new("abc".to_string(), 3);
        entry.last_accessed = 0;
        index.insert("jquery@3.1.1".to_string(), entry);

        let retrieved = index.get("jquery@3.1.1").unwrap();
        assert!(retrieved.last_accessed > 0);
        assert!(index.get("jquery@1.9.1").is_none());
    }

    #[test]
    fn test_index_persistence() {
        let dir = tempdir().unwrap();
        let index_path = dir.path().join("index.json");

        {
            let index = CacheIndex::load_or_create(&index_path).unwrap();
            index.insert("jquery@3.1.1".to_string(), CacheEntry::new("abc".to_string(), 1024));
            index.save().unwrap();
        }

        let index = CacheIndex::load_or_create(&index_path).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("jquery@3.1.1").unwrap().size, 1024);
        assert!(index.remove("jquery@3.1.1").is_some());
        assert!(index.is_empty());
    }

    #[test]
    fn test_corrupt_index_starts_empty() {
        let dir = tempdir().unwrap();
        let index_path = dir.path().join("index.json");
        fs::write(&index_path, "not json").unwrap();

        let index = CacheIndex::load_or_create(&index_path).unwrap();
        assert!(index.is_empty());
    }
}
