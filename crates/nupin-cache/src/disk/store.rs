//! Disk-backed package cache

use camino::Utf8Path;
use nupin_core::utils::{blake3_hash, verify_integrity, FlatLayout};
use nupin_core::{package_key, NupinError, PackageRecord, Version};
use std::fs;
use std::io::ErrorKind;
use tracing::{debug, info, warn};

use super::index::{entry_key, CacheEntry, CacheIndex};
use crate::{CacheResult, PackageCache};

const INDEX_FILE: &str = "index.json";

/// Package cache rooted at a directory
#[derive(Debug)]
pub struct DiskCache {
    layout: FlatLayout,
    index: CacheIndex,
}

impl DiskCache {
    /// Open the cache, creating its root directory if needed
    pub fn open<P: AsRef<Utf8Path>>(root: P) -> CacheResult<Self> {
        let root = root.as_ref();
        fs::create_dir_all(root)
            .map_err(|e| NupinError::io(format!("Failed to create cache at {}", root), e))?;

        let index = CacheIndex::load_or_create(root.join(INDEX_FILE))?;
        debug!("Opened package cache at {} ({} archives)", root, index.len());

        Ok(Self {
            layout: FlatLayout::new(root),
            index,
        })
    }

    pub fn root(&self) -> &Utf8Path {
        self.layout.root()
    }

    /// Check if a package version is cached
    pub fn contains(&self, id: &str, version: &Version) -> bool {
        match (self.layout.record_path(id, version), self.layout.archive_path(id, version)) {
            (Ok(record), Ok(archive)) => record.exists() && archive.exists(),
            _ => false,
        }
    }

    /// Persist access times recorded by lookups
    fn save_index(&self) {
        if let Err(err) = self.index.save() {
            warn!("Failed to update cache index: {}", err);
        }
    }

    fn read(&self, path: &Utf8Path, id: &str, version: &Version) -> CacheResult<Vec<u8>> {
        fs::read(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => {
                NupinError::not_found(format!("{} {}", id, version), format!("cache ({})", self.root()))
            },
            _ => NupinError::io(format!("Failed to read {}", path), e),
        })
    }

    fn write(path: &Utf8Path, data: &[u8]) -> CacheResult<()> {
        // Write beside the target and rename so readers never see a torn file
        let staging = path.with_extension("partial");
        fs::write(&staging, data)
            .map_err(|e| NupinError::io(format!("Failed to write {}", staging), e))?;
        fs::rename(&staging, path)
            .map_err(|e| NupinError::io(format!("Failed to move {} into place", path), e))
    }
}

impl PackageCache for DiskCache {
    fn list_versions(&self, id: &str) -> CacheResult<Vec<Version>> {
        let dir = self.layout.package_dir(id)?;
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(NupinError::io(format!("Failed to list {}", dir), e)),
        };

        let mut versions = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| NupinError::io(format!("Failed to list {}", dir), e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if let Ok(version) = name.parse::<Version>() {
                if self.contains(id, &version) {
                    versions.push(version);
                }
            }
        }

        versions.sort();
        Ok(versions)
    }

    fn fetch_record(&self, id: &str, version: &Version) -> CacheResult<PackageRecord> {
        let path = self.layout.record_path(id, version)?;
        let data = self.read(&path, id, version)?;
        let record: PackageRecord = serde_json::from_slice(&data)
            .map_err(|e| NupinError::serialization(format!("{}: {}", path, e)))?;

        if record.key() != package_key(id) || record.version != *version {
            return Err(NupinError::serialization(format!(
                "{} describes {} instead of {} {}",
                path, record, id, version
            )));
        }
        Ok(record)
    }

    fn fetch_archive(&self, id: &str, version: &Version) -> CacheResult<Vec<u8>> {
        let path = self.layout.archive_path(id, version)?;
        let data = self.read(&path, id, version)?;

        match self.index.get(&entry_key(id, version)) {
            Some(entry) => {
                verify_integrity(&format!("{} {}", id, version), &data, &entry.hash)?;
                self.save_index();
            },
            None => debug!("{} {} has no cache index entry; skipping verification", id, version),
        }
        Ok(data)
    }

    fn store(&self, record: &PackageRecord, archive: &[u8]) -> CacheResult<()> {
        let key = entry_key(&record.id, &record.version);
        let hash = blake3_hash(archive);

        let archive_path = self.layout.archive_path(&record.id, &record.version)?;
        let record_path = self.layout.record_path(&record.id, &record.version)?;

        if record_path.exists() {
            let intact = match self.index.get(&key) {
                Some(existing) if existing.hash == hash => fs::read(&archive_path)
                    .map(|data| blake3_hash(&data) == hash)
                    .unwrap_or(false),
                _ => false,
            };
            if intact {
                debug!("{} already cached", record);
                self.save_index();
                return Ok(());
            }
        }

        let dir = self.layout.version_dir(&record.id, &record.version)?;
        fs::create_dir_all(&dir)
            .map_err(|e| NupinError::io(format!("Failed to create {}", dir), e))?;

        Self::write(&archive_path, archive)?;
        let json = serde_json::to_vec_pretty(record).map_err(NupinError::serialization)?;
        Self::write(&record_path, &json)?;

        self.index.insert(key, CacheEntry::new(hash, archive.len() as u64));
        self.index.save()?;

        info!("Cached {}", record);
        Ok(())
    }
}
