//! Folder-backed package feed
//!
//! Packages live in the flat layout shared with the package cache, so a
//! folder feed can be populated by `publish` or by copying directories.

use std::fs;
use std::io::ErrorKind;

use camino::Utf8Path;
use nupin_core::utils::FlatLayout;
use nupin_core::{NupinError, PackageRecord, Version};
use tracing::{debug, info};

use crate::feed::PackageFeed;
use crate::RegistryResult;

/// A feed served from a local directory
#[derive(Debug, Clone)]
pub struct FolderFeed {
    name: String,
    layout: FlatLayout,
}

impl FolderFeed {
    /// Open a folder feed. The directory does not have to exist yet.
    pub fn new(name: impl Into<String>, root: impl AsRef<Utf8Path>) -> Self {
        Self {
            name: name.into(),
            layout: FlatLayout::new(root),
        }
    }

    pub fn root(&self) -> &Utf8Path {
        self.layout.root()
    }

    /// Add a package version to the feed.
    ///
    /// Published versions are immutable: publishing a version that already
    /// exists fails.
    pub fn publish(&self, record: &PackageRecord, archive: &[u8]) -> RegistryResult<()> {
        let record_path = self.layout.record_path(&record.id, &record.version)?;
        if record_path.exists() {
            return Err(NupinError::io(
                format!("{} is already published to '{}'", record, self.name),
                std::io::Error::from(ErrorKind::AlreadyExists),
            ));
        }

        let dir = self.layout.version_dir(&record.id, &record.version)?;
        fs::create_dir_all(&dir)
            .map_err(|e| NupinError::io(format!("Failed to create {}", dir), e))?;

        let archive_path = self.layout.archive_path(&record.id, &record.version)?;
        fs::write(&archive_path, archive)
            .map_err(|e| NupinError::io(format!("Failed to write {}", archive_path), e))?;

        // Record last so a half-written version is never listed
        let json = serde_json::to_string_pretty(record).map_err(NupinError::serialization)?;
        fs::write(&record_path, json)
            .map_err(|e| NupinError::io(format!("Failed to write {}", record_path), e))?;

        info!("Published {} to '{}'", record, self.name);
        Ok(())
    }

    fn read(&self, path: &Utf8Path, what: String) -> RegistryResult<Vec<u8>> {
        fs::read(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => NupinError::not_found(what, self.location()),
            _ => NupinError::io(format!("Failed to read {}", path), e),
        })
    }

    fn location(&self) -> String {
        format!("feed '{}' ({})", self.name, self.layout.root())
    }
}

impl PackageFeed for FolderFeed {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_versions(&self, id: &str) -> RegistryResult<Vec<Version>> {
        let dir = self.layout.package_dir(id)?;
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(NupinError::not_found(id, self.location()));
            },
            Err(e) => return Err(NupinError::io(format!("Failed to list {}", dir), e)),
        };

        let mut versions = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| NupinError::io(format!("Failed to list {}", dir), e))?;
            let name = entry.file_name().to_string_lossy().into_owned();

            let Ok(version) = name.parse::<Version>() else {
                debug!("Skipping {}/{}: not a version", dir, name);
                continue;
            };
            if self.layout.record_path(id, &version)?.exists() {
                versions.push(version);
            } else {
                debug!("Skipping {}/{}: no record", dir, name);
            }
        }

        versions.sort();
        Ok(versions)
    }

    fn fetch_record(&self, id: &str, version: &Version) -> RegistryResult<PackageRecord> {
        let path = self.layout.record_path(id, version)?;
        let data = self.read(&path, format!("{} {}", id, version))?;
        let record: PackageRecord = serde_json::from_slice(&data)
            .map_err(|e| NupinError::serialization(format!("{}: {}", path, e)))?;

        if record.key() != nupin_core::package_key(id) || record.version != *version {
            return Err(NupinError::serialization(format!(
                "{} describes {} instead of {} {}",
                path, record, id, version
            )));
        }
        Ok(record)
    }

    fn fetch_archive(&self, id: &str, version: &Version) -> RegistryResult<Vec<u8>> {
        let path = self.layout.archive_path(id, version)?;
        self.read(&path, format!("{} {}", id, version))
    }
}
