//! Placing package files into a project

pub mod platform;

pub use platform::SupportedPlatform;

use camino::{Utf8Path, Utf8PathBuf};
use nupin_cache::extract_tarball;
use nupin_core::{validate_package_id, NupinError, PackageRecord};
use std::fs;
use std::io::ErrorKind;
use tracing::{debug, info, warn};

use crate::ManagerResult;

/// Creates and deletes the files of installed packages
pub trait Materializer {
    /// Unpack a package archive into its install location
    fn place(&self, record: &PackageRecord, archive: &[u8]) -> ManagerResult<()>;

    /// Delete a package's files; removing an absent package succeeds
    fn remove(&self, record: &PackageRecord) -> ManagerResult<()>;

    fn is_placed(&self, record: &PackageRecord) -> bool;
}

/// Materializer writing `<repository>/<Id>.<Version>/` directories
#[derive(Debug, Clone)]
pub struct DirectoryMaterializer {
    root: Utf8PathBuf,
    platform: Option<SupportedPlatform>,
}

impl DirectoryMaterializer {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            root: root.into(),
            platform: None,
        }
    }

    /// Keep only the `lib` folders the platform supports
    pub fn with_platform(mut self, platform: SupportedPlatform) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Directory holding a package's files.
    ///
    /// Fails for ids that would leave the repository root.
    pub fn package_dir(&self, record: &PackageRecord) -> ManagerResult<Utf8PathBuf> {
        validate_package_id(&record.id)?;
        Ok(self.root.join(format!("{}.{}", record.id, record.version)))
    }

    fn staging_dir(&self, record: &PackageRecord) -> ManagerResult<Utf8PathBuf> {
        validate_package_id(&record.id)?;
        Ok(self.root.join(format!(".{}.{}.staging", record.id, record.version)))
    }

    fn remove_dir(path: &Utf8Path) -> ManagerResult<()> {
        match fs::remove_dir_all(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(NupinError::io(format!("Failed to remove {}", path), e)),
        }
    }

    fn unpack(&self, staging: &Utf8Path, archive: &[u8]) -> ManagerResult<()> {
        extract_tarball(archive, staging.as_std_path())?;
        if let Some(platform) = &self.platform {
            let pruned = platform.prune(staging.as_std_path())?;
            if !pruned.is_empty() {
                debug!("Pruned lib folders {:?} unsupported by {}", pruned, platform.name());
            }
        }
        Ok(())
    }
}

impl Materializer for DirectoryMaterializer {
    fn place(&self, record: &PackageRecord, archive: &[u8]) -> ManagerResult<()> {
        let target = self.package_dir(record)?;
        let staging = self.staging_dir(record)?;

        // Leftovers of an interrupted placement
        Self::remove_dir(&staging)?;

        if let Err(err) = self.unpack(&staging, archive) {
            if let Err(cleanup) = Self::remove_dir(&staging) {
                warn!("Failed to clean up {}: {}", staging, cleanup);
            }
            return Err(err);
        }

        Self::remove_dir(&target)?;
        fs::rename(&staging, &target)
            .map_err(|e| NupinError::io(format!("Failed to move {} into place", target), e))?;

        info!("Placed {} in {}", record, target);
        Ok(())
    }

    fn remove(&self, record: &PackageRecord) -> ManagerResult<()> {
        let target = self.package_dir(record)?;
        Self::remove_dir(&target)?;
        info!("Removed {} from {}", record, self.root);
        Ok(())
    }

    fn is_placed(&self, record: &PackageRecord) -> bool {
        self.package_dir(record).map(|dir| dir.is_dir()).unwrap_or(false)
    }
}
