//! Flat on-disk package layout.
//!
//! Folder feeds and the package cache share one layout:
//!
//! ```text
//! <root>/<id-lowercase>/<version>/record.json
//! <root>/<id-lowercase>/<version>/package.tgz
//! ```
//!
//! Version directories keep the exact version text. Pre-release labels are
//! compared case-sensitively, so `1.0.0-RC1` and `1.0.0-rc1` are different
//! versions and live in different directories.

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::NupinResult;
use crate::types::{package_key, validate_package_id, Version};

pub const RECORD_FILE: &str = "record.json";
pub const ARCHIVE_FILE: &str = "package.tgz";

/// Path scheme for flat package directories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatLayout {
    root: Utf8PathBuf,
}

impl FlatLayout {
    pub fn new<P: AsRef<Utf8Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Directory holding every version of a package.
    ///
    /// Fails for ids that would leave the root.
    pub fn package_dir(&self, id: &str) -> NupinResult<Utf8PathBuf> {
        validate_package_id(id)?;
        Ok(self.root.join(package_key(id)))
    }

    pub fn version_dir(&self, id: &str, version: &Version) -> NupinResult<Utf8PathBuf> {
        Ok(self.package_dir(id)?.join(version.to_string()))
    }

    pub fn record_path(&self, id: &str, version: &Version) -> NupinResult<Utf8PathBuf> {
        Ok(self.version_dir(id, version)?.join(RECORD_FILE))
    }

    pub fn archive_path(&self, id: &str, version: &Version) -> NupinResult<Utf8PathBuf> {
        Ok(self.version_dir(id, version)?.join(ARCHIVE_FILE))
    }
}
