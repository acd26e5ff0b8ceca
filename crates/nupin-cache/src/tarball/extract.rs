//! Tarball extraction with path validation

use flate2::read::GzDecoder;
use nupin_core::utils::safe_join;
use nupin_core::NupinError;
use std::fs;
use std::io::Read;
use std::path::Path;
use tar::{Archive, EntryType};
use tracing::debug;

use crate::CacheResult;

/// Extract a gzipped tarball into a destination directory.
///
/// Entries that would land outside `dest_dir` abort the extraction with
/// `UnsafePath`. Links and special files are skipped.
pub fn extract_tarball<R: Read>(reader: R, dest_dir: &Path) -> CacheResult<()> {
    let mut archive = Archive::new(GzDecoder::new(reader));
    let io_err = |e| NupinError::io(format!("Failed to extract into {}", dest_dir.display()), e);

    fs::create_dir_all(dest_dir).map_err(io_err)?;

    for entry in archive.entries().map_err(io_err)? {
        let mut entry = entry.map_err(io_err)?;
        let entry_path = entry.path().map_err(io_err)?.into_owned();
        let target = safe_join(dest_dir, &entry_path)?;

        match entry.header().entry_type() {
            EntryType::Regular => {
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent).map_err(io_err)?;
                }
                let mut file = fs::File::create(&target).map_err(io_err)?;
                std::io::copy(&mut entry, &mut file).map_err(io_err)?;
            },
            EntryType::Directory => {
                fs::create_dir_all(&target).map_err(io_err)?;
            },
            other => {
                debug!("Skipping {:?} entry {}", other, entry_path.display());
            },
        }
    }

    Ok(())
}
