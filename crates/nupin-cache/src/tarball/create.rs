//! Tarball creation

use flate2::write::GzEncoder;
use flate2::Compression;
use nupin_core::NupinError;
use std::io::Write;
use std::path::Path;
use tar::Builder;
use walkdir::WalkDir;

use crate::CacheResult;

/// Pack a directory into a gzipped tarball with root-relative entries
pub fn create_tarball<W: Write>(writer: W, source_dir: &Path) -> CacheResult<()> {
    let io_err = |e| NupinError::io(format!("Failed to pack {}", source_dir.display()), e);
    let mut builder = Builder::new(GzEncoder::new(writer, Compression::default()));

    for entry in WalkDir::new(source_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            NupinError::io(format!("Failed to walk {}", source_dir.display()), e.into())
        })?;
        let path = entry.path();
        let relative = match path.strip_prefix(source_dir) {
            Ok(relative) if !relative.as_os_str().is_empty() => relative,
            _ => continue,
        };

        if entry.file_type().is_file() {
            builder.append_path_with_name(path, relative).map_err(io_err)?;
        } else if entry.file_type().is_dir() {
            builder.append_dir(relative, path).map_err(io_err)?;
        }
    }

    builder.into_inner().map_err(io_err)?.finish().map_err(io_err)?;
    Ok(())
}

/// Create tarball and return as bytes
pub fn create_tarball_bytes(source_dir: &Path) -> CacheResult<Vec<u8>> {
    let mut buffer = Vec::new();
    create_tarball(&mut buffer, source_dir)?;
    Ok(buffer)
}
