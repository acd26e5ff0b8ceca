//! `nupin push` command implementation.
//!
//! Publishes a package record and its archive into a folder source. A
//! directory given as the archive is packed first.

use anyhow::Context;
use camino::Utf8Path;
use nupin_cache::create_tarball_bytes;
use nupin_core::PackageRecord;
use std::fs;

use super::CommandContext;

/// Execute the `nupin push` command
pub fn execute(record_path: &Utf8Path, archive: &Utf8Path, source: &str, ctx: &CommandContext) -> anyhow::Result<()> {
    let feed = ctx.folder_source(source)?;

    let json = fs::read_to_string(record_path).with_context(|| format!("Failed to read {}", record_path))?;
    let record: PackageRecord = serde_json::from_str(&json)
        .with_context(|| format!("{} is not a valid package record", record_path))?;

    let bytes = if archive.is_dir() {
        create_tarball_bytes(archive.as_std_path())?
    } else {
        fs::read(archive).with_context(|| format!("Failed to read {}", archive))?
    };

    feed.publish(&record, &bytes)?;
    ctx.output.success(&format!("Pushed {} to {}", record, feed.root()));
    Ok(())
}
