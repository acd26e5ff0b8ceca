//! Local package cache for nupin
//!
//! This crate provides the on-disk cache that keeps every package record and
//! archive the installer has ever fetched, plus the tarball helpers used to
//! pack and unpack package archives. Archives are indexed by Blake3 hash so
//! corrupted cache entries are detected before they are installed.

pub mod disk;
pub mod tarball;

// Re-export main types
pub use disk::{CacheEntry, CacheIndex, DiskCache};
pub use tarball::{create_tarball, create_tarball_bytes, extract_tarball};

use nupin_core::{NupinError, PackageRecord, Version};

/// Result type for cache operations
pub type CacheResult<T> = Result<T, NupinError>;

/// A local store of previously fetched packages.
///
/// Unlike a feed, a cache that has never seen a package reports no versions
/// instead of failing.
pub trait PackageCache {
    /// Cached versions of a package, empty when none are cached
    fn list_versions(&self, id: &str) -> CacheResult<Vec<Version>>;

    fn fetch_record(&self, id: &str, version: &Version) -> CacheResult<PackageRecord>;

    fn fetch_archive(&self, id: &str, version: &Version) -> CacheResult<Vec<u8>>;

    /// Store a fetched package. Storing an already cached version is a no-op.
    fn store(&self, record: &PackageRecord, archive: &[u8]) -> CacheResult<()>;
}
