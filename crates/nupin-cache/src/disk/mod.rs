//! On-disk package cache
//!
//! Entries use the flat package layout. An `index.json` at the cache root
//! maps `id@version` keys to the archive hash, size and access times.

pub mod index;
pub mod store;

pub use index::{CacheEntry, CacheIndex};
pub use store::DiskCache;
