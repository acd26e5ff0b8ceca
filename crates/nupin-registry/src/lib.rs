//! Package feeds for nupin
//!
//! A feed answers three questions about a package: which versions exist,
//! what a given version's record looks like, and what its archive bytes are.
//! This crate provides a folder-backed feed, an HTTP feed with an in-memory
//! version index cache, and an ordered union of several feeds.

pub mod api;
pub mod cache;
pub mod client;
pub mod feed;
pub mod folder;

// Re-export main types
pub use api::VersionIndexResponse;
pub use cache::{CacheEntry, MetadataCache};
pub use client::{AuthConfig, HttpFeed};
pub use feed::{FeedSet, PackageFeed};
pub use folder::FolderFeed;

use nupin_core::NupinError;

/// Result type for feed operations
pub type RegistryResult<T> = Result<T, NupinError>;
