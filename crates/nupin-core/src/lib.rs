//! # nupin-core
//!
//! Core types and utilities shared across all nupin crates.
//!
//! This crate provides:
//! - `Version` and `VersionRange` with NuGet-style interval notation
//! - `PackageIdentifier` and `PackageRecord` describing resolvable packages
//! - `InstalledSet`, the one-entry-per-identifier record of installed packages
//! - `NupinError` for unified error handling
//! - Hashing and path helpers used by the cache and materialization layers
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `types`: Core data types (Version, VersionRange, PackageRecord, etc.)
//! - `error`: Error types and result aliases
//! - `utils`: Utility functions and helpers

pub mod error;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use error::{NupinError, NupinResult};
pub use types::{
    package_key, validate_package_id, Bound, InstalledSet, PackageIdentifier, PackageRecord, Version,
    VersionError, VersionRange,
};
