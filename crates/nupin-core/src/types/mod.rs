//! Core data types for nupin package management.
//!
//! This module provides the fundamental types used throughout nupin:
//! - Version and range types with pre-release aware ordering
//! - Package identifiers and resolved package records
//! - The installed package set

pub mod identifier;
pub mod installed;
pub mod range;
pub mod record;
pub mod version;

// Re-export all public types
pub use identifier::{package_key, validate_package_id, PackageIdentifier};
pub use installed::InstalledSet;
pub use range::{Bound, VersionRange};
pub use record::PackageRecord;
pub use version::{Version, VersionError};
