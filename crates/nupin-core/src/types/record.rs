//! Resolved package records.
//!
//! A record is the full metadata of one published package version as served
//! by a feed or cache: its identifier, its version and the dependencies it
//! declares.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::identifier::deserialize_package_id;
use super::{package_key, PackageIdentifier, Version};

/// Metadata for one resolvable package version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    #[serde(deserialize_with = "deserialize_package_id")]
    pub id: String,
    pub version: Version,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<PackageIdentifier>,
}

impl PackageRecord {
    /// Create a record without dependencies
    pub fn new(id: impl Into<String>, version: Version) -> Self {
        Self {
            id: id.into(),
            version,
            description: None,
            dependencies: Vec::new(),
        }
    }

    /// Add a declared dependency
    pub fn with_dependency(mut self, dependency: PackageIdentifier) -> Self {
        self.dependencies.push(dependency);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn key(&self) -> String {
        package_key(&self.id)
    }

    /// Identifier pinned to this record's version
    pub fn identifier(&self) -> PackageIdentifier {
        PackageIdentifier::pinned(self.id.clone(), self.version.clone())
    }

    /// Check if this record declares a dependency on the given package
    pub fn depends_on(&self, id: &str) -> bool {
        let key = package_key(id);
        self.dependencies.iter().any(|dep| dep.key() == key)
    }
}

impl fmt::Display for PackageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id, self.version)
    }
}
