//! Package identifiers.
//!
//! An identifier names a package and the versions acceptable for it. Two
//! identifiers refer to the same package when their names match ignoring
//! case, whatever their ranges.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use super::{Version, VersionError, VersionRange};

/// Normalized lookup key for a package name
pub fn package_key(id: &str) -> String {
    id.to_lowercase()
}

/// Check that a package id names a single path component.
///
/// Ids become directory names in feeds, caches and projects, so empty ids,
/// `.`, `..`, path separators and control characters are rejected.
pub fn validate_package_id(id: &str) -> Result<(), VersionError> {
    let reason = if id.trim().is_empty() {
        "the id is empty"
    } else if id == "." || id == ".." {
        "the id is a relative path"
    } else if id.contains(['/', '\\', ':']) {
        "the id contains a path separator"
    } else if id.chars().any(char::is_control) {
        "the id contains a control character"
    } else {
        return Ok(());
    };

    Err(VersionError::InvalidPackageId {
        id: id.to_string(),
        reason: reason.to_string(),
    })
}

pub(crate) fn deserialize_package_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let id = String::deserialize(deserializer)?;
    validate_package_id(&id).map_err(serde::de::Error::custom)?;
    Ok(id)
}

/// Package name plus acceptable version range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageIdentifier {
    #[serde(deserialize_with = "deserialize_package_id")]
    id: String,
    #[serde(rename = "version")]
    range: VersionRange,
}

impl PackageIdentifier {
    /// Create an identifier with an explicit range
    pub fn new(id: impl Into<String>, range: VersionRange) -> Self {
        Self {
            id: id.into(),
            range,
        }
    }

    /// Create an identifier from user text (`"1.0"`, `"[1.0,2.0)"`, ...)
    pub fn parse(id: impl Into<String>, range: &str) -> Result<Self, VersionError> {
        let id = id.into();
        validate_package_id(&id)?;
        Ok(Self::new(id, VersionRange::from_str(range)?))
    }

    /// Identifier accepting any version, from user text
    pub fn parse_any(id: impl Into<String>) -> Result<Self, VersionError> {
        let id = id.into();
        validate_package_id(&id)?;
        Ok(Self::any(id))
    }

    /// Identifier pinned to a single resolved version
    pub fn pinned(id: impl Into<String>, version: Version) -> Self {
        Self::new(id, VersionRange::exact(version))
    }

    /// Identifier accepting any version
    pub fn any(id: impl Into<String>) -> Self {
        Self::new(id, VersionRange::any())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn range(&self) -> &VersionRange {
        &self.range
    }

    pub fn key(&self) -> String {
        package_key(&self.id)
    }

    /// Check if both identifiers name the same package
    pub fn same_package(&self, other: &PackageIdentifier) -> bool {
        self.key() == other.key()
    }

    /// Check if a resolved version is acceptable for this identifier
    pub fn satisfied_by(&self, version: &Version) -> bool {
        self.range.contains(version)
    }

    pub fn is_pinned(&self) -> bool {
        self.range.exact_version().is_some()
    }
}

impl PartialEq for PackageIdentifier {
    fn eq(&self, other: &Self) -> bool {
        self.same_package(other)
    }
}

impl Eq for PackageIdentifier {}

impl Hash for PackageIdentifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for PackageIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id, self.range)
    }
}
