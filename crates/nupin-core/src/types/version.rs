//! Dotted numeric versions with optional pre-release labels.
//!
//! Versions carry any number of release segments (`1.0`, `4.7.49.5`) and an
//! optional pre-release label (`1.0.0-rc1`). Build metadata after `+` is kept
//! for display but ignored when ordering.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;

/// Package version (segment.segment[.segment...][-prerelease][+build])
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    release: Vec<u64>,
    prerelease: Option<String>,
    build: Option<String>,
}

/// Version and range parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("Invalid version format: '{input}'")]
    InvalidFormat { input: String },

    #[error("Invalid number '{component}' in version '{input}'")]
    InvalidNumber { input: String, component: String },

    #[error("Invalid prerelease label in version '{input}'")]
    InvalidPrerelease { input: String },

    #[error("Invalid version range '{input}': {reason}")]
    InvalidRange { input: String, reason: String },

    #[error("Inverted version range '{input}': the lower bound exceeds the upper bound")]
    InvertedRange { input: String },

    #[error("Invalid package id '{id}': {reason}")]
    InvalidPackageId { id: String, reason: String },
}

impl Version {
    /// Create a three-segment release version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self::from_segments(vec![major, minor, patch])
    }

    /// Create a release version from arbitrary segments
    pub fn from_segments(release: Vec<u64>) -> Self {
        Self {
            release,
            prerelease: None,
            build: None,
        }
    }

    /// Attach a pre-release label
    pub fn with_prerelease(mut self, label: impl Into<String>) -> Self {
        self.prerelease = Some(label.into());
        self
    }

    /// Release segments as written
    pub fn segments(&self) -> &[u64] {
        &self.release
    }

    pub fn prerelease(&self) -> Option<&str> {
        self.prerelease.as_deref()
    }

    pub fn build(&self) -> Option<&str> {
        self.build.as_deref()
    }

    /// Check if this is a prerelease version
    pub fn is_prerelease(&self) -> bool {
        self.prerelease.is_some()
    }

    /// Release segments with trailing zeros removed, so `1.0` and `1.0.0` agree
    fn significant_segments(&self) -> &[u64] {
        let len = self
            .release
            .iter()
            .rposition(|segment| *segment != 0)
            .map_or(0, |pos| pos + 1);
        &self.release[..len]
    }

    /// Get the precedence for comparison (ignores build metadata)
    fn precedence_cmp(&self, other: &Self) -> Ordering {
        let width = self.release.len().max(other.release.len());
        for i in 0..width {
            let a = self.release.get(i).copied().unwrap_or(0);
            let b = other.release.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }

        match (&self.prerelease, &other.prerelease) {
            (None, None) => Ordering::Equal,
            (Some(_), None) => Ordering::Less,    // prerelease < release
            (None, Some(_)) => Ordering::Greater, // release > prerelease
            (Some(a), Some(b)) => a.as_bytes().cmp(b.as_bytes()),
        }
    }
}

/// Labels and build metadata are dot-separated ASCII alphanumerics and hyphens
fn is_label(text: &str) -> bool {
    !text.is_empty()
        && text
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'-')
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        if input.is_empty() {
            return Err(VersionError::InvalidFormat {
                input: input.to_string(),
            });
        }

        // Split on '+' for build metadata
        let (version_part, build) = match input.split_once('+') {
            Some((v, b)) => (v, Some(b.to_string())),
            None => (input, None),
        };

        if let Some(build) = &build {
            if !is_label(build) {
                return Err(VersionError::InvalidFormat {
                    input: input.to_string(),
                });
            }
        }

        // Split on the first '-' for the prerelease label
        let (core_part, prerelease) = match version_part.split_once('-') {
            Some((_, label)) if !is_label(label) => {
                return Err(VersionError::InvalidPrerelease {
                    input: input.to_string(),
                })
            },
            Some((c, p)) => (c, Some(p.to_string())),
            None => (version_part, None),
        };

        let mut release = Vec::new();
        for component in core_part.split('.') {
            if component.is_empty() || !component.bytes().all(|b| b.is_ascii_digit()) {
                return Err(VersionError::InvalidNumber {
                    input: input.to_string(),
                    component: component.to_string(),
                });
            }
            let segment = component.parse().map_err(|_| VersionError::InvalidNumber {
                input: input.to_string(),
                component: component.to_string(),
            })?;
            release.push(segment);
        }

        Ok(Version {
            release,
            prerelease,
            build,
        })
    }
}

impl TryFrom<String> for Version {
    type Error = VersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.to_string()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut segments = self.release.iter();
        if let Some(first) = segments.next() {
            write!(f, "{}", first)?;
        }
        for segment in segments {
            write!(f, ".{}", segment)?;
        }

        if let Some(ref pre) = self.prerelease {
            write!(f, "-{}", pre)?;
        }

        if let Some(ref build) = self.build {
            write!(f, "+{}", build)?;
        }

        Ok(())
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.precedence_cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant_segments().hash(state);
        self.prerelease.hash(state);
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.precedence_cmp(other)
    }
}
