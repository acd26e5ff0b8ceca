//! Candidate version selection
//!
//! With cache preference enabled, the newest cached version inside the range
//! wins. Otherwise the lowest version inside the range is taken from the
//! union of cached and feed versions. A version present in both places is
//! taken from the cache.

use std::collections::BTreeSet;
use std::fmt;

use nupin_core::{Version, VersionRange};

/// Where a resolved package comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageSource {
    /// Already installed and reused as is
    Installed,
    /// Local package cache
    Cache,
    /// Remote or folder feed
    Feed,
}

impl fmt::Display for PackageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageSource::Installed => write!(f, "installed"),
            PackageSource::Cache => write!(f, "cache"),
            PackageSource::Feed => write!(f, "feed"),
        }
    }
}

/// A selected version and the source to fetch it from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub version: Version,
    pub source: PackageSource,
}

/// Versions of one package known to the cache and the feeds
#[derive(Debug, Clone, Default)]
pub struct VersionSelector {
    cached: BTreeSet<Version>,
    published: BTreeSet<Version>,
}

impl VersionSelector {
    pub fn new(cached: Vec<Version>, published: Vec<Version>) -> Self {
        Self {
            cached: cached.into_iter().collect(),
            published: published.into_iter().collect(),
        }
    }

    /// Pick the version to use for a range, if any satisfies it
    pub fn select(&self, range: &VersionRange, prefer_cache: bool) -> Option<Candidate> {
        if prefer_cache {
            if let Some(version) = self.cached.iter().rev().find(|v| range.contains(v)) {
                return Some(Candidate {
                    version: version.clone(),
                    source: PackageSource::Cache,
                });
            }
        }

        let lowest_cached = self.cached.iter().find(|v| range.contains(v));
        let lowest_published = self.published.iter().find(|v| range.contains(v));

        match (lowest_cached, lowest_published) {
            (Some(cached), Some(published)) if published < cached => Some(Candidate {
                version: published.clone(),
                source: PackageSource::Feed,
            }),
            (Some(cached), _) => Some(Candidate {
                version: cached.clone(),
                source: PackageSource::Cache,
            }),
            (None, Some(published)) => Some(Candidate {
                version: published.clone(),
                source: PackageSource::Feed,
            }),
            (None, None) => None,
        }
    }

    /// Every known version inside a range, lowest first
    pub fn find_matching(&self, range: &VersionRange) -> Vec<Version> {
        self.cached
            .union(&self.published)
            .filter(|v| range.contains(v))
            .cloned()
            .collect()
    }

    /// Check if neither the cache nor the feeds know any version
    pub fn is_empty(&self) -> bool {
        self.cached.is_empty() && self.published.is_empty()
    }
}
