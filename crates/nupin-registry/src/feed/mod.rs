//! The feed abstraction and an ordered union of feeds

use nupin_core::{NupinError, PackageRecord, Version};
use tracing::debug;

use crate::RegistryResult;

/// A source of published packages.
///
/// `list_versions` fails with `PackageNotFound` when the feed has never
/// heard of the package. Fetching a version that is not listed also fails
/// with `PackageNotFound`.
pub trait PackageFeed {
    /// Human readable name used in log and error messages
    fn name(&self) -> &str;

    /// Every published version of a package
    fn list_versions(&self, id: &str) -> RegistryResult<Vec<Version>>;

    /// The record of one published version
    fn fetch_record(&self, id: &str, version: &Version) -> RegistryResult<PackageRecord>;

    /// The archive bytes of one published version
    fn fetch_archive(&self, id: &str, version: &Version) -> RegistryResult<Vec<u8>>;
}

/// Ordered union of feeds.
///
/// Versions are merged across every feed. Records and archives come from
/// the first feed that has the requested version.
#[derive(Default)]
pub struct FeedSet {
    feeds: Vec<Box<dyn PackageFeed>>,
}

impl FeedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a feed with lower priority than those already added
    pub fn push(&mut self, feed: Box<dyn PackageFeed>) {
        self.feeds.push(feed);
    }

    pub fn with_feed(mut self, feed: impl PackageFeed + 'static) -> Self {
        self.push(Box::new(feed));
        self
    }

    pub fn len(&self) -> usize {
        self.feeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feeds.is_empty()
    }

    fn first_hit<T>(
        &self,
        id: &str,
        version: &Version,
        fetch: impl Fn(&dyn PackageFeed) -> RegistryResult<T>,
    ) -> RegistryResult<T> {
        for feed in &self.feeds {
            match fetch(feed.as_ref()) {
                Err(err) if err.is_not_found() => {
                    debug!("{} {} not in feed '{}'", id, version, feed.name());
                },
                result => return result,
            }
        }
        Err(NupinError::not_found(format!("{} {}", id, version), self.name()))
    }
}

impl PackageFeed for FeedSet {
    fn name(&self) -> &str {
        "configured sources"
    }

    fn list_versions(&self, id: &str) -> RegistryResult<Vec<Version>> {
        let mut known = false;
        let mut versions = Vec::new();

        for feed in &self.feeds {
            match feed.list_versions(id) {
                Ok(found) => {
                    known = true;
                    versions.extend(found);
                },
                Err(err) if err.is_not_found() => {},
                Err(err) => return Err(err),
            }
        }

        if !known {
            return Err(NupinError::not_found(id, self.name()));
        }

        versions.sort();
        versions.dedup();
        Ok(versions)
    }

    fn fetch_record(&self, id: &str, version: &Version) -> RegistryResult<PackageRecord> {
        self.first_hit(id, version, |feed| feed.fetch_record(id, version))
    }

    fn fetch_archive(&self, id: &str, version: &Version) -> RegistryResult<Vec<u8>> {
        self.first_hit(id, version, |feed| feed.fetch_archive(id, version))
    }
}

#[cfg(test)]
mod tests;
