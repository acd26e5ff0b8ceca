//! The set of installed packages.
//!
//! `InstalledSet` holds at most one record per package identifier. It is the
//! only source of truth for "is X installed" and "which version of X is
//! installed" queries.

use std::collections::BTreeMap;

use super::{package_key, PackageIdentifier, PackageRecord, Version};

/// Installed packages keyed by normalized identifier
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstalledSet {
    entries: BTreeMap<String, PackageRecord>,
}

impl InstalledSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from persisted records.
    ///
    /// When the same identifier appears more than once the greatest version
    /// is kept.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = PackageRecord>,
    {
        let mut set = Self::new();
        for record in records {
            match set.entries.get(&record.key()) {
                Some(existing) if existing.version >= record.version => {},
                _ => {
                    set.insert(record);
                },
            }
        }
        set
    }

    pub fn get(&self, id: &str) -> Option<&PackageRecord> {
        self.entries.get(&package_key(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(&package_key(id))
    }

    pub fn version_of(&self, id: &str) -> Option<&Version> {
        self.get(id).map(|record| &record.version)
    }

    /// Check if the installed version of a package satisfies an identifier
    pub fn is_satisfied(&self, identifier: &PackageIdentifier) -> bool {
        self.get(identifier.id())
            .map_or(false, |record| identifier.satisfied_by(&record.version))
    }

    /// Insert a record, returning the entry it replaced
    pub fn insert(&mut self, record: PackageRecord) -> Option<PackageRecord> {
        self.entries.insert(record.key(), record)
    }

    pub fn remove(&mut self, id: &str) -> Option<PackageRecord> {
        self.entries.remove(&package_key(id))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Installed records ordered by identifier
    pub fn iter(&self) -> impl Iterator<Item = &PackageRecord> {
        self.entries.values()
    }

    pub fn to_records(&self) -> Vec<PackageRecord> {
        self.entries.values().cloned().collect()
    }

    /// Installed records that declare a dependency on the given package
    pub fn dependents_of(&self, id: &str) -> Vec<&PackageRecord> {
        let key = package_key(id);
        self.entries
            .iter()
            .filter(|(entry_key, _)| **entry_key != key)
            .map(|(_, record)| record)
            .filter(|record| record.depends_on(id))
            .collect()
    }
}
