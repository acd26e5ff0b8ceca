//! The install manager
//!
//! Operations resolve first and mutate afterwards: a failed resolution or a
//! failed download leaves the installed set untouched. While applying a plan
//! the installed set is saved after every package, so an interruption leaves
//! each package either fully installed or not installed at all. An upgrade
//! places the new version before removing the old one, so a failed placement
//! keeps the old version installed.

use indexmap::IndexSet;
use nupin_cache::PackageCache;
use nupin_core::{InstalledSet, NupinError, PackageIdentifier, PackageRecord};
use nupin_registry::PackageFeed;
use nupin_resolver::{PackageSource, ResolutionResult, ResolveOptions, Resolver};
use tracing::{debug, info, warn};

use crate::materialize::Materializer;
use crate::state::InstalledStateStore;
use crate::ManagerResult;

/// A package replaced by another version of itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upgrade {
    pub from: PackageRecord,
    pub to: PackageRecord,
}

/// Outcome of an install
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallResult {
    /// Packages that were not installed before
    pub installed: Vec<PackageRecord>,
    /// Packages whose installed version changed
    pub upgraded: Vec<Upgrade>,
    /// Packages already present at the resolved version
    pub satisfied: Vec<PackageRecord>,
}

impl InstallResult {
    /// Check if the install changed nothing
    pub fn is_noop(&self) -> bool {
        self.installed.is_empty() && self.upgraded.is_empty()
    }
}

/// A package whose files could not be removed
#[derive(Debug)]
pub struct UninstallFailure {
    pub record: PackageRecord,
    pub error: NupinError,
}

/// Outcome of an uninstall
#[derive(Debug, Default)]
pub struct UninstallResult {
    pub removed: Vec<PackageRecord>,
    pub failed: Vec<UninstallFailure>,
}

impl UninstallResult {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Applies resolution plans to a project.
///
/// The manager owns the installed set for its whole lifetime, so operations
/// taking `&mut self` are serialized by the borrow checker.
pub struct InstallManager {
    feed: Box<dyn PackageFeed>,
    cache: Box<dyn PackageCache>,
    materializer: Box<dyn Materializer>,
    store: Box<dyn InstalledStateStore>,
    options: ResolveOptions,
    installed: InstalledSet,
}

impl InstallManager {
    /// Load the installed set and get ready to install
    pub fn open(
        feed: Box<dyn PackageFeed>,
        cache: Box<dyn PackageCache>,
        materializer: Box<dyn Materializer>,
        store: Box<dyn InstalledStateStore>,
        options: ResolveOptions,
    ) -> ManagerResult<Self> {
        let records = store.load()?;
        let loaded = records.len();
        let installed = InstalledSet::from_records(records);
        if installed.len() != loaded {
            warn!(
                "Installed state lists {} duplicate entries; keeping the newest version of each",
                loaded - installed.len()
            );
        }
        debug!("Loaded {} installed packages", installed.len());

        Ok(Self {
            feed,
            cache,
            materializer,
            store,
            options,
            installed,
        })
    }

    /// Flush the installed set and release the manager
    pub fn close(self) -> ManagerResult<()> {
        self.save()
    }

    pub fn installed(&self) -> &InstalledSet {
        &self.installed
    }

    /// Check if an installed version satisfies the identifier
    pub fn is_installed(&self, id: &PackageIdentifier) -> bool {
        self.installed.is_satisfied(id)
    }

    /// Compute the plan for an install without applying it
    pub fn resolve(&self, requested: &PackageIdentifier) -> ManagerResult<ResolutionResult> {
        Resolver::new(self.feed.as_ref(), self.cache.as_ref(), self.options)
            .resolve(&self.installed, requested)
    }

    /// Install a package and everything it depends on
    pub fn install(&mut self, requested: &PackageIdentifier) -> ManagerResult<InstallResult> {
        let resolution = self.resolve(requested)?;
        info!(
            "Resolved {} into {} packages in {}ms",
            requested, resolution.package_count, resolution.resolution_time_ms
        );

        // Fetch everything before touching the project
        let mut staged = Vec::new();
        let mut result = InstallResult::default();
        for package in resolution.plan {
            if self.installed.is_satisfied(&package.record.identifier()) {
                result.satisfied.push(package.record);
                continue;
            }
            let archive = self.obtain_archive(&package.record, package.source)?;
            staged.push((package.record, archive));
        }

        for (record, archive) in staged {
            let previous = self.installed.get(&record.id).cloned();

            // The old version stays installed until the new one is in place
            self.materializer.place(&record, &archive)?;
            self.installed.insert(record.clone());
            self.save()?;

            if let Some(old) = &previous {
                self.materializer.remove(old).map_err(|err| {
                    warn!("{} is installed but files of {} were left behind", record, old);
                    err
                })?;
            }

            match previous {
                Some(from) => {
                    info!("Upgraded {} to {}", from, record.version);
                    result.upgraded.push(Upgrade { from, to: record });
                },
                None => {
                    info!("Installed {}", record);
                    result.installed.push(record);
                },
            }
        }

        Ok(result)
    }

    /// Remove a package, optionally with the dependencies nothing else needs.
    ///
    /// Nothing is removed unless the installed version satisfies `requested`.
    ///
    /// Removal is best-effort per package. A package whose files could not be
    /// deleted stays installed and is reported in `failed`; its
    /// dependencies are then kept too.
    pub fn uninstall(
        &mut self,
        requested: &PackageIdentifier,
        also_remove_dependencies: bool,
    ) -> ManagerResult<UninstallResult> {
        let Some(root) = self.installed.get(requested.id()) else {
            debug!("{} is not installed", requested.id());
            return Ok(UninstallResult::default());
        };
        if !requested.satisfied_by(&root.version) {
            debug!("{} does not match installed {}", requested, root);
            return Ok(UninstallResult::default());
        }

        let mut targets: IndexSet<String> = IndexSet::new();
        targets.insert(root.key());
        if also_remove_dependencies {
            self.collect_orphans(&mut targets);
        }

        let mut result = UninstallResult::default();
        for (position, key) in targets.iter().enumerate() {
            let Some(record) = self.installed.get(key).cloned() else {
                continue;
            };
            if position > 0 && !self.installed.dependents_of(key).is_empty() {
                debug!("Keeping {}: still required", record);
                continue;
            }
            self.remove_package(record, &mut result)?;
        }

        Ok(result)
    }

    /// Remove every installed package
    pub fn uninstall_all(&mut self) -> ManagerResult<UninstallResult> {
        let mut result = UninstallResult::default();
        for record in self.installed.to_records() {
            self.remove_package(record, &mut result)?;
        }
        Ok(result)
    }

    /// Re-create the files of installed packages that are missing on disk
    pub fn restore(&mut self) -> ManagerResult<Vec<PackageRecord>> {
        let missing: Vec<PackageRecord> = self
            .installed
            .iter()
            .filter(|record| !self.materializer.is_placed(record))
            .cloned()
            .collect();

        let mut restored = Vec::new();
        for record in missing {
            let archive = self.obtain_archive(&record, PackageSource::Installed)?;
            self.materializer.place(&record, &archive)?;
            info!("Restored {}", record);
            restored.push(record);
        }
        Ok(restored)
    }

    /// Grow the removal set with dependencies only required from inside it
    fn collect_orphans(&self, targets: &mut IndexSet<String>) {
        let mut index = 0;
        while index < targets.len() {
            let dependencies = self
                .installed
                .get(&targets[index])
                .map(|record| record.dependencies.clone())
                .unwrap_or_default();

            for dependency in dependencies {
                let key = dependency.key();
                if targets.contains(&key) || !self.installed.contains(&key) {
                    continue;
                }
                let orphaned = self
                    .installed
                    .dependents_of(&key)
                    .iter()
                    .all(|dependent| targets.contains(&dependent.key()));
                if orphaned {
                    targets.insert(key);
                }
            }
            index += 1;
        }
    }

    fn remove_package(
        &mut self,
        record: PackageRecord,
        result: &mut UninstallResult,
    ) -> ManagerResult<()> {
        match self.materializer.remove(&record) {
            Ok(()) => {
                self.installed.remove(&record.id);
                self.save()?;
                info!("Uninstalled {}", record);
                result.removed.push(record);
            },
            Err(error) => {
                warn!("Failed to uninstall {}: {}", record, error);
                result.failed.push(UninstallFailure { record, error });
            },
        }
        Ok(())
    }

    /// Archive bytes for a package, from the cache when possible.
    ///
    /// Archives downloaded from the feed are stored in the cache; a failure
    /// to store them is only logged.
    fn obtain_archive(&self, record: &PackageRecord, source: PackageSource) -> ManagerResult<Vec<u8>> {
        if source != PackageSource::Feed {
            match self.cache.fetch_archive(&record.id, &record.version) {
                Ok(archive) => return Ok(archive),
                Err(err) if err.is_not_found() => debug!("{} is not cached", record),
                Err(err @ NupinError::IntegrityFailure { .. }) => {
                    warn!("{}; downloading {} again", err, record);
                },
                Err(err) => return Err(err),
            }
        }

        let archive = self.feed.fetch_archive(&record.id, &record.version)?;
        if let Err(err) = self.cache.store(record, &archive) {
            warn!("Failed to cache {}: {}", record, err);
        }
        Ok(archive)
    }

    fn save(&self) -> ManagerResult<()> {
        self.store.save(&self.installed.to_records())
    }
}

#[cfg(test)]
mod tests;
