//! Greedy transitive resolver
//!
//! The resolver keeps a working map from package key to the record chosen so
//! far, seeded with the installed packages, and drains a queue of
//! requirements starting with the requested identifier:
//!
//! - a requirement already satisfied by the working map is recorded and
//!   skipped, which is how installed versions are reused
//! - otherwise a candidate is selected (see [`VersionSelector`])
//! - a package seen for the first time takes the candidate
//! - an explicitly requested package replaces an installed version that does
//!   not satisfy the request
//! - any other clash keeps the newest version, which must satisfy every
//!   requirement recorded for the package so far
//!
//! The plan is the set of packages reachable from the request, ordered so
//! that dependencies come before their dependents.

use std::collections::{HashMap, VecDeque};
use std::time::Instant;

use indexmap::{IndexMap, IndexSet};
use nupin_cache::PackageCache;
use nupin_core::{InstalledSet, NupinError, PackageIdentifier, PackageRecord, VersionRange};
use nupin_registry::PackageFeed;
use tracing::debug;

use crate::graph::PlanGraph;
use crate::selector::{Candidate, PackageSource, VersionSelector};
use crate::ResolverResult;

const ROOT_REQUESTER: &str = "install request";

/// Resolution policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Take the newest cached version in range before looking at feeds
    pub prefer_cache: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self { prefer_cache: true }
    }
}

/// One entry of an installation plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPackage {
    pub record: PackageRecord,
    pub source: PackageSource,
}

/// Result of dependency resolution
#[derive(Debug, Clone)]
pub struct ResolutionResult {
    /// Packages to install or keep, dependencies before dependents
    pub plan: Vec<ResolvedPackage>,
    /// Total number of packages in the plan
    pub package_count: usize,
    /// Resolution time in milliseconds
    pub resolution_time_ms: u64,
}

impl ResolutionResult {
    /// The requested package, always last in the plan
    pub fn root(&self) -> Option<&ResolvedPackage> {
        self.plan.last()
    }

    pub fn get(&self, id: &str) -> Option<&ResolvedPackage> {
        let key = nupin_core::package_key(id);
        self.plan.iter().find(|package| package.record.key() == key)
    }

    pub fn records(&self) -> impl Iterator<Item = &PackageRecord> {
        self.plan.iter().map(|package| &package.record)
    }
}

/// A requirement recorded against a working entry
#[derive(Debug, Clone)]
struct Constraint {
    range: VersionRange,
    required_by: Option<String>,
}

impl Constraint {
    fn requester(&self) -> String {
        requester_label(&self.required_by)
    }
}

#[derive(Debug)]
struct WorkingEntry {
    record: PackageRecord,
    source: PackageSource,
    constraints: Vec<Constraint>,
    /// Chosen during this pass, so its dependencies were queued
    chosen: bool,
}

fn requester_label(required_by: &Option<String>) -> String {
    required_by.clone().unwrap_or_else(|| ROOT_REQUESTER.to_string())
}

/// Greedy resolver over a feed and a cache
pub struct Resolver<'a> {
    feed: &'a dyn PackageFeed,
    cache: &'a dyn PackageCache,
    options: ResolveOptions,
}

/// State of a single resolution pass
struct Pass<'r, 'a> {
    resolver: &'r Resolver<'a>,
    working: IndexMap<String, WorkingEntry>,
    touched: IndexSet<String>,
    selectors: HashMap<String, VersionSelector>,
    queue: VecDeque<(PackageIdentifier, Option<String>)>,
}

impl<'a> Resolver<'a> {
    pub fn new(feed: &'a dyn PackageFeed, cache: &'a dyn PackageCache, options: ResolveOptions) -> Self {
        Self { feed, cache, options }
    }

    pub fn options(&self) -> ResolveOptions {
        self.options
    }

    /// Compute the installation plan for a requested package.
    ///
    /// Nothing is fetched besides version lists and records, and the
    /// installed set is only read.
    pub fn resolve(
        &self,
        installed: &InstalledSet,
        requested: &PackageIdentifier,
    ) -> ResolverResult<ResolutionResult> {
        let start_time = Instant::now();

        let working = installed
            .iter()
            .map(|record| {
                let entry = WorkingEntry {
                    record: record.clone(),
                    source: PackageSource::Installed,
                    constraints: Vec::new(),
                    chosen: false,
                };
                (record.key(), entry)
            })
            .collect();

        let mut pass = Pass {
            resolver: self,
            working,
            touched: IndexSet::new(),
            selectors: HashMap::new(),
            queue: VecDeque::from([(requested.clone(), None)]),
        };

        while let Some((identifier, required_by)) = pass.queue.pop_front() {
            pass.visit(identifier, required_by)?;
        }

        let plan = pass.into_plan(&requested.key())?;
        let resolution_time_ms = start_time.elapsed().as_millis() as u64;
        debug!("Resolved {} into {} packages in {}ms", requested, plan.len(), resolution_time_ms);

        Ok(ResolutionResult {
            package_count: plan.len(),
            plan,
            resolution_time_ms,
        })
    }
}

impl<'r, 'a> Pass<'r, 'a> {
    fn visit(&mut self, identifier: PackageIdentifier, required_by: Option<String>) -> ResolverResult<()> {
        let key = identifier.key();
        let constraint = Constraint {
            range: identifier.range().clone(),
            required_by,
        };

        if let Some(entry) = self.working.get_mut(&key) {
            if identifier.satisfied_by(&entry.record.version) {
                debug!("{} satisfied by {} ({})", identifier, entry.record, entry.source);
                entry.constraints.push(constraint);
                self.touched.insert(key);
                return Ok(());
            }
        }

        let candidate = self.select(&identifier)?.ok_or_else(|| NupinError::UnresolvableDependency {
            package: identifier.id().to_string(),
            range: identifier.range().to_string(),
            required_by: constraint.requester(),
        })?;

        match self.working.get(&key) {
            None => {},
            Some(existing) if existing.constraints.is_empty() && constraint.required_by.is_none() => {
                debug!("{} replaces installed {}", identifier, existing.record);
            },
            Some(existing) => self.newest_wins(existing, &candidate, &constraint)?,
        }

        let record = self.fetch_record(identifier.id(), &candidate)?;
        debug!("Selected {} from {}", record, candidate.source);

        let requester = record.to_string();
        for dependency in &record.dependencies {
            self.queue.push_back((dependency.clone(), Some(requester.clone())));
        }

        let mut constraints = self
            .working
            .get(&key)
            .map(|existing| existing.constraints.clone())
            .unwrap_or_default();
        constraints.push(constraint);

        self.working.insert(
            key.clone(),
            WorkingEntry {
                record,
                source: candidate.source,
                constraints,
                chosen: true,
            },
        );
        self.touched.insert(key);
        Ok(())
    }

    /// Settle a clash between the working entry and a new candidate.
    ///
    /// Succeeds when the candidate is newer and satisfies every earlier
    /// requirement, in which case it replaces the entry.
    fn newest_wins(
        &self,
        existing: &WorkingEntry,
        candidate: &Candidate,
        constraint: &Constraint,
    ) -> ResolverResult<()> {
        let package = existing.record.id.clone();

        if candidate.version <= existing.record.version {
            // The kept version is the existing one, which misses this range
            return Err(NupinError::VersionConflict {
                package,
                required: constraint.range.to_string(),
                required_by: constraint.requester(),
                selected: existing.record.version.to_string(),
            });
        }

        if let Some(violated) = existing
            .constraints
            .iter()
            .find(|earlier| !earlier.range.contains(&candidate.version))
        {
            return Err(NupinError::VersionConflict {
                package,
                required: violated.range.to_string(),
                required_by: violated.requester(),
                selected: candidate.version.to_string(),
            });
        }

        debug!("{} {} supersedes {}", package, candidate.version, existing.record.version);
        Ok(())
    }

    fn select(&mut self, identifier: &PackageIdentifier) -> ResolverResult<Option<Candidate>> {
        let key = identifier.key();
        if !self.selectors.contains_key(&key) {
            let selector = self.load_selector(identifier.id())?;
            self.selectors.insert(key.clone(), selector);
        }

        Ok(self
            .selectors
            .get(&key)
            .and_then(|selector| selector.select(identifier.range(), self.resolver.options.prefer_cache)))
    }

    fn load_selector(&self, id: &str) -> ResolverResult<VersionSelector> {
        let cached = self.resolver.cache.list_versions(id)?;
        let published = match self.resolver.feed.list_versions(id) {
            Ok(versions) => versions,
            Err(err) if err.is_not_found() => {
                debug!("{} is not published in {}", id, self.resolver.feed.name());
                Vec::new()
            },
            Err(err) => return Err(err),
        };
        Ok(VersionSelector::new(cached, published))
    }

    fn fetch_record(&self, id: &str, candidate: &Candidate) -> ResolverResult<PackageRecord> {
        match candidate.source {
            PackageSource::Cache => self.resolver.cache.fetch_record(id, &candidate.version),
            _ => self.resolver.feed.fetch_record(id, &candidate.version),
        }
    }

    fn into_plan(mut self, root: &str) -> ResolverResult<Vec<ResolvedPackage>> {
        let mut graph = PlanGraph::new();
        graph.add_package(root);

        let mut pending = vec![root.to_string()];
        let mut reached = IndexSet::new();
        while let Some(key) = pending.pop() {
            if !reached.insert(key.clone()) {
                continue;
            }
            let Some(entry) = self.working.get(&key) else {
                continue;
            };
            if !entry.chosen {
                continue;
            }
            for dependency in &entry.record.dependencies {
                let dependency_key = dependency.key();
                if self.touched.contains(&dependency_key) {
                    graph.add_dependency(&key, &dependency_key);
                    pending.push(dependency_key);
                }
            }
        }

        let order = graph.dependency_order().map_err(|cycle| NupinError::CyclicDependency {
            cycle: PlanGraph::format_cycle(&cycle),
        })?;

        Ok(order
            .into_iter()
            .filter_map(|key| self.working.swap_remove(&key))
            .map(|entry| ResolvedPackage {
                record: entry.record,
                source: entry.source,
            })
            .collect())
    }
}
