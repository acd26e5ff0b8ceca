//! Unit tests for the install manager

use super::*;
use camino::{Utf8Path, Utf8PathBuf};
use nupin_cache::DiskCache;
use nupin_core::Version;
use nupin_registry::FolderFeed;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, HashSet};
use std::rc::Rc;
use tempfile::TempDir;

/// Materializer that only remembers what it placed
#[derive(Default, Clone)]
struct FakeMaterializer {
    placed: Rc<RefCell<BTreeSet<String>>>,
    /// Package keys whose placement and removal fail
    failing: Rc<RefCell<HashSet<String>>>,
    /// `id version` strings whose placement fails
    failing_places: Rc<RefCell<HashSet<String>>>,
    /// `id version` strings whose removal fails
    failing_removals: Rc<RefCell<HashSet<String>>>,
}

impl FakeMaterializer {
    fn check(&self, record: &PackageRecord, versions: &RefCell<HashSet<String>>) -> ManagerResult<()> {
        if self.failing.borrow().contains(&record.key()) || versions.borrow().contains(&record.to_string()) {
            return Err(NupinError::io(
                format!("{} is locked", record),
                std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            ));
        }
        Ok(())
    }
}

impl Materializer for FakeMaterializer {
    fn place(&self, record: &PackageRecord, _archive: &[u8]) -> ManagerResult<()> {
        self.check(record, &self.failing_places)?;
        self.placed.borrow_mut().insert(record.to_string());
        Ok(())
    }

    fn remove(&self, record: &PackageRecord) -> ManagerResult<()> {
        self.check(record, &self.failing_removals)?;
        self.placed.borrow_mut().remove(&record.to_string());
        Ok(())
    }

    fn is_placed(&self, record: &PackageRecord) -> bool {
        self.placed.borrow().contains(&record.to_string())
    }
}

/// State store kept in memory
#[derive(Default, Clone)]
struct MemoryState {
    records: Rc<RefCell<Vec<PackageRecord>>>,
    saves: Rc<Cell<usize>>,
}

impl InstalledStateStore for MemoryState {
    fn load(&self) -> ManagerResult<Vec<PackageRecord>> {
        Ok(self.records.borrow().clone())
    }

    fn save(&self, records: &[PackageRecord]) -> ManagerResult<()> {
        *self.records.borrow_mut() = records.to_vec();
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

struct Fixture {
    _dir: TempDir,
    feed_root: Utf8PathBuf,
    cache_root: Utf8PathBuf,
    materializer: FakeMaterializer,
    state: MemoryState,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap().to_path_buf();
        Self {
            feed_root: root.join("feed"),
            cache_root: root.join("cache"),
            _dir: dir,
            materializer: FakeMaterializer::default(),
            state: MemoryState::default(),
        }
    }

    fn feed(&self) -> FolderFeed {
        FolderFeed::new("test", &self.feed_root)
    }

    fn publish(&self, id: &str, version: &str, dependencies: &[(&str, &str)]) -> PackageRecord {
        let record = dependencies.iter().fold(
            PackageRecord::new(id, version.parse().unwrap()),
            |record, (dep, range)| record.with_dependency(PackageIdentifier::parse(*dep, range).unwrap()),
        );
        self.feed().publish(&record, record.to_string().as_bytes()).unwrap();
        record
    }

    fn manager(&self) -> InstallManager {
        InstallManager::open(
            Box::new(self.feed()),
            Box::new(DiskCache::open(&self.cache_root).unwrap()),
            Box::new(self.materializer.clone()),
            Box::new(self.state.clone()),
            ResolveOptions::default(),
        )
        .unwrap()
    }

    fn fail_on(&self, id: &str) {
        self.materializer.failing.borrow_mut().insert(id.to_lowercase());
    }

    fn fail_placing(&self, record: &str) {
        self.materializer.failing_places.borrow_mut().insert(record.to_string());
    }

    fn fail_removing(&self, record: &str) {
        self.materializer.failing_removals.borrow_mut().insert(record.to_string());
    }

    fn placed(&self) -> Vec<String> {
        self.materializer.placed.borrow().iter().cloned().collect()
    }
}

fn pinned(id: &str, version: &str) -> PackageIdentifier {
    PackageIdentifier::pinned(id, version.parse().unwrap())
}

fn any(id: &str) -> PackageIdentifier {
    PackageIdentifier::any(id)
}

fn bootstrap_fixture() -> Fixture {
    let fixture = Fixture::new();
    fixture.publish("jQuery", "1.9.1", &[]);
    fixture.publish("jQuery", "3.1.1", &[]);
    fixture.publish("bootstrap", "3.3.7", &[("jQuery", "[1.9.1, 4.0.0)")]);
    fixture
}

#[test]
fn test_install_reports_new_packages() {
    let fixture = bootstrap_fixture();
    let mut manager = fixture.manager();

    let result = manager.install(&PackageIdentifier::any("bootstrap")).unwrap();

    let installed: Vec<String> = result.installed.iter().map(|r| r.to_string()).collect();
    assert_eq!(installed, vec!["jQuery 1.9.1", "bootstrap 3.3.7"]);
    assert!(result.upgraded.is_empty() && result.satisfied.is_empty());
    assert_eq!(fixture.placed(), vec!["bootstrap 3.3.7", "jQuery 1.9.1"]);
    assert_eq!(fixture.state.records.borrow().len(), 2);
}

#[test]
fn test_feed_archives_are_cached() {
    let fixture = bootstrap_fixture();
    fixture.manager().install(&pinned("jQuery", "3.1.1")).unwrap();

    let cache = DiskCache::open(&fixture.cache_root).unwrap();
    assert_eq!(cache.list_versions("jQuery").unwrap(), vec![Version::new(3, 1, 1)]);
}

#[test]
fn test_failed_resolution_changes_nothing() {
    let fixture = bootstrap_fixture();
    fixture.publish("broken", "1.0", &[("missing", "1.0")]);
    let mut manager = fixture.manager();

    assert!(manager.install(&PackageIdentifier::any("broken")).is_err());
    assert!(manager.installed().is_empty());
    assert!(fixture.placed().is_empty());
    assert_eq!(fixture.state.saves.get(), 0);
}

#[test]
fn test_missing_archive_aborts_before_any_placement() {
    let fixture = bootstrap_fixture();
    std::fs::remove_file(fixture.feed_root.join("jquery").join("1.9.1").join("package.tgz")).unwrap();
    let mut manager = fixture.manager();

    let err = manager.install(&PackageIdentifier::any("bootstrap")).unwrap_err();

    assert!(err.is_not_found());
    assert!(fixture.placed().is_empty());
    assert!(manager.installed().is_empty());
}

#[test]
fn test_resolve_is_a_dry_run() {
    let fixture = bootstrap_fixture();
    let manager = fixture.manager();

    let resolution = manager.resolve(&PackageIdentifier::any("bootstrap")).unwrap();

    assert_eq!(resolution.package_count, 2);
    assert!(manager.installed().is_empty());
    assert!(fixture.placed().is_empty());
}

#[test]
fn test_duplicate_state_entries_collapse() {
    let fixture = bootstrap_fixture();
    *fixture.state.records.borrow_mut() = vec![
        PackageRecord::new("jQuery", "1.9.1".parse().unwrap()),
        PackageRecord::new("jquery", "3.1.1".parse().unwrap()),
    ];

    let manager = fixture.manager();

    assert_eq!(manager.installed().len(), 1);
    assert!(manager.is_installed(&pinned("jQuery", "3.1.1")));
    assert!(!manager.is_installed(&pinned("jQuery", "1.9.1")));
}

#[test]
fn test_close_flushes_state() {
    let fixture = bootstrap_fixture();
    *fixture.state.records.borrow_mut() = vec![
        PackageRecord::new("jQuery", "1.9.1".parse().unwrap()),
        PackageRecord::new("jquery", "3.1.1".parse().unwrap()),
    ];

    fixture.manager().close().unwrap();

    let records = fixture.state.records.borrow();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].version.to_string(), "3.1.1");
}

#[test]
fn test_upgrade_replaces_previous_version() {
    let fixture = bootstrap_fixture();
    let mut manager = fixture.manager();
    manager.install(&pinned("jQuery", "1.9.1")).unwrap();

    let result = manager.install(&pinned("jQuery", "3.1.1")).unwrap();

    assert_eq!(result.upgraded.len(), 1);
    assert_eq!(result.upgraded[0].from.version.to_string(), "1.9.1");
    assert_eq!(fixture.placed(), vec!["jQuery 3.1.1"]);
    assert_eq!(fixture.state.records.borrow()[0].to_string(), "jQuery 3.1.1");
}

#[test]
fn test_failed_placement_keeps_previous_version() {
    let fixture = bootstrap_fixture();
    let mut manager = fixture.manager();
    manager.install(&pinned("jQuery", "1.9.1")).unwrap();
    fixture.fail_placing("jQuery 3.1.1");

    assert!(manager.install(&pinned("jQuery", "3.1.1")).is_err());

    let installed = manager.installed().get("jQuery").unwrap().clone();
    assert_eq!(installed.to_string(), "jQuery 1.9.1");
    assert!(fixture.materializer.is_placed(&installed));
    assert_eq!(fixture.placed(), vec!["jQuery 1.9.1"]);
    let persisted: Vec<String> = fixture.state.records.borrow().iter().map(|r| r.to_string()).collect();
    assert_eq!(persisted, vec!["jQuery 1.9.1"]);
}

#[test]
fn test_failed_removal_of_previous_version_records_the_upgrade() {
    let fixture = bootstrap_fixture();
    let mut manager = fixture.manager();
    manager.install(&pinned("jQuery", "1.9.1")).unwrap();
    fixture.fail_removing("jQuery 1.9.1");

    assert!(manager.install(&pinned("jQuery", "3.1.1")).is_err());

    assert!(manager.is_installed(&pinned("jQuery", "3.1.1")));
    assert_eq!(fixture.state.records.borrow()[0].to_string(), "jQuery 3.1.1");
    assert_eq!(fixture.placed(), vec!["jQuery 1.9.1", "jQuery 3.1.1"]);
}

#[test]
fn test_uninstall_keeps_shared_dependencies() {
    let fixture = bootstrap_fixture();
    fixture.publish("jQuery.Validation", "1.17.0", &[("jQuery", "[1.9.1, 4.0.0)")]);
    let mut manager = fixture.manager();
    manager.install(&PackageIdentifier::any("bootstrap")).unwrap();
    manager.install(&PackageIdentifier::any("jQuery.Validation")).unwrap();

    let result = manager.uninstall(&any("bootstrap"), true).unwrap();
    assert_eq!(result.removed.len(), 1);
    assert!(manager.installed().contains("jQuery"));

    let result = manager.uninstall(&any("jquery.validation"), true).unwrap();
    let removed: Vec<String> = result.removed.iter().map(|r| r.id.clone()).collect();
    assert_eq!(removed, vec!["jQuery.Validation", "jQuery"]);
    assert!(manager.installed().is_empty());
    assert!(fixture.placed().is_empty());
}

#[test]
fn test_uninstall_without_dependencies() {
    let fixture = bootstrap_fixture();
    let mut manager = fixture.manager();
    manager.install(&PackageIdentifier::any("bootstrap")).unwrap();

    manager.uninstall(&any("bootstrap"), false).unwrap();

    assert!(!manager.installed().contains("bootstrap"));
    assert!(manager.installed().contains("jQuery"));
}

#[test]
fn test_uninstall_unknown_package_is_noop() {
    let fixture = bootstrap_fixture();
    let mut manager = fixture.manager();

    let result = manager.uninstall(&any("bootstrap"), true).unwrap();
    assert!(result.removed.is_empty() && result.is_complete());
}

#[test]
fn test_uninstall_requires_matching_version() {
    let fixture = bootstrap_fixture();
    let mut manager = fixture.manager();
    manager.install(&pinned("jQuery", "3.1.1")).unwrap();

    let result = manager.uninstall(&pinned("jQuery", "1.9.1"), false).unwrap();
    assert!(result.removed.is_empty());
    assert!(manager.installed().contains("jQuery"));

    let result = manager.uninstall(&pinned("JQUERY", "3.1.1"), false).unwrap();
    assert_eq!(result.removed.len(), 1);
    assert!(manager.installed().is_empty());
}

#[test]
fn test_failed_removal_keeps_entry_and_its_dependencies() {
    let fixture = bootstrap_fixture();
    let mut manager = fixture.manager();
    manager.install(&PackageIdentifier::any("bootstrap")).unwrap();
    fixture.fail_on("bootstrap");

    let result = manager.uninstall(&any("bootstrap"), true).unwrap();

    assert!(!result.is_complete());
    assert_eq!(result.failed[0].record.id, "bootstrap");
    assert!(result.removed.is_empty());
    assert!(manager.installed().contains("bootstrap"));
    assert!(manager.installed().contains("jQuery"));
}

#[test]
fn test_uninstall_all_is_best_effort() {
    let fixture = bootstrap_fixture();
    fixture.publish("protobuf-net", "2.0.0.668", &[]);
    let mut manager = fixture.manager();
    manager.install(&PackageIdentifier::any("bootstrap")).unwrap();
    manager.install(&PackageIdentifier::any("protobuf-net")).unwrap();
    fixture.fail_on("jquery");

    let result = manager.uninstall_all().unwrap();

    assert_eq!(result.removed.len(), 2);
    assert_eq!(result.failed.len(), 1);
    assert_eq!(manager.installed().len(), 1);
    assert!(manager.installed().contains("jQuery"));
}

#[test]
fn test_restore_places_only_missing_packages() {
    let fixture = bootstrap_fixture();
    let mut manager = fixture.manager();
    manager.install(&PackageIdentifier::any("bootstrap")).unwrap();
    fixture.materializer.placed.borrow_mut().remove("jQuery 1.9.1");

    let restored = manager.restore().unwrap();

    assert_eq!(restored.len(), 1);
    assert_eq!(restored[0].to_string(), "jQuery 1.9.1");
    assert!(manager.restore().unwrap().is_empty());
}

#[test]
fn test_corrupt_cache_entry_is_downloaded_again() {
    let fixture = bootstrap_fixture();
    let mut manager = fixture.manager();
    manager.install(&pinned("jQuery", "3.1.1")).unwrap();

    std::fs::write(fixture.cache_root.join("jquery").join("3.1.1").join("package.tgz"), b"junk").unwrap();
    fixture.materializer.placed.borrow_mut().clear();

    assert_eq!(manager.restore().unwrap().len(), 1);

    let cache = DiskCache::open(&fixture.cache_root).unwrap();
    assert_eq!(cache.fetch_archive("jQuery", &"3.1.1".parse().unwrap()).unwrap(), b"jQuery 3.1.1");
}
