//! Unit tests for the feed union

use super::*;
use crate::FolderFeed;
use tempfile::TempDir;

fn v(s: &str) -> Version {
    s.parse().unwrap()
}

fn folder(dir: &TempDir, name: &str, packages: &[(&str, &str)]) -> FolderFeed {
    let feed = FolderFeed::new(name, camino::Utf8Path::from_path(dir.path()).unwrap());
    for (id, version) in packages {
        let record = PackageRecord::new(*id, v(version)).with_description(name.to_string());
        feed.publish(&record, b"archive").unwrap();
    }
    feed
}

#[test]
fn test_versions_merge_across_feeds() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    let set = FeedSet::new()
        .with_feed(folder(&first, "local", &[("jQuery", "1.9.1"), ("jQuery", "3.1.1")]))
        .with_feed(folder(&second, "mirror", &[("jQuery", "3.1.1"), ("jQuery", "2.2.4")]));

    assert_eq!(set.len(), 2);
    assert_eq!(set.list_versions("jquery").unwrap(), vec![v("1.9.1"), v("2.2.4"), v("3.1.1")]);
}

#[test]
fn test_first_feed_wins_for_records() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    let set = FeedSet::new()
        .with_feed(folder(&first, "local", &[("jQuery", "3.1.1")]))
        .with_feed(folder(&second, "mirror", &[("jQuery", "3.1.1"), ("jQuery", "2.2.4")]));

    let record = set.fetch_record("jQuery", &v("3.1.1")).unwrap();
    assert_eq!(record.description.as_deref(), Some("local"));

    let record = set.fetch_record("jQuery", &v("2.2.4")).unwrap();
    assert_eq!(record.description.as_deref(), Some("mirror"));
    assert_eq!(set.fetch_archive("jQuery", &v("2.2.4")).unwrap(), b"archive");
}

#[test]
fn test_unknown_package() {
    let dir = TempDir::new().unwrap();
    let set = FeedSet::new().with_feed(folder(&dir, "local", &[("jQuery", "3.1.1")]));

    assert!(set.list_versions("bootstrap").unwrap_err().is_not_found());
    assert!(set.fetch_record("jQuery", &v("9.9.9")).unwrap_err().is_not_found());
    assert!(FeedSet::new().list_versions("jQuery").unwrap_err().is_not_found());
}
