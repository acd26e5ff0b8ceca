//! Unit tests for the version index cache

use super::*;

fn versions() -> Vec<Version> {
    vec!["1.9.1".parse().unwrap(), "3.1.1".parse().unwrap()]
}

#[test]
fn test_cache_entry_freshness() {
    let entry = CacheEntry::new(versions(), DEFAULT_TTL);
    assert!(entry.is_fresh());

    let expired = CacheEntry::new(versions(), Duration::from_secs(0));
    assert!(!expired.is_fresh());
}

#[test]
fn test_insert_and_get_ignore_case() {
    let cache = MetadataCache::new();
    assert!(cache.get("jQuery").is_none());

    cache.insert("jQuery", versions());
    assert_eq!(cache.get("JQUERY"), Some(versions()));
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_stale_entries_are_dropped() {
    let cache = MetadataCache::with_ttl(Duration::from_secs(0));
    cache.insert("jQuery", versions());

    assert!(cache.get("jQuery").is_none());
    assert!(cache.is_empty());
}

#[test]
fn test_invalidate_and_clear() {
    let cache = MetadataCache::new();
    cache.insert("jQuery", versions());
    cache.insert("bootstrap", versions());

    cache.invalidate("jquery");
    assert!(cache.get("jQuery").is_none());
    assert_eq!(cache.len(), 1);

    cache.clear();
    assert!(cache.is_empty());
}
