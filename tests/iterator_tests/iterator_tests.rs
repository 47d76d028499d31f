//! Tests for the range iterator
//!
//! These tests verify:
//! - Ascending/descending key order
//! - Seek in both directions
//! - Prefix filtering on rewind/seek/next
//! - Value resolution through the engine
//! - Snapshot behaviour under concurrent writes

use caskdb::config::Config;
use caskdb::engine::Engine;
use caskdb::iterator::{DbIterator, IteratorOptions};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_engine_with(keys: &[&str]) -> (TempDir, Engine) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .dir_path(temp_dir.path())
        .max_segment_size(128) // keep values spread over several segments
        .build();
    let engine = Engine::open(config).unwrap();
    for key in keys {
        engine
            .put(key.as_bytes(), format!("v:{}", key).as_bytes())
            .unwrap();
    }
    (temp_dir, engine)
}

fn collect_keys(iter: &mut DbIterator<'_>) -> Vec<String> {
    let mut keys = Vec::new();
    while iter.valid() {
        keys.push(String::from_utf8(iter.key().to_vec()).unwrap());
        iter.next();
    }
    keys
}

const KEYS: &[&str] = &["user:2", "order:1", "user:10", "admin", "user:1", "order:7", "zeta"];

// =============================================================================
// Ordering Tests
// =============================================================================

#[test]
fn test_iterator_ascending() {
    let (_temp, engine) = setup_engine_with(KEYS);

    let mut iter = engine.iter(IteratorOptions::default());

    assert_eq!(
        collect_keys(&mut iter),
        vec!["admin", "order:1", "order:7", "user:1", "user:10", "user:2", "zeta"]
    );
}

#[test]
fn test_iterator_descending() {
    let (_temp, engine) = setup_engine_with(KEYS);

    let mut iter = engine.iter(IteratorOptions::default().reverse(true));

    assert_eq!(
        collect_keys(&mut iter),
        vec!["zeta", "user:2", "user:10", "user:1", "order:7", "order:1", "admin"]
    );
}

#[test]
fn test_iterator_empty_engine() {
    let (_temp, engine) = setup_engine_with(&[]);

    let mut iter = engine.iter(IteratorOptions::with_prefix("user:"));
    assert!(!iter.valid());
    iter.rewind();
    assert!(!iter.valid());
}

// =============================================================================
// Seek Tests
// =============================================================================

#[test]
fn test_seek_ascending() {
    let (_temp, engine) = setup_engine_with(KEYS);
    let mut iter = engine.iter(IteratorOptions::default());

    iter.seek(b"p");
    assert_eq!(iter.key(), b"user:1");

    iter.seek(b"order:7");
    assert_eq!(iter.key(), b"order:7");

    iter.seek(b"zz");
    assert!(!iter.valid());
}

#[test]
fn test_seek_descending() {
    let (_temp, engine) = setup_engine_with(KEYS);
    let mut iter = engine.iter(IteratorOptions::default().reverse(true));

    iter.seek(b"p");
    assert_eq!(iter.key(), b"order:7");

    iter.seek(b"user:1");
    assert_eq!(iter.key(), b"user:1");

    iter.seek(b"a");
    assert!(!iter.valid());
}

// =============================================================================
// Prefix Tests
// =============================================================================

#[test]
fn test_prefix_ascending() {
    let (_temp, engine) = setup_engine_with(KEYS);

    let mut iter = engine.iter(IteratorOptions::with_prefix("user:"));

    assert_eq!(collect_keys(&mut iter), vec!["user:1", "user:10", "user:2"]);
}

#[test]
fn test_prefix_descending() {
    let (_temp, engine) = setup_engine_with(KEYS);

    let mut iter = engine.iter(IteratorOptions::with_prefix("order:").reverse(true));

    assert_eq!(collect_keys(&mut iter), vec!["order:7", "order:1"]);
}

#[test]
fn test_prefix_with_rewind_and_seek() {
    let (_temp, engine) = setup_engine_with(KEYS);
    let mut iter = engine.iter(IteratorOptions::with_prefix("user:"));

    // Seek lands before the prefix range, then skips forward into it
    iter.seek(b"order:9");
    assert_eq!(iter.key(), b"user:1");

    iter.seek(b"user:11");
    assert_eq!(iter.key(), b"user:2");

    // Past the last matching key, skipping runs off the end
    iter.next();
    assert!(!iter.valid());

    iter.rewind();
    assert_eq!(iter.key(), b"user:1");
}

#[test]
fn test_prefix_without_matches() {
    let (_temp, engine) = setup_engine_with(KEYS);

    let mut iter = engine.iter(IteratorOptions::with_prefix("missing"));

    assert!(collect_keys(&mut iter).is_empty());
}

#[test]
fn test_prefix_longer_than_key() {
    let (_temp, engine) = setup_engine_with(&["ab", "abc", "abcd"]);

    let mut iter = engine.iter(IteratorOptions::with_prefix("abc"));

    assert_eq!(collect_keys(&mut iter), vec!["abc", "abcd"]);
}

// =============================================================================
// Value Tests
// =============================================================================

#[test]
fn test_values_resolve_through_engine() {
    let (_temp, engine) = setup_engine_with(KEYS);
    let mut iter = engine.iter(IteratorOptions::default());

    while iter.valid() {
        let key = String::from_utf8(iter.key().to_vec()).unwrap();
        assert_eq!(iter.value().unwrap(), format!("v:{}", key).into_bytes());
        iter.next();
    }
    iter.close();
    assert!(!iter.valid());
}

#[test]
fn test_snapshot_ignores_later_writes() {
    let (_temp, engine) = setup_engine_with(&["a", "b"]);
    let mut iter = engine.iter(IteratorOptions::default());

    engine.put(b"c", b"new").unwrap();
    engine.put(b"a", b"overwritten").unwrap();

    assert_eq!(collect_keys(&mut iter), vec!["a", "b"]);

    // The snapshot still points at the original record for "a"
    iter.rewind();
    assert_eq!(iter.value().unwrap(), b"v:a".to_vec());
}

#[test]
fn test_snapshot_value_after_delete_is_still_readable() {
    let (_temp, engine) = setup_engine_with(&["a", "b"]);
    let iter = engine.iter(IteratorOptions::default());

    engine.delete(b"a").unwrap();

    // Sealed log records never change, so the old position still decodes
    assert_eq!(iter.key(), b"a");
    assert_eq!(iter.value().unwrap(), b"v:a".to_vec());
    assert!(engine.get(b"a").is_err());
}

#[test]
fn test_many_keys_across_segments_in_order() {
    let keys: Vec<String> = (0..200).rev().map(|i| format!("k{:04}", i)).collect();
    let key_refs: Vec<&str> = keys.iter().map(String::as_str).collect();
    let (_temp, engine) = setup_engine_with(&key_refs);

    assert!(engine.segment_count() > 1);

    let mut iter = engine.iter(IteratorOptions::default());
    let collected = collect_keys(&mut iter);

    let mut expected = keys.clone();
    expected.sort();
    assert_eq!(collected, expected);
    assert!(collected.windows(2).all(|w| w[0] < w[1]));
}
