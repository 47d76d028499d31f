//! Index Module
//!
//! The in-memory keydir: key → position of its latest record.
//!
//! ## Responsibilities
//! - Point lookups for the read path
//! - Ordered snapshot iteration for range scans
//! - Each implementation guards itself with its own lock
//!
//! ## Variants
//! - `BTree`: BTreeMap under a RwLock (ordered, byte-wise lexicographic)
//! - `Art`: adaptive radix trie, reserved; selecting it fails with `NotImplemented`

mod btree;

use crate::config::IndexType;
use crate::data::LogRecordPos;
use crate::error::{CaskError, Result};

pub use btree::{BTreeIndex, BTreeIterator};

/// Abstract keydir
pub trait Indexer: Send + Sync {
    /// Insert or overwrite `key`, returning whether the index accepted it
    fn put(&self, key: Vec<u8>, pos: LogRecordPos) -> bool;

    /// Position of the latest record for `key`
    fn get(&self, key: &[u8]) -> Option<LogRecordPos>;

    /// Remove `key`, returning whether it was present
    fn delete(&self, key: &[u8]) -> bool;

    /// Number of live keys
    fn size(&self) -> usize;

    /// Snapshot iterator in ascending (or descending) key order
    fn iterator(&self, reverse: bool) -> Box<dyn IndexIterator>;
}

/// Cursor over an index snapshot
pub trait IndexIterator: Send + Sync {
    /// Move back to the first entry
    fn rewind(&mut self);

    /// Move to the first key >= `key` (ascending) or <= `key` (descending)
    fn seek(&mut self, key: &[u8]);

    /// Advance one entry
    fn next(&mut self);

    /// Whether the cursor points at an entry
    fn valid(&self) -> bool;

    /// Key at the cursor; only call when `valid()`
    fn key(&self) -> &[u8];

    /// Position at the cursor; only call when `valid()`
    fn value(&self) -> LogRecordPos;

    /// Drop the snapshot
    fn close(&mut self);
}

/// Build the index selected by configuration
pub fn new_indexer(index_type: IndexType) -> Result<Box<dyn Indexer>> {
    match index_type {
        IndexType::BTree => Ok(Box::new(BTreeIndex::new())),
        IndexType::Art => Err(CaskError::NotImplemented(
            "adaptive radix trie index".to_string(),
        )),
    }
}
