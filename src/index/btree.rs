//! BTree index implementation
//!
//! BTreeMap-based keydir with RwLock for concurrency.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::data::LogRecordPos;

use super::{IndexIterator, Indexer};

/// Ordered keydir backed by a BTreeMap
///
/// ## Concurrency:
/// - `get`/`size`/`iterator` take the read lock (many concurrent readers)
/// - `put`/`delete` take the write lock
#[derive(Default)]
pub struct BTreeIndex {
    tree: RwLock<BTreeMap<Vec<u8>, LogRecordPos>>,
}

impl BTreeIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Indexer for BTreeIndex {
    fn put(&self, key: Vec<u8>, pos: LogRecordPos) -> bool {
        self.tree.write().insert(key, pos);
        true
    }

    fn get(&self, key: &[u8]) -> Option<LogRecordPos> {
        self.tree.read().get(key).copied()
    }

    fn delete(&self, key: &[u8]) -> bool {
        self.tree.write().remove(key).is_some()
    }

    fn size(&self) -> usize {
        self.tree.read().len()
    }

    fn iterator(&self, reverse: bool) -> Box<dyn IndexIterator> {
        let tree = self.tree.read();
        Box::new(BTreeIterator::new(&tree, reverse))
    }
}

/// Snapshot of the tree, copied out in iteration order
///
/// Later writes to the index are not observed.
pub struct BTreeIterator {
    /// Current cursor position
    current: usize,
    /// Descending order when true
    reverse: bool,
    /// (key, pos) pairs in iteration order
    items: Vec<(Vec<u8>, LogRecordPos)>,
}

impl BTreeIterator {
    fn new(tree: &BTreeMap<Vec<u8>, LogRecordPos>, reverse: bool) -> Self {
        let snapshot = tree.iter().map(|(k, pos)| (k.clone(), *pos));
        let items = if reverse {
            snapshot.rev().collect()
        } else {
            snapshot.collect()
        };

        Self {
            current: 0,
            reverse,
            items,
        }
    }
}

impl IndexIterator for BTreeIterator {
    fn rewind(&mut self) {
        self.current = 0;
    }

    fn seek(&mut self, key: &[u8]) {
        // items are sorted in iteration order, so the predicate is monotonic
        self.current = if self.reverse {
            self.items.partition_point(|(k, _)| k.as_slice() > key)
        } else {
            self.items.partition_point(|(k, _)| k.as_slice() < key)
        };
    }

    fn next(&mut self) {
        self.current += 1;
    }

    fn valid(&self) -> bool {
        self.current < self.items.len()
    }

    fn key(&self) -> &[u8] {
        &self.items[self.current].0
    }

    fn value(&self) -> LogRecordPos {
        self.items[self.current].1
    }

    fn close(&mut self) {
        self.items = Vec::new();
        self.current = 0;
    }
}
