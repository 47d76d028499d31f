//! Range iterator
//!
//! Walks a keydir snapshot, skipping keys outside the configured prefix and
//! resolving values through the engine's read path.

use crate::data::LogRecordPos;
use crate::engine::Engine;
use crate::error::Result;
use crate::index::IndexIterator;

/// Options for `Engine::iter`
#[derive(Debug, Clone, Default)]
pub struct IteratorOptions {
    /// Only yield keys starting with this prefix (empty = all keys)
    pub prefix: Vec<u8>,

    /// Descending key order
    pub reverse: bool,
}

impl IteratorOptions {
    pub fn with_prefix(prefix: impl Into<Vec<u8>>) -> Self {
        Self {
            prefix: prefix.into(),
            reverse: false,
        }
    }

    pub fn reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }
}

/// Cursor over the engine's keys
///
/// The key set is fixed when the iterator is created; values are read from
/// disk on demand, so a value may reflect the record the snapshot pointed at
/// even if the key was overwritten since.
pub struct DbIterator<'a> {
    index_iter: Box<dyn IndexIterator>,
    engine: &'a Engine,
    options: IteratorOptions,
}

impl<'a> DbIterator<'a> {
    pub(crate) fn new(
        engine: &'a Engine,
        index_iter: Box<dyn IndexIterator>,
        options: IteratorOptions,
    ) -> Self {
        let mut iter = Self {
            index_iter,
            engine,
            options,
        };
        iter.skip_to_next();
        iter
    }

    /// Back to the first matching key
    pub fn rewind(&mut self) {
        self.index_iter.rewind();
        self.skip_to_next();
    }

    /// First matching key >= `key` (or <= `key` when reversed)
    pub fn seek(&mut self, key: &[u8]) {
        self.index_iter.seek(key);
        self.skip_to_next();
    }

    /// Advance to the next matching key
    pub fn next(&mut self) {
        self.index_iter.next();
        self.skip_to_next();
    }

    pub fn valid(&self) -> bool {
        self.index_iter.valid()
    }

    pub fn key(&self) -> &[u8] {
        self.index_iter.key()
    }

    /// Read the value for the current key
    ///
    /// Takes the engine's shared lock for this one read only.
    pub fn value(&self) -> Result<Vec<u8>> {
        let pos: LogRecordPos = self.index_iter.value();
        self.engine.value_at(pos)
    }

    /// Release the snapshot
    pub fn close(&mut self) {
        self.index_iter.close();
    }

    /// Skip entries whose key lacks the prefix
    fn skip_to_next(&mut self) {
        if self.options.prefix.is_empty() {
            return;
        }

        while self.index_iter.valid() && !self.index_iter.key().starts_with(&self.options.prefix)
        {
            self.index_iter.next();
        }
    }
}
