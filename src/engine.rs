//! Engine Module
//!
//! The storage engine that ties the log, the segments and the keydir together.
//!
//! ## Responsibilities
//! - Append records to the active segment, rotating when it fills up
//! - Keep the keydir pointing at the latest record for every key
//! - Resolve keydir positions back to values
//! - Rebuild the keydir from the log on startup

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::data::{LogRecord, LogRecordPos, LogRecordType, Segment, SEGMENT_FILE_SUFFIX};
use crate::error::{CaskError, Result};
use crate::index::{new_indexer, Indexer};
use crate::iterator::{DbIterator, IteratorOptions};

/// Active segment plus every sealed one, keyed by id
#[derive(Default)]
struct Segments {
    /// The only segment that accepts appends (highest id)
    active: Option<Segment>,
    /// Read-only segments
    sealed: HashMap<u32, Segment>,
}

impl Segments {
    /// Resolve a segment id to the active or a sealed segment
    fn get(&self, id: u32) -> Option<&Segment> {
        match &self.active {
            Some(active) if active.id() == id => Some(active),
            _ => self.sealed.get(&id),
        }
    }

    /// The active segment, creating segment 0 on first write
    fn active_or_create(&mut self, dir: &Path) -> Result<&mut Segment> {
        let active = match self.active.take() {
            Some(segment) => segment,
            None => Segment::open(dir, 0)?,
        };
        Ok(self.active.insert(active))
    }

    /// Seal the active segment and open its successor
    ///
    /// The new segment is opened before the old one is moved, so a failure
    /// leaves the current active segment in place.
    fn rotate(&mut self, dir: &Path) -> Result<()> {
        let Some(active) = self.active.as_mut() else {
            return Ok(());
        };

        active.sync()?;
        let next = Segment::open(dir, active.id() + 1)?;
        let sealed = std::mem::replace(active, next);

        debug!(
            sealed_id = sealed.id(),
            sealed_size = sealed.write_offset(),
            active_id = sealed.id() + 1,
            "rotated segment"
        );
        self.sealed.insert(sealed.id(), sealed);
        Ok(())
    }

    fn len(&self) -> usize {
        self.sealed.len() + usize::from(self.active.is_some())
    }
}

/// The main storage engine
///
/// ## Concurrency Model
///
/// - **Writes** (put/delete): take `segments` exclusively for the whole
///   append protocol (rotation + write) and the keydir update that follows.
/// - **Reads** (get, iterator values): take `segments` shared, so any number
///   of readers run together but never alongside an append.
/// - The keydir carries its own RwLock, so it is safe on its own as well.
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Segment files; write lock = append lock, read lock = read-path lock
    segments: RwLock<Segments>,

    /// In-memory keydir (internal RwLock)
    index: Box<dyn Indexer>,
}

impl Engine {
    /// Open or create an engine with the given config
    ///
    /// On startup:
    /// 1. Validate config and create the data directory
    /// 2. Discover segment files and open them (highest id = active)
    /// 3. Replay every segment into the keydir
    /// 4. Ready to serve requests
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;
        fs::create_dir_all(&config.dir_path)?;

        let index = new_indexer(config.index_type)?;

        let segment_ids = Self::load_segment_ids(&config.dir_path)?;
        let mut segments = Segments::default();
        for (i, &id) in segment_ids.iter().enumerate() {
            let segment = Segment::open(&config.dir_path, id)?;
            if i == segment_ids.len() - 1 {
                segments.active = Some(segment);
            } else {
                segments.sealed.insert(id, segment);
            }
        }

        let records = Self::load_index(&mut segments, &segment_ids, index.as_ref())?;

        info!(
            dir = %config.dir_path.display(),
            segments = segment_ids.len(),
            records,
            keys = index.size(),
            "engine opened"
        );

        Ok(Self {
            config,
            segments: RwLock::new(segments),
            index,
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().dir_path(path).build();
        Self::open(config)
    }

    /// Put a key-value pair
    ///
    /// Steps:
    /// 1. Acquire the append lock
    /// 2. Append a normal record (rotating if needed)
    /// 3. Point the keydir at the new record
    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        if key.is_empty() {
            return Err(CaskError::KeyEmpty);
        }

        let record = LogRecord::normal(key, value);

        let mut segments = self.segments.write();
        let pos = self.append_log_record(&mut segments, &record)?;

        if !self.index.put(record.key, pos) {
            return Err(CaskError::IndexUpdateFailed);
        }
        Ok(())
    }

    /// Get the value for a key
    ///
    /// Returns:
    /// - `Ok(value)`: key is live
    /// - `Err(KeyNotFound)`: key is not in the keydir
    /// - `Err(DataDeleted)`: keydir points at a tombstone
    pub fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        if key.is_empty() {
            return Err(CaskError::KeyEmpty);
        }

        let segments = self.segments.read();
        let pos = self.index.get(key).ok_or(CaskError::KeyNotFound)?;
        Self::read_value(&segments, pos)
    }

    /// Delete a key
    ///
    /// Deleting a key that is not present is a no-op.
    pub fn delete(&self, key: &[u8]) -> Result<()> {
        if key.is_empty() {
            return Err(CaskError::KeyEmpty);
        }

        let mut segments = self.segments.write();
        if self.index.get(key).is_none() {
            return Ok(());
        }

        let record = LogRecord::tombstone(key);
        self.append_log_record(&mut segments, &record)?;

        if !self.index.delete(key) {
            return Err(CaskError::IndexUpdateFailed);
        }
        Ok(())
    }

    /// Create a range iterator over a snapshot of the keydir
    pub fn iter(&self, options: IteratorOptions) -> DbIterator<'_> {
        let index_iter = self.index.iterator(options.reverse);
        DbIterator::new(self, index_iter, options)
    }

    /// All live keys in ascending order
    pub fn list_keys(&self) -> Vec<Vec<u8>> {
        let mut iter = self.index.iterator(false);
        let mut keys = Vec::with_capacity(self.index.size());
        while iter.valid() {
            keys.push(iter.key().to_vec());
            iter.next();
        }
        iter.close();
        keys
    }

    /// Force the active segment to disk
    pub fn sync(&self) -> Result<()> {
        let segments = self.segments.write();
        if let Some(active) = &segments.active {
            active.sync()?;
        }
        Ok(())
    }

    /// Close the engine gracefully
    ///
    /// Syncs the active segment and closes every segment handle.
    pub fn close(self) -> Result<()> {
        let segments = self.segments.into_inner();

        if let Some(active) = &segments.active {
            active.sync()?;
            active.close()?;
        }
        for segment in segments.sealed.values() {
            segment.close()?;
        }

        info!(dir = %self.config.dir_path.display(), "engine closed");
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the data directory path
    pub fn dir_path(&self) -> &Path {
        &self.config.dir_path
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of live keys in the keydir
    pub fn key_count(&self) -> usize {
        self.index.size()
    }

    /// Number of segment files (active + sealed)
    pub fn segment_count(&self) -> usize {
        self.segments.read().len()
    }

    /// Id of the segment currently receiving appends
    pub fn active_segment_id(&self) -> Option<u32> {
        self.segments.read().active.as_ref().map(Segment::id)
    }

    // =========================================================================
    // Crate-internal Read Path
    // =========================================================================

    /// Resolve a keydir position to its value under the shared lock
    pub(crate) fn value_at(&self, pos: LogRecordPos) -> Result<Vec<u8>> {
        let segments = self.segments.read();
        Self::read_value(&segments, pos)
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Append protocol, called with the append lock held
    ///
    /// Rotation finishes (old segment synced and sealed, new one open)
    /// before the record is written.
    fn append_log_record(
        &self,
        segments: &mut Segments,
        record: &LogRecord,
    ) -> Result<LogRecordPos> {
        let dir = &self.config.dir_path;
        let (encoded, size) = record.encode();

        let active = segments.active_or_create(dir)?;
        // An oversized record still goes into an empty segment
        if active.write_offset() > 0
            && active.write_offset() + size > self.config.max_segment_size
        {
            segments.rotate(dir)?;
        }

        let active = segments.active_or_create(dir)?;
        let offset = active.write_offset();
        active.write(&encoded)?;

        if self.config.sync_on_write {
            active.sync()?;
        }

        Ok(LogRecordPos {
            segment_id: active.id(),
            offset,
        })
    }

    /// Read the record at `pos` and return its value
    fn read_value(segments: &Segments, pos: LogRecordPos) -> Result<Vec<u8>> {
        let segment = segments
            .get(pos.segment_id)
            .ok_or(CaskError::DataFileNotFound(pos.segment_id))?;

        let (record, _) = segment.read(pos.offset)?.ok_or_else(|| {
            CaskError::Corruption(format!(
                "keydir points past end of segment {} (offset {})",
                pos.segment_id, pos.offset
            ))
        })?;

        match record.rec_type {
            // Unreachable through the keydir, which never keeps tombstone positions
            LogRecordType::Tombstone => Err(CaskError::DataDeleted),
            LogRecordType::Normal => Ok(record.value),
        }
    }

    /// Collect segment ids from the data directory, sorted ascending
    /// "000000042.data" → 42
    fn load_segment_ids(dir: &Path) -> Result<Vec<u32>> {
        let mut ids = Vec::new();

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let name = name.to_string_lossy();

            if let Some(stem) = name.strip_suffix(SEGMENT_FILE_SUFFIX) {
                // Only the exact zero-padded form maps back to the same file
                let id = stem
                    .parse::<u32>()
                    .ok()
                    .filter(|&id| Segment::path_for(dir, id) == entry.path())
                    .ok_or_else(|| {
                        CaskError::DataDirCorrupt(format!("invalid segment file name: {}", name))
                    })?;
                ids.push(id);
            }
        }

        ids.sort_unstable();
        Ok(ids)
    }

    /// Replay every segment in id order into the keydir
    ///
    /// Stops a segment at end-of-file; any other decode failure aborts.
    /// Leaves the active segment's write offset at the end of its data.
    fn load_index(segments: &mut Segments, ids: &[u32], index: &dyn Indexer) -> Result<u64> {
        let mut records = 0u64;

        for &id in ids {
            let segment = segments.get(id).ok_or(CaskError::DataFileNotFound(id))?;

            let mut offset = 0u64;
            loop {
                let decoded = segment.read(offset).map_err(|e| {
                    warn!(segment_id = id, offset, error = %e, "replay failed");
                    e
                })?;
                let Some((record, size)) = decoded else {
                    break;
                };

                match record.rec_type {
                    LogRecordType::Tombstone => {
                        index.delete(&record.key);
                    }
                    LogRecordType::Normal => {
                        let pos = LogRecordPos {
                            segment_id: id,
                            offset,
                        };
                        if !index.put(record.key, pos) {
                            return Err(CaskError::IndexUpdateFailed);
                        }
                    }
                }

                offset += size;
                records += 1;
            }

            if let Some(active) = segments.active.as_mut() {
                if active.id() == id {
                    active.set_write_offset(offset);
                }
            }
            debug!(segment_id = id, bytes = offset, "replayed segment");
        }

        Ok(records)
    }
}
