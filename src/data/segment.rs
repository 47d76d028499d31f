//! Segment file
//!
//! One append-only data file. Owns its write offset and decodes records
//! at arbitrary offsets through the codec.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{CaskError, Result};
use crate::fio::{new_io_manager, IoManager};

use super::log_record::{
    decode_header, record_crc, LogRecord, LogRecordType, CRC_SIZE, MAX_HEADER_SIZE,
};

/// Suffix shared by every segment file
pub const SEGMENT_FILE_SUFFIX: &str = ".data";

/// One append-only file holding a contiguous run of encoded records
pub struct Segment {
    /// Segment id, assigned at creation and never reused
    id: u32,
    /// Bytes appended so far; the next record lands here
    write_offset: u64,
    /// Raw storage handle
    io: Box<dyn IoManager>,
}

impl Segment {
    /// Open (or create) segment `id` inside `dir`
    ///
    /// The write offset starts at 0; recovery moves it to the end of the
    /// replayed data for the active segment.
    pub fn open(dir: &Path, id: u32) -> Result<Self> {
        let path = Self::path_for(dir, id);
        let io = new_io_manager(&path)?;
        debug!(segment_id = id, path = %path.display(), "opened segment");

        Ok(Self::with_io(id, io))
    }

    /// Wrap an already open storage handle
    pub(crate) fn with_io(id: u32, io: Box<dyn IoManager>) -> Self {
        Self {
            id,
            write_offset: 0,
            io,
        }
    }

    /// Generate the file path for a segment
    /// (dir, 42) → "{dir}/000000042.data"
    pub fn path_for(dir: &Path, id: u32) -> PathBuf {
        dir.join(format!("{:09}{}", id, SEGMENT_FILE_SUFFIX))
    }

    /// Read the record starting at `offset`
    ///
    /// Returns:
    /// - `Ok(Some((record, size)))`: decoded record and its encoded length
    /// - `Ok(None)`: `offset` is at or past the end of the file
    /// - `Err(Corruption)`: bytes are present but do not form a valid record
    pub fn read(&self, offset: u64) -> Result<Option<(LogRecord, u64)>> {
        let file_size = self.io.size()?;
        if offset >= file_size {
            return Ok(None);
        }

        // Clip the header read near end-of-file
        let header_len = (MAX_HEADER_SIZE as u64).min(file_size - offset) as usize;
        let mut header_buf = vec![0u8; header_len];
        self.read_exact_at(&mut header_buf, offset)?;

        let (header, header_size) = decode_header(&header_buf).ok_or_else(|| {
            CaskError::Corruption(format!(
                "truncated header at offset {} in segment {}",
                offset, self.id
            ))
        })?;

        let rec_type = LogRecordType::try_from(header.rec_type).map_err(|t| {
            CaskError::Corruption(format!(
                "unknown record type {} at offset {} in segment {}",
                t, offset, self.id
            ))
        })?;

        let key_size = header.key_size as usize;
        let value_size = header.value_size as usize;
        let total = header_size as u64 + key_size as u64 + value_size as u64;
        if offset + total > file_size {
            return Err(CaskError::Corruption(format!(
                "truncated record at offset {} in segment {}: needs {} bytes, {} remain",
                offset,
                self.id,
                total,
                file_size - offset
            )));
        }

        let mut kv_buf = vec![0u8; key_size + value_size];
        if !kv_buf.is_empty() {
            self.read_exact_at(&mut kv_buf, offset + header_size as u64)?;
        }
        let value = kv_buf.split_off(key_size);
        let key = kv_buf;

        let crc = record_crc(&header_buf[CRC_SIZE..header_size], &key, &value);
        if crc != header.crc {
            return Err(CaskError::Corruption(format!(
                "CRC mismatch at offset {} in segment {}: stored {:#010x}, computed {:#010x}",
                offset, self.id, header.crc, crc
            )));
        }

        Ok(Some((
            LogRecord {
                key,
                value,
                rec_type,
            },
            total,
        )))
    }

    /// Append encoded bytes at the end of the segment
    ///
    /// A failed append may still leave part of `buf` in the file. The write
    /// offset is then re-read from the file size, so the next record's
    /// position matches where the handle actually appends it.
    pub fn write(&mut self, buf: &[u8]) -> Result<usize> {
        match self.io.append(buf) {
            Ok(written) => {
                self.write_offset += written as u64;
                Ok(written)
            }
            Err(e) => {
                if let Ok(size) = self.io.size() {
                    warn!(
                        segment_id = self.id,
                        stale_offset = self.write_offset,
                        file_size = size,
                        error = %e,
                        "append failed, resyncing write offset"
                    );
                    self.write_offset = size;
                }
                Err(e)
            }
        }
    }

    /// Force durability of everything written so far
    pub fn sync(&self) -> Result<()> {
        self.io.sync()
    }

    /// Release the underlying handle
    pub fn close(&self) -> Result<()> {
        self.io.close()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn write_offset(&self) -> u64 {
        self.write_offset
    }

    /// Used by recovery to resume appends after the replayed data
    pub fn set_write_offset(&mut self, offset: u64) {
        self.write_offset = offset;
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Fill `buf` from `offset`; a short read means the file shrank under us
    fn read_exact_at(&self, buf: &mut [u8], offset: u64) -> Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.io.read_at(&mut buf[filled..], offset + filled as u64)?;
            if n == 0 {
                return Err(CaskError::Corruption(format!(
                    "unexpected end of segment {} at offset {}",
                    self.id,
                    offset + filled as u64
                )));
            }
            filled += n;
        }
        Ok(())
    }
}
