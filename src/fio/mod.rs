//! File I/O Module
//!
//! The raw storage handle that segments sit on top of.
//!
//! ## Responsibilities
//! - Positional reads (`read_at`) without disturbing the append cursor
//! - Append-only writes
//! - Durability (`sync`) and size queries
//!
//! Segments only talk to the `IoManager` trait, so the file backend can be
//! swapped (e.g. for mmap) without touching the record format.

mod file_io;

use std::path::Path;

use crate::error::Result;

pub use file_io::FileIo;

/// Contract for the handle backing one segment file
pub trait IoManager: Send + Sync {
    /// Read into `buf` starting at `offset`, returning the bytes read
    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize>;

    /// Append `buf` at the end of the file, returning the bytes written
    fn append(&self, buf: &[u8]) -> Result<usize>;

    /// Force written data to durable storage
    fn sync(&self) -> Result<()>;

    /// Flush and release the handle
    fn close(&self) -> Result<()>;

    /// Current file size in bytes
    fn size(&self) -> Result<u64>;
}

/// Open the default I/O backend for `path`
pub fn new_io_manager(path: &Path) -> Result<Box<dyn IoManager>> {
    Ok(Box::new(FileIo::open(path)?))
}
