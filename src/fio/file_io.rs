//! Standard file I/O
//!
//! `std::fs::File` opened in append mode, guarded by a RwLock.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use parking_lot::RwLock;

use crate::error::Result;

use super::IoManager;

/// File-backed storage handle
///
/// ## Concurrency:
/// - `read_at` takes the read lock (positional reads never move the cursor)
/// - `append`/`sync` take the write lock
pub struct FileIo {
    fd: RwLock<File>,
}

impl FileIo {
    /// Open (or create) a file for positional reads and appends
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;

        Ok(Self {
            fd: RwLock::new(file),
        })
    }
}

impl IoManager for FileIo {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize> {
        let file = self.fd.read();
        Ok(read_at_impl(&file, buf, offset)?)
    }

    fn append(&self, buf: &[u8]) -> Result<usize> {
        let mut file = self.fd.write();
        file.write_all(buf)?;
        Ok(buf.len())
    }

    fn sync(&self) -> Result<()> {
        self.fd.read().sync_all()?;
        Ok(())
    }

    fn close(&self) -> Result<()> {
        // The descriptor itself is released on drop
        let mut file = self.fd.write();
        file.flush()?;
        file.sync_all()?;
        Ok(())
    }

    fn size(&self) -> Result<u64> {
        Ok(self.fd.read().metadata()?.len())
    }
}

#[cfg(unix)]
fn read_at_impl(file: &File, buf: &mut [u8], offset: u64) -> std::io::Result<usize> {
    use std::os::unix::fs::FileExt;
    file.read_at(buf, offset)
}

#[cfg(windows)]
fn read_at_impl(file: &File, buf: &mut [u8], offset: u64) -> std::io::Result<usize> {
    use std::os::windows::fs::FileExt;
    file.seek_read(buf, offset)
}
