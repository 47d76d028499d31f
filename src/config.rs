//! Configuration for CaskDB
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{CaskError, Result};

/// Main configuration for a CaskDB instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Directory holding the segment files.
    /// Internal structure:
    ///   {dir_path}/
    ///     ├── 000000000.data   (sealed)
    ///     ├── 000000001.data   (sealed)
    ///     └── 000000002.data   (active)
    pub dir_path: PathBuf,

    /// Max size of a segment before the engine rotates to a new one (in bytes)
    pub max_segment_size: u64,

    // -------------------------------------------------------------------------
    // Durability Configuration
    // -------------------------------------------------------------------------
    /// fsync the active segment after every append
    pub sync_on_write: bool,

    // -------------------------------------------------------------------------
    // Index Configuration
    // -------------------------------------------------------------------------
    /// Which in-memory index implementation backs the keydir
    pub index_type: IndexType,
}

/// In-memory index variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexType {
    /// Ordered balanced tree (BTreeMap)
    #[default]
    BTree,

    /// Adaptive radix trie (reserved, not implemented)
    Art,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dir_path: std::env::temp_dir().join("caskdb"),
            max_segment_size: 256 * 1024 * 1024, // 256 MB
            sync_on_write: false,
            index_type: IndexType::BTree,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the options an engine cannot run without
    pub fn validate(&self) -> Result<()> {
        if self.dir_path.as_os_str().is_empty() {
            return Err(CaskError::Config("dir_path is empty".to_string()));
        }
        if self.max_segment_size == 0 {
            return Err(CaskError::Config(
                "max_segment_size must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory
    pub fn dir_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.dir_path = path.into();
        self
    }

    /// Set the maximum segment size (in bytes)
    pub fn max_segment_size(mut self, size: u64) -> Self {
        self.config.max_segment_size = size;
        self
    }

    /// Sync after every append
    pub fn sync_on_write(mut self, sync: bool) -> Self {
        self.config.sync_on_write = sync;
        self
    }

    /// Set the index variant
    pub fn index_type(mut self, index_type: IndexType) -> Self {
        self.config.index_type = index_type;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
