//! # CaskDB
//!
//! An embedded, single-node key-value store built on an append-only log:
//! - Binary log records with CRC32 checks
//! - Append-only segment files with size-based rotation
//! - In-memory ordered keydir rebuilt by replay on startup
//! - Prefix/reverse range iteration
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Engine                               │
//! │          (append lock / shared read lock)                    │
//! └──────────┬───────────────────────────────────┬──────────────┘
//!            │                                   │
//!            ▼                                   ▼
//!   ┌─────────────────┐                 ┌─────────────────┐
//!   │    Segments     │                 │     Keydir      │
//!   │ active + sealed │                 │ (BTree, RwLock) │
//!   └────────┬────────┘                 └────────┬────────┘
//!            │                                   │
//!            ▼                                   ▼
//!   ┌─────────────────┐                 ┌─────────────────┐
//!   │  Record Codec   │                 │  Range Iterator │
//!   │   (CRC, varint) │                 │ (prefix filter) │
//!   └────────┬────────┘                 └─────────────────┘
//!            │
//!            ▼
//!   ┌─────────────────┐
//!   │    File I/O     │
//!   └─────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod fio;
pub mod data;
pub mod index;
pub mod engine;
pub mod iterator;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{CaskError, Result};
pub use config::{Config, IndexType};
pub use engine::Engine;
pub use iterator::{DbIterator, IteratorOptions};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of CaskDB
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
