//! Data Module
//!
//! The durable log: record format and segment files.
//!
//! ## Responsibilities
//! - Binary encoding/decoding of log records with CRC32 checks
//! - Variable-length size fields
//! - Append-only segment files with positional reads
//!
//! ## Record Format
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │ Record                                                    │
//! │ ┌─────────┬────────┬──────────┬───────────┬─────┬───────┐ │
//! │ │ CRC (4) │Type (1)│ KeyLen(v)│ ValLen(v) │ Key │ Value │ │
//! │ └─────────┴────────┴──────────┴───────────┴─────┴───────┘ │
//! └───────────────────────────────────────────────────────────┘
//! ```
//! CRC32 (IEEE, little-endian) covers Type through Value.
//! Type 0 = normal, 1 = tombstone. Lengths are unsigned varints (≤5 bytes).

pub mod log_record;
pub mod segment;
pub mod varint;

pub use log_record::{
    decode_header, LogRecord, LogRecordHeader, LogRecordPos, LogRecordType, MAX_HEADER_SIZE,
};
pub use segment::{Segment, SEGMENT_FILE_SUFFIX};
