//! Log record codec
//!
//! Encoding, header decoding and CRC checks for a single record.

use bytes::{BufMut, Bytes, BytesMut};

use super::varint::{decode_varint, encode_varint, varint_len, MAX_VARINT_LEN32};

/// Size of the stored CRC field
pub const CRC_SIZE: usize = 4;

/// CRC (4) + type (1) + keySize (≤5) + valueSize (≤5) = 15 bytes
pub const MAX_HEADER_SIZE: usize = CRC_SIZE + 1 + MAX_VARINT_LEN32 * 2;

/// Smallest possible header: CRC (4) + type (1), varints still to come
pub const MIN_HEADER_SIZE: usize = CRC_SIZE + 1;

/// Kind of record stored in the log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LogRecordType {
    /// A live key/value pair
    Normal = 0,

    /// A deletion marker
    Tombstone = 1,
}

impl TryFrom<u8> for LogRecordType {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(LogRecordType::Normal),
            1 => Ok(LogRecordType::Tombstone),
            other => Err(other),
        }
    }
}

/// A single entry in a segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
    pub rec_type: LogRecordType,
}

/// Decoded record header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogRecordHeader {
    pub crc: u32,
    /// Raw type byte; validated by the segment reader
    pub rec_type: u8,
    pub key_size: u32,
    pub value_size: u32,
}

/// Where a record lives on disk; the index's value type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LogRecordPos {
    pub segment_id: u32,
    pub offset: u64,
}

impl LogRecord {
    /// Build a live key/value record
    pub fn normal(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            rec_type: LogRecordType::Normal,
        }
    }

    /// Build a deletion marker for `key`
    pub fn tombstone(key: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: Vec::new(),
            rec_type: LogRecordType::Tombstone,
        }
    }

    /// Encode into the on-disk layout, returning the bytes and their length
    ///
    /// ```text
    /// ┌─────────┬──────────┬──────────────┬────────────────┬───────┬─────────┐
    /// │ CRC (4) │ Type (1) │ KeySize (v)  │ ValueSize (v)  │  Key  │  Value  │
    /// └─────────┴──────────┴──────────────┴────────────────┴───────┴─────────┘
    /// ```
    ///
    /// The CRC is little-endian and covers everything after itself.
    pub fn encode(&self) -> (Bytes, u64) {
        let key_size = self.key.len() as u32;
        let value_size = self.value.len() as u32;
        let header_size = MIN_HEADER_SIZE + varint_len(key_size) + varint_len(value_size);
        let total = header_size + self.key.len() + self.value.len();

        let mut buf = BytesMut::with_capacity(total);
        buf.put_u32_le(0); // CRC placeholder
        buf.put_u8(self.rec_type as u8);
        encode_varint(key_size, &mut buf);
        encode_varint(value_size, &mut buf);
        buf.put_slice(&self.key);
        buf.put_slice(&self.value);

        let crc = crc32fast::hash(&buf[CRC_SIZE..]);
        buf[..CRC_SIZE].copy_from_slice(&crc.to_le_bytes());

        (buf.freeze(), total as u64)
    }
}

/// Decode a header from the front of `buf`
///
/// `buf` may be longer than the header; the second value is the number of
/// bytes the header actually occupies. Returns `None` when fewer than
/// `MIN_HEADER_SIZE` bytes are available or a size varint is malformed.
pub fn decode_header(buf: &[u8]) -> Option<(LogRecordHeader, usize)> {
    if buf.len() < MIN_HEADER_SIZE {
        return None;
    }

    let crc = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
    let rec_type = buf[4];

    let mut index = MIN_HEADER_SIZE;
    let (key_size, n) = decode_varint(&buf[index..])?;
    index += n;
    let (value_size, n) = decode_varint(&buf[index..])?;
    index += n;

    Some((
        LogRecordHeader {
            crc,
            rec_type,
            key_size,
            value_size,
        },
        index,
    ))
}

/// CRC over the header bytes after the CRC field, followed by key and value
pub fn record_crc(header_without_crc: &[u8], key: &[u8], value: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(header_without_crc);
    hasher.update(key);
    hasher.update(value);
    hasher.finalize()
}
