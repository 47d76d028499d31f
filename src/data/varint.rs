//! Unsigned LEB128-style varints for record header sizes.

use bytes::BufMut;

/// Worst-case encoded length of a u32
pub const MAX_VARINT_LEN32: usize = 5;

/// Number of bytes `value` occupies once encoded
pub fn varint_len(mut value: u32) -> usize {
    let mut len = 1;
    while value >= 0x80 {
        len += 1;
        value >>= 7;
    }
    len
}

/// Append `value` as 7-bit groups, low group first, high bit = continuation
pub fn encode_varint(mut value: u32, buf: &mut impl BufMut) -> usize {
    let mut written = 1;
    while value >= 0x80 {
        buf.put_u8((value as u8 & 0x7F) | 0x80);
        value >>= 7;
        written += 1;
    }
    buf.put_u8(value as u8);
    written
}

/// Decode a varint from the front of `bytes`
///
/// Returns the value and the number of bytes consumed, or `None` if the
/// varint is unterminated or does not fit in 32 bits.
pub fn decode_varint(bytes: &[u8]) -> Option<(u32, usize)> {
    let mut value = 0u32;

    for (i, &byte) in bytes.iter().take(MAX_VARINT_LEN32).enumerate() {
        // The fifth group only has room for the top 4 bits
        if i == MAX_VARINT_LEN32 - 1 && byte > 0x0F {
            return None;
        }
        value |= ((byte & 0x7F) as u32) << (7 * i);
        if byte & 0x80 == 0 {
            return Some((value, i + 1));
        }
    }

    None
}
