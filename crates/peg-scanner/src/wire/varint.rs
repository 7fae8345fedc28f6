//! Variable-length integer decoding (LEB128), as used by protobuf keys,
//! lengths and integer fields.

use crate::error::DecodeError;

/// Maximum bytes a u64 varint can occupy.
pub const MAX_VARINT_U64_SIZE: usize = 10;

/// Decode a u64 varint from the start of `buf`.
///
/// Returns (value, bytes_consumed) or an error.
#[inline]
pub fn decode_u64(buf: &[u8]) -> Result<(u64, usize), DecodeError> {
    let mut result = 0u64;
    let mut shift = 0;
    let mut pos = 0;

    loop {
        if pos >= buf.len() {
            return Err(DecodeError::UnexpectedEof);
        }

        if pos >= MAX_VARINT_U64_SIZE {
            return Err(DecodeError::Overflow);
        }

        let byte = buf[pos];
        pos += 1;

        // the tenth byte only has room for bit 63
        if pos == MAX_VARINT_U64_SIZE && byte > 1 {
            return Err(DecodeError::Overflow);
        }

        result |= ((byte & 0x7F) as u64) << shift;

        if byte & 0x80 == 0 {
            return Ok((result, pos));
        }

        shift += 7;
    }
}
