//! # Remaining Length
//!
//! MQTT's variable byte integer: 7 bits of value per byte, least significant
//! group first, high bit set when another byte follows.
//!
//! | value range            | bytes |
//! |------------------------|-------|
//! | 0 - 127                | 1     |
//! | 128 - 16383            | 2     |
//! | 16384 - 2097151        | 3     |
//! | 2097152 - 268435455    | 4     |
//!
//! [`peek_remaining_length`] is what a transport calls to find out whether a
//! whole packet has arrived. It needs nothing but the buffer and has no side
//! effects.

use bytes::{BufMut, BytesMut};

use crate::core::primitives::{read_byte, ByteCursor};
use crate::error::{DecodeError, EncodeError};

/// Largest value the 4-byte encoding can carry.
pub const MAX_REMAINING_LENGTH: usize = 268_435_455;

/// Maximum number of bytes in a remaining-length field.
pub const MAX_LENGTH_BYTES: usize = 4;

/// Append `value` to `out`. Returns the number of bytes written.
pub fn write_remaining_length(out: &mut BytesMut, value: usize) -> Result<usize, EncodeError> {
    if value > MAX_REMAINING_LENGTH {
        return Err(EncodeError::LengthOverflow(value));
    }

    let mut value = value;
    let mut written = 0;
    loop {
        let mut byte = (value % 128) as u8;
        value /= 128;
        if value > 0 {
            byte |= 0x80;
        }
        out.put_u8(byte);
        written += 1;
        if value == 0 {
            break;
        }
    }
    Ok(written)
}

/// Read a remaining length at the cursor position.
pub fn read_remaining_length(cursor: &mut ByteCursor<'_>) -> Result<usize, DecodeError> {
    let mut multiplier = 1usize;
    let mut value = 0usize;

    for _ in 0..MAX_LENGTH_BYTES {
        let byte = read_byte(cursor)?;
        value += (byte & 0x7F) as usize * multiplier;
        if byte & 0x80 == 0 {
            return Ok(value);
        }
        multiplier *= 128;
    }

    // Fourth byte still had the continuation bit set
    Err(DecodeError::MalformedLength)
}

/// Number of bytes `value` occupies once encoded.
pub fn encoded_len(value: usize) -> usize {
    match value {
        0..=127 => 1,
        128..=16_383 => 2,
        16_384..=2_097_151 => 3,
        _ => 4,
    }
}

/// Inspect a buffer that starts at a fixed header.
///
/// Returns `(remaining_length, fixed_header_len)` where `fixed_header_len`
/// counts the header byte plus the length bytes, so a complete packet needs
/// `fixed_header_len + remaining_length` bytes. `DecodeError::Truncated` means
/// the fixed header itself has not fully arrived yet.
pub fn peek_remaining_length(buf: &[u8]) -> Result<(usize, usize), DecodeError> {
    let mut cursor = ByteCursor::new(buf);
    read_byte(&mut cursor)?;
    let length = read_remaining_length(&mut cursor)?;
    Ok((length, cursor.position()))
}
