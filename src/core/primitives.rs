//! # Primitive Field Codec
//!
//! The atomic wire types every packet is built from:
//!
//! ```text
//! byte     [u8]
//! u16      [MSB][LSB]
//! string   [len MSB][len LSB][len bytes of UTF-8]
//! binary   [len MSB][len LSB][len raw bytes]
//! payload  [raw bytes], length known from context only
//! ```
//!
//! Reads go through [`ByteCursor`], which bounds-checks every access and never
//! reads past the end of its slice. Values read out of a cursor are copied, so a
//! decoded packet never borrows the input buffer.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{DecodeError, EncodeError};

/// Longest string or binary field a u16 length prefix can describe.
pub const MAX_STRING_LEN: usize = u16::MAX as usize;

/// Bounds-checked read position over a borrowed byte slice.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes consumed so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Borrow the next `len` bytes and advance past them.
    pub fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < len {
            return Err(DecodeError::Truncated {
                needed: len,
                available: self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }
}

#[inline]
pub fn write_byte(out: &mut BytesMut, value: u8) {
    out.put_u8(value);
}

#[inline]
pub fn read_byte(cursor: &mut ByteCursor<'_>) -> Result<u8, DecodeError> {
    Ok(cursor.take(1)?[0])
}

#[inline]
pub fn write_u16(out: &mut BytesMut, value: u16) {
    out.put_u16(value);
}

#[inline]
pub fn read_u16(cursor: &mut ByteCursor<'_>) -> Result<u16, DecodeError> {
    let bytes = cursor.take(2)?;
    Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
}

/// Write a length-prefixed string. The prefix counts bytes, not characters.
pub fn write_string(out: &mut BytesMut, s: &str) -> Result<(), EncodeError> {
    write_binary(out, s.as_bytes())
}

pub fn read_string(cursor: &mut ByteCursor<'_>) -> Result<String, DecodeError> {
    let len = read_u16(cursor)? as usize;
    let bytes = cursor.take(len)?;
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|_| DecodeError::InvalidUtf8)
}

/// Write length-prefixed binary data (will message, password).
pub fn write_binary(out: &mut BytesMut, data: &[u8]) -> Result<(), EncodeError> {
    if data.len() > MAX_STRING_LEN {
        return Err(EncodeError::StringTooLong(data.len()));
    }
    out.reserve(2 + data.len());
    out.put_u16(data.len() as u16);
    out.put_slice(data);
    Ok(())
}

pub fn read_binary(cursor: &mut ByteCursor<'_>) -> Result<Bytes, DecodeError> {
    let len = read_u16(cursor)? as usize;
    Ok(Bytes::copy_from_slice(cursor.take(len)?))
}

/// Write raw bytes with no prefix.
#[inline]
pub fn write_bytes(out: &mut BytesMut, data: &[u8]) {
    out.put_slice(data);
}

/// Read exactly `len` raw bytes; `len` comes from the caller's context.
pub fn read_bytes(cursor: &mut ByteCursor<'_>, len: usize) -> Result<Bytes, DecodeError> {
    Ok(Bytes::copy_from_slice(cursor.take(len)?))
}
