//! # Error Types
//!
//! Error handling for the MQTT wire codec.
//!
//! Decoding and encoding have separate error enums because callers react to
//! them differently:
//! - **[`DecodeError`]**: input from the network. [`DecodeError::Truncated`] means
//!   "wait for more bytes"; every other kind is permanent for that buffer and the
//!   connection should be closed.
//! - **[`EncodeError`]**: a packet value the caller built cannot be put on the wire.
//!   Reject the outgoing packet, nothing else is affected.
//!
//! [`ProtocolError`] wraps both (plus I/O and configuration failures) for the
//! framing codec and configuration loading.
//!
//! ## Example Usage
//! ```rust
//! use mqtt_wire::error::DecodeError;
//! use mqtt_wire::decode_packet;
//!
//! match decode_packet(&[0x30]) {
//!     Err(e) if e.is_incomplete() => { /* read more from the socket */ }
//!     Err(e) => panic!("fatal: {e}"),
//!     Ok(_) => unreachable!(),
//! }
//! ```

use std::io;
use thiserror::Error;

use crate::core::header::PacketType;

/// Error message constants for the structural checks shared by several parsers.
pub mod constants {
    pub const ERR_RESERVED_FLAG: &str = "Reserved connect flag bit is set";
    pub const ERR_WILL_QOS: &str = "Will QoS must be 0, 1 or 2";
    pub const ERR_WILL_FLAGS: &str = "Will QoS/retain set without will flag";
    pub const ERR_HEADER_QOS: &str = "Header QoS must be 0, 1 or 2";
    pub const ERR_CONNACK_FLAGS: &str = "Reserved CONNACK acknowledge bits are set";
}

/// Failure to turn a byte buffer into a [`Packet`](crate::Packet).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The buffer ends before a required field completes.
    #[error("Truncated input: needed {needed} bytes, {available} available")]
    Truncated { needed: usize, available: usize },

    /// The remaining length did not terminate within four bytes.
    #[error("Malformed remaining length (more than 4 bytes)")]
    MalformedLength,

    #[error("Malformed header: {0}")]
    MalformedHeader(&'static str),

    #[error("Unknown packet type: {0}")]
    UnknownPacketType(u8),

    /// The variant parser did not consume exactly the declared remaining length.
    #[error("Length mismatch: declared {declared} bytes, parser needed {consumed}")]
    LengthMismatch { declared: usize, consumed: usize },

    #[error("String field is not valid UTF-8")]
    InvalidUtf8,

    #[error("Invalid QoS value: {0}")]
    InvalidQoS(u8),

    #[error("Invalid return code: {0:#04x}")]
    InvalidReturnCode(u8),

    #[error("Packet carries no topic filters")]
    NoTopicFilters,

    #[error("Packet too large: {size} bytes (max {max})")]
    PacketTooLarge { size: usize, max: usize },
}

impl DecodeError {
    /// True when the caller should retry once more bytes have arrived.
    pub fn is_incomplete(&self) -> bool {
        matches!(self, DecodeError::Truncated { .. })
    }
}

/// Failure to turn a [`Packet`](crate::Packet) into bytes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("String too long: {0} bytes (max 65535)")]
    StringTooLong(usize),

    /// The body exceeds what the 4-byte remaining length can express.
    #[error("Remaining length overflow: {0} bytes (max 268435455)")]
    LengthOverflow(usize),

    #[error("Header type {found:?} does not match packet variant {expected:?}")]
    HeaderMismatch {
        expected: PacketType,
        found: PacketType,
    },

    #[error("PUBLISH message id must be present iff QoS > 0")]
    MessageIdMismatch,

    #[error("Packet carries no topic filters")]
    NoTopicFilters,
}

/// Crate-level error used by the framing codec and configuration loading.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Type alias for Results using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;
