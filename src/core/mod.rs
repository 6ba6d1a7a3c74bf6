//! # Core Codec Components
//!
//! The MQTT wire format, leaves first.
//!
//! ## Components
//! - **Primitives**: bytes, big-endian u16, length-prefixed strings, raw payloads
//! - **Varint**: the 1-4 byte remaining length
//! - **Header**: fixed header byte and CONNECT flags byte
//! - **Packet**: the typed packet model
//! - **Encoder / Decoder**: whole packets to and from bytes
//! - **Codec**: `tokio_util` framing over byte streams
//!
//! ## Wire Format
//! ```text
//! [type|dup|qos|retain (1)] [Remaining Length (1-4)] [Variable Header] [Payload]
//! ```
//!
//! ## Security
//! - Every read is bounds-checked; hostile input yields an error, never a panic
//! - Decoded packets copy their data out of the input buffer
//! - Frame size is checked against a limit before the body is buffered

pub mod codec;
pub mod decoder;
pub mod encoder;
pub mod header;
pub mod packet;
pub mod primitives;
pub mod varint;
