//! # mqtt-wire
//!
//! Wire-format codec for MQTT 3.1 / 3.1.1 control packets.
//!
//! Turns typed [`Packet`] values into the exact bytes a client or broker puts on
//! the network, and turns bytes from an untrusted peer back into packets. The
//! codec is stateless: every call is independent, never blocks, and keeps no
//! reference to its input.
//!
//! ## Transport contract
//! - [`peek_remaining_length`] tells a transport how large the next packet is
//!   as soon as its fixed header has arrived.
//! - [`decode_packet`] decodes one complete packet and reports how many bytes
//!   it used.
//! - [`encode_packet`] produces the bytes for one packet.
//! - [`MqttCodec`] bundles all three for `tokio_util::codec::Framed`.
//!
//! ```rust
//! use mqtt_wire::{decode_packet, encode_packet, Packet, Publish, QoS};
//!
//! let publish = Publish::with_qos("a/b", QoS::AtLeastOnce, 42, vec![1u8, 2, 3]);
//! let bytes = encode_packet(&Packet::Publish(publish.clone())).unwrap();
//! let (decoded, consumed) = decode_packet(&bytes).unwrap();
//! assert_eq!(decoded, Packet::Publish(publish));
//! assert_eq!(consumed, bytes.len());
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod utils;

pub use crate::core::codec::MqttCodec;
pub use crate::core::decoder::{decode_packet, packet_len};
pub use crate::core::encoder::{encode_packet, encode_packet_into};
pub use crate::core::header::{ConnectFlags, Header, PacketType, QoS};
pub use crate::core::packet::{
    Ack, Connack, ConnackCode, Connect, Packet, Publish, Suback, SubackCode, Subscribe,
    SubscribeFilter, Unsubscribe, Will,
};
pub use crate::core::varint::{peek_remaining_length, MAX_REMAINING_LENGTH};
pub use crate::error::{DecodeError, EncodeError, ProtocolError, Result};
