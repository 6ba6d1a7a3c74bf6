//! # Packet Encoder
//!
//! Encoding is two-pass: the variable header and payload are serialized into a
//! scratch buffer first, because the width of the remaining-length field
//! depends on the body size. Only then are the fixed header byte, the remaining
//! length, and the body written to the output.
//!
//! ```text
//! [header byte][remaining length, 1-4 bytes][variable header][payload]
//! ```

use bytes::{Bytes, BytesMut};

use crate::core::header::QoS;
use crate::core::packet::{Connect, Connack, Packet, Publish, Suback, Subscribe, Unsubscribe};
use crate::core::primitives::{
    write_binary, write_byte, write_bytes, write_string, write_u16,
};
use crate::core::varint::{encoded_len, write_remaining_length, MAX_REMAINING_LENGTH};
use crate::error::EncodeError;

/// Encode a packet into a freshly allocated buffer.
pub fn encode_packet(packet: &Packet) -> Result<Bytes, EncodeError> {
    let mut out = BytesMut::new();
    encode_packet_into(packet, &mut out)?;
    Ok(out.freeze())
}

/// Append the encoded packet to `out` and return the number of bytes written.
///
/// On error nothing is appended.
pub fn encode_packet_into(packet: &Packet, out: &mut BytesMut) -> Result<usize, EncodeError> {
    let header = packet.header();
    let expected = packet.packet_type();
    if header.packet_type != expected {
        return Err(EncodeError::HeaderMismatch {
            expected,
            found: header.packet_type,
        });
    }

    let mut body = BytesMut::new();
    encode_body(packet, &mut body)?;

    if body.len() > MAX_REMAINING_LENGTH {
        return Err(EncodeError::LengthOverflow(body.len()));
    }

    let total = 1 + encoded_len(body.len()) + body.len();
    out.reserve(total);
    write_byte(out, header.to_byte());
    write_remaining_length(out, body.len())?;
    write_bytes(out, &body);
    Ok(total)
}

fn encode_body(packet: &Packet, body: &mut BytesMut) -> Result<(), EncodeError> {
    match packet {
        Packet::Connect(connect) => encode_connect(connect, body),
        Packet::Connack(connack) => {
            encode_connack(connack, body);
            Ok(())
        }
        Packet::Publish(publish) => encode_publish(publish, body),
        Packet::Puback(ack)
        | Packet::Pubrec(ack)
        | Packet::Pubrel(ack)
        | Packet::Pubcomp(ack)
        | Packet::Unsuback(ack) => {
            write_u16(body, ack.message_id);
            Ok(())
        }
        Packet::Subscribe(subscribe) => encode_subscribe(subscribe, body),
        Packet::Suback(suback) => {
            encode_suback(suback, body);
            Ok(())
        }
        Packet::Unsubscribe(unsubscribe) => encode_unsubscribe(unsubscribe, body),
        Packet::Pingreq(_) | Packet::Pingresp(_) | Packet::Disconnect(_) => Ok(()),
    }
}

fn encode_connect(connect: &Connect, body: &mut BytesMut) -> Result<(), EncodeError> {
    write_string(body, &connect.protocol_name)?;
    write_byte(body, connect.protocol_version);
    write_byte(body, connect.flags().to_byte());
    write_u16(body, connect.keep_alive);
    write_string(body, &connect.client_id)?;

    if let Some(will) = &connect.will {
        write_string(body, &will.topic)?;
        write_binary(body, &will.message)?;
    }
    if let Some(username) = &connect.username {
        write_string(body, username)?;
    }
    if let Some(password) = &connect.password {
        write_binary(body, password)?;
    }
    Ok(())
}

fn encode_connack(connack: &Connack, body: &mut BytesMut) {
    write_byte(body, connack.session_present as u8);
    write_byte(body, connack.code as u8);
}

fn encode_publish(publish: &Publish, body: &mut BytesMut) -> Result<(), EncodeError> {
    write_string(body, &publish.topic)?;
    match (publish.header.qos, publish.message_id) {
        (QoS::AtMostOnce, None) => {}
        (QoS::AtLeastOnce | QoS::ExactlyOnce, Some(id)) => write_u16(body, id),
        _ => return Err(EncodeError::MessageIdMismatch),
    }
    write_bytes(body, &publish.payload);
    Ok(())
}

fn encode_subscribe(subscribe: &Subscribe, body: &mut BytesMut) -> Result<(), EncodeError> {
    if subscribe.filters.is_empty() {
        return Err(EncodeError::NoTopicFilters);
    }
    write_u16(body, subscribe.message_id);
    for entry in &subscribe.filters {
        write_string(body, &entry.filter)?;
        write_byte(body, entry.qos as u8);
    }
    Ok(())
}

fn encode_suback(suback: &Suback, body: &mut BytesMut) {
    write_u16(body, suback.message_id);
    for code in &suback.return_codes {
        write_byte(body, code.to_byte());
    }
}

fn encode_unsubscribe(unsubscribe: &Unsubscribe, body: &mut BytesMut) -> Result<(), EncodeError> {
    if unsubscribe.filters.is_empty() {
        return Err(EncodeError::NoTopicFilters);
    }
    write_u16(body, unsubscribe.message_id);
    for filter in &unsubscribe.filters {
        write_string(body, filter)?;
    }
    Ok(())
}
