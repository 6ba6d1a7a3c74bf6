//! # Packet Decoder
//!
//! Turns one complete packet at the start of a buffer into a [`Packet`].
//!
//! The decoder reads the fixed header, then the remaining length, then hands
//! exactly that many bytes to the parser for the packet type. A parser that
//! needs more bytes than the remaining length declares, or leaves some unread,
//! fails with [`DecodeError::LengthMismatch`]. A buffer that simply ends early
//! fails with [`DecodeError::Truncated`], which is the only retryable outcome.
//!
//! Every read is bounds-checked through [`ByteCursor`]; nothing here panics on
//! hostile input.

use tracing::trace;

use crate::core::header::{ConnectFlags, Header, PacketType, QoS};
use crate::core::packet::{
    Ack, Connack, ConnackCode, Connect, Packet, Publish, Suback, SubackCode, Subscribe,
    SubscribeFilter, Unsubscribe, Will,
};
use crate::core::primitives::{
    read_binary, read_byte, read_bytes, read_string, read_u16, ByteCursor,
};
use crate::core::varint::{peek_remaining_length, read_remaining_length};
use crate::error::{constants, DecodeError};

/// Decode the packet at the start of `buf`.
///
/// Returns the packet and the total number of bytes it occupied (fixed header
/// included). Bytes after the packet are left untouched.
pub fn decode_packet(buf: &[u8]) -> Result<(Packet, usize), DecodeError> {
    let mut cursor = ByteCursor::new(buf);
    let header = Header::from_byte(read_byte(&mut cursor)?)?;
    let body_len = read_remaining_length(&mut cursor)?;
    let header_len = cursor.position();
    let body = cursor.take(body_len)?;

    let packet = decode_body(header, body)?;
    trace!(
        packet_type = %header.packet_type,
        header_len,
        body_len,
        "Decoded packet"
    );
    Ok((packet, header_len + body_len))
}

/// Total size of the packet at the start of `buf`, once its fixed header has
/// arrived. The body does not need to be present.
pub fn packet_len(buf: &[u8]) -> Result<usize, DecodeError> {
    let (body_len, header_len) = peek_remaining_length(buf)?;
    Ok(header_len + body_len)
}

fn decode_body(header: Header, body: &[u8]) -> Result<Packet, DecodeError> {
    let declared = body.len();
    let mut cursor = ByteCursor::new(body);

    let packet = match header.packet_type {
        PacketType::Connect => decode_connect(header, &mut cursor).map(Packet::Connect),
        PacketType::Connack => decode_connack(header, &mut cursor).map(Packet::Connack),
        PacketType::Publish => decode_publish(header, &mut cursor).map(Packet::Publish),
        PacketType::Puback => decode_ack(header, &mut cursor).map(Packet::Puback),
        PacketType::Pubrec => decode_ack(header, &mut cursor).map(Packet::Pubrec),
        PacketType::Pubrel => decode_ack(header, &mut cursor).map(Packet::Pubrel),
        PacketType::Pubcomp => decode_ack(header, &mut cursor).map(Packet::Pubcomp),
        PacketType::Subscribe => decode_subscribe(header, &mut cursor).map(Packet::Subscribe),
        PacketType::Suback => decode_suback(header, &mut cursor).map(Packet::Suback),
        PacketType::Unsubscribe => {
            decode_unsubscribe(header, &mut cursor).map(Packet::Unsubscribe)
        }
        PacketType::Unsuback => decode_ack(header, &mut cursor).map(Packet::Unsuback),
        PacketType::Pingreq => Ok(Packet::Pingreq(header)),
        PacketType::Pingresp => Ok(Packet::Pingresp(header)),
        PacketType::Disconnect => Ok(Packet::Disconnect(header)),
    };

    // The whole body is in hand, so running off its end means the declared
    // length is too short for the fields, not that more data is coming.
    let packet = packet.map_err(|e| match e {
        DecodeError::Truncated { needed, available } => DecodeError::LengthMismatch {
            declared,
            consumed: declared - available + needed,
        },
        other => other,
    })?;

    if !cursor.is_empty() {
        return Err(DecodeError::LengthMismatch {
            declared,
            consumed: cursor.position(),
        });
    }
    Ok(packet)
}

fn decode_connect(header: Header, cursor: &mut ByteCursor<'_>) -> Result<Connect, DecodeError> {
    let protocol_name = read_string(cursor)?;
    let protocol_version = read_byte(cursor)?;
    let flags = ConnectFlags::from_byte(read_byte(cursor)?)?;
    let keep_alive = read_u16(cursor)?;
    let client_id = read_string(cursor)?;

    let will = if flags.will {
        Some(Will {
            topic: read_string(cursor)?,
            message: read_binary(cursor)?,
            qos: flags.will_qos,
            retain: flags.will_retain,
        })
    } else {
        None
    };
    let username = flags.username.then(|| read_string(cursor)).transpose()?;
    let password = flags.password.then(|| read_binary(cursor)).transpose()?;

    Ok(Connect {
        header,
        protocol_name,
        protocol_version,
        clean_session: flags.clean_session,
        keep_alive,
        client_id,
        will,
        username,
        password,
    })
}

fn decode_connack(header: Header, cursor: &mut ByteCursor<'_>) -> Result<Connack, DecodeError> {
    let ack_flags = read_byte(cursor)?;
    if ack_flags & 0xFE != 0 {
        return Err(DecodeError::MalformedHeader(constants::ERR_CONNACK_FLAGS));
    }
    let code = ConnackCode::try_from(read_byte(cursor)?)?;
    Ok(Connack {
        header,
        session_present: ack_flags & 0x01 != 0,
        code,
    })
}

fn decode_publish(header: Header, cursor: &mut ByteCursor<'_>) -> Result<Publish, DecodeError> {
    let topic = read_string(cursor)?;
    let message_id = match header.qos {
        QoS::AtMostOnce => None,
        QoS::AtLeastOnce | QoS::ExactlyOnce => Some(read_u16(cursor)?),
    };
    // Payload is whatever the remaining length leaves after the fields above
    let payload_len = cursor.remaining();
    let payload = read_bytes(cursor, payload_len)?;
    Ok(Publish {
        header,
        topic,
        message_id,
        payload,
    })
}

fn decode_ack(header: Header, cursor: &mut ByteCursor<'_>) -> Result<Ack, DecodeError> {
    Ok(Ack {
        header,
        message_id: read_u16(cursor)?,
    })
}

fn decode_subscribe(header: Header, cursor: &mut ByteCursor<'_>) -> Result<Subscribe, DecodeError> {
    let message_id = read_u16(cursor)?;
    let mut filters = Vec::new();
    while !cursor.is_empty() {
        let filter = read_string(cursor)?;
        let qos = QoS::try_from(read_byte(cursor)?)?;
        filters.push(SubscribeFilter { filter, qos });
    }
    if filters.is_empty() {
        return Err(DecodeError::NoTopicFilters);
    }
    Ok(Subscribe {
        header,
        message_id,
        filters,
    })
}

fn decode_suback(header: Header, cursor: &mut ByteCursor<'_>) -> Result<Suback, DecodeError> {
    let message_id = read_u16(cursor)?;
    let mut return_codes = Vec::with_capacity(cursor.remaining());
    while !cursor.is_empty() {
        return_codes.push(SubackCode::try_from(read_byte(cursor)?)?);
    }
    Ok(Suback {
        header,
        message_id,
        return_codes,
    })
}

fn decode_unsubscribe(
    header: Header,
    cursor: &mut ByteCursor<'_>,
) -> Result<Unsubscribe, DecodeError> {
    let message_id = read_u16(cursor)?;
    let mut filters = Vec::new();
    while !cursor.is_empty() {
        filters.push(read_string(cursor)?);
    }
    if filters.is_empty() {
        return Err(DecodeError::NoTopicFilters);
    }
    Ok(Unsubscribe {
        header,
        message_id,
        filters,
    })
}
