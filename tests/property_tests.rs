//! Property-based tests using proptest
//!
//! These tests validate codec invariants across randomly generated packets and
//! byte sequences.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use bytes::Bytes;
use mqtt_wire::core::varint::{encoded_len, MAX_REMAINING_LENGTH};
use mqtt_wire::{
    decode_packet, encode_packet, peek_remaining_length, Ack, Connack, ConnackCode, Connect,
    DecodeError, Header, Packet, PacketType, Publish, QoS, Suback, SubackCode, Subscribe,
    SubscribeFilter, Unsubscribe, Will,
};
use proptest::prelude::*;

fn qos() -> impl Strategy<Value = QoS> {
    prop_oneof![
        Just(QoS::AtMostOnce),
        Just(QoS::AtLeastOnce),
        Just(QoS::ExactlyOnce)
    ]
}

fn topic() -> impl Strategy<Value = String> {
    "[a-z0-9/+#éü]{0,40}"
}

fn blob(max: usize) -> impl Strategy<Value = Bytes> {
    prop::collection::vec(any::<u8>(), 0..max).prop_map(Bytes::from)
}

fn connect() -> impl Strategy<Value = Packet> {
    let will = (topic(), blob(64), qos(), any::<bool>()).prop_map(|(topic, message, qos, retain)| {
        Will {
            topic,
            message,
            qos,
            retain,
        }
    });
    (
        "[A-Za-z]{0,8}",
        any::<u8>(),
        any::<bool>(),
        any::<u16>(),
        "[a-zA-Z0-9-]{0,23}",
        prop::option::of(will),
        prop::option::of("[a-z]{0,16}"),
        prop::option::of(blob(32)),
    )
        .prop_map(
            |(name, version, clean, keep_alive, client_id, will, username, password)| {
                let mut connect = Connect::new(client_id);
                connect.protocol_name = name;
                connect.protocol_version = version;
                connect.clean_session = clean;
                connect.keep_alive = keep_alive;
                connect.will = will;
                connect.username = username;
                connect.password = password;
                Packet::Connect(connect)
            },
        )
}

fn connack_code() -> impl Strategy<Value = ConnackCode> {
    prop_oneof![
        Just(ConnackCode::Accepted),
        Just(ConnackCode::UnacceptableProtocolVersion),
        Just(ConnackCode::IdentifierRejected),
        Just(ConnackCode::ServerUnavailable),
        Just(ConnackCode::BadUsernamePassword),
        Just(ConnackCode::NotAuthorized),
    ]
}

fn publish() -> impl Strategy<Value = Packet> {
    (topic(), qos(), any::<u16>(), blob(2048), any::<bool>(), any::<bool>()).prop_map(
        |(topic, qos, id, payload, retain, dup)| {
            Packet::Publish(
                Publish::with_qos(topic, qos, id, payload)
                    .retain(retain)
                    .dup(dup),
            )
        },
    )
}

fn ack() -> impl Strategy<Value = Packet> {
    (0usize..5, any::<u16>()).prop_map(|(kind, id)| match kind {
        0 => Packet::puback(id),
        1 => Packet::pubrec(id),
        2 => Packet::pubrel(id),
        3 => Packet::pubcomp(id),
        _ => Packet::unsuback(id),
    })
}

fn suback_code() -> impl Strategy<Value = SubackCode> {
    prop_oneof![qos().prop_map(SubackCode::Granted), Just(SubackCode::Failure)]
}

fn packet() -> impl Strategy<Value = Packet> {
    prop_oneof![
        connect(),
        (connack_code(), any::<bool>())
            .prop_map(|(code, present)| Packet::Connack(Connack::new(code, present))),
        publish(),
        ack(),
        (
            any::<u16>(),
            prop::collection::vec((topic(), qos()), 1..8)
        )
            .prop_map(|(id, entries)| Packet::Subscribe(Subscribe::new(
                id,
                entries
                    .into_iter()
                    .map(|(f, q)| SubscribeFilter::new(f, q))
                    .collect()
            ))),
        (any::<u16>(), prop::collection::vec(suback_code(), 0..8))
            .prop_map(|(id, codes)| Packet::Suback(Suback::new(id, codes))),
        (any::<u16>(), prop::collection::vec(topic(), 1..8))
            .prop_map(|(id, filters)| Packet::Unsubscribe(Unsubscribe::new(id, filters))),
        Just(Packet::pingreq()),
        Just(Packet::pingresp()),
        Just(Packet::disconnect()),
    ]
}

// Property: every packet survives encode then decode unchanged
proptest! {
    #[test]
    fn prop_packet_roundtrip(packet in packet()) {
        let bytes = encode_packet(&packet).expect("encode should not fail");
        let (decoded, consumed) = decode_packet(&bytes).expect("decode should not fail");

        prop_assert_eq!(decoded, packet);
        prop_assert_eq!(consumed, bytes.len());
    }
}

// Property: the fixed header accounts for exactly the bytes that follow it
proptest! {
    #[test]
    fn prop_remaining_length_matches_body(packet in packet()) {
        let bytes = encode_packet(&packet).unwrap();
        let (length, header_len) = peek_remaining_length(&bytes).unwrap();

        prop_assert_eq!(header_len, 1 + encoded_len(length));
        prop_assert_eq!(header_len + length, bytes.len());
    }
}

// Property: no strict prefix of a packet decodes
proptest! {
    #[test]
    fn prop_strict_prefix_is_truncated(packet in packet(), cut in any::<prop::sample::Index>()) {
        let bytes = encode_packet(&packet).unwrap();
        let cut = cut.index(bytes.len());

        let result = decode_packet(&bytes[..cut]);
        prop_assert!(
            matches!(result, Err(DecodeError::Truncated { .. })),
            "cut at {} of {}: {:?}", cut, bytes.len(), result
        );
    }
}

// Property: encoding is deterministic
proptest! {
    #[test]
    fn prop_encoding_deterministic(packet in packet()) {
        prop_assert_eq!(encode_packet(&packet).unwrap(), encode_packet(&packet).unwrap());
    }
}

// Property: arbitrary bytes never panic and never claim more than they were given
proptest! {
    #[test]
    fn prop_arbitrary_bytes_never_panic(data in prop::collection::vec(any::<u8>(), 0..512)) {
        if let Ok((_, consumed)) = decode_packet(&data) {
            prop_assert!(consumed <= data.len());
        }
    }
}

// Property: a valid header byte followed by garbage is handled without panicking
proptest! {
    #[test]
    fn prop_valid_header_garbage_body(
        type_nibble in 1u8..=14,
        flags in 0u8..16,
        body in prop::collection::vec(any::<u8>(), 0..127),
    ) {
        let mut buf = vec![(type_nibble << 4) | flags, body.len() as u8];
        buf.extend_from_slice(&body);

        match decode_packet(&buf) {
            Ok((packet, consumed)) => {
                prop_assert_eq!(consumed, buf.len());
                prop_assert_eq!(packet.packet_type() as u8, type_nibble);
            }
            Err(DecodeError::Truncated { .. }) => {
                prop_assert!(false, "complete frame reported as truncated");
            }
            Err(_) => {}
        }
    }
}

// Property: a decoded packet re-encodes to the bytes it came from
proptest! {
    #[test]
    fn prop_decoded_packets_reencode_identically(
        type_nibble in 1u8..=14,
        flags in 0u8..16,
        body in prop::collection::vec(any::<u8>(), 0..64),
    ) {
        let mut buf = vec![(type_nibble << 4) | flags, body.len() as u8];
        buf.extend_from_slice(&body);

        if let Ok((packet, _)) = decode_packet(&buf) {
            let reencoded = encode_packet(&packet).expect("decoded packet must re-encode");
            prop_assert_eq!(&reencoded[..], &buf[..]);
        }
    }
}

// Property: acks with any header flags keep them
proptest! {
    #[test]
    fn prop_ack_header_flags_preserved(dup in any::<bool>(), retain in any::<bool>(), q in qos(), id in any::<u16>()) {
        let header = Header { packet_type: PacketType::Pubcomp, dup, qos: q, retain };
        let packet = Packet::Pubcomp(Ack { header, message_id: id });
        let bytes = encode_packet(&packet).unwrap();

        prop_assert_eq!(bytes[0], header.to_byte());
        prop_assert_eq!(decode_packet(&bytes).unwrap().0, packet);
    }
}

#[test]
fn test_max_remaining_length_constant() {
    assert_eq!(MAX_REMAINING_LENGTH, 128 * 128 * 128 * 128 - 1);
}
