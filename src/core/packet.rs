//! # Packet Model
//!
//! The closed set of MQTT control packets. Every variant carries its own
//! [`Header`] so the fixed-header flag bits survive a decode/encode cycle
//! unchanged.
//!
//! Decoded packets own their data: strings are `String` and binary fields are
//! [`Bytes`] copied out of the input, so the transport can reuse its read
//! buffer as soon as decoding returns.

use bytes::Bytes;

use crate::core::header::{ConnectFlags, Header, PacketType, QoS};
use crate::error::DecodeError;

/// Protocol name sent by MQTT 3.1.1 clients.
pub const PROTOCOL_NAME: &str = "MQTT";

/// Protocol level for MQTT 3.1.1.
pub const PROTOCOL_VERSION: u8 = 4;

/// Protocol name used by MQTT 3.1 clients.
pub const PROTOCOL_NAME_V31: &str = "MQIsdp";

/// Protocol level for MQTT 3.1.
pub const PROTOCOL_VERSION_V31: u8 = 3;

/// SUBACK return code signalling a rejected subscription.
pub const SUBACK_FAILURE: u8 = 0x80;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    Connect(Connect),
    Connack(Connack),
    Publish(Publish),
    Puback(Ack),
    Pubrec(Ack),
    Pubrel(Ack),
    Pubcomp(Ack),
    Subscribe(Subscribe),
    Suback(Suback),
    Unsubscribe(Unsubscribe),
    Unsuback(Ack),
    Pingreq(Header),
    Pingresp(Header),
    Disconnect(Header),
}

impl Packet {
    pub fn header(&self) -> &Header {
        match self {
            Packet::Connect(p) => &p.header,
            Packet::Connack(p) => &p.header,
            Packet::Publish(p) => &p.header,
            Packet::Puback(p)
            | Packet::Pubrec(p)
            | Packet::Pubrel(p)
            | Packet::Pubcomp(p)
            | Packet::Unsuback(p) => &p.header,
            Packet::Subscribe(p) => &p.header,
            Packet::Suback(p) => &p.header,
            Packet::Unsubscribe(p) => &p.header,
            Packet::Pingreq(h) | Packet::Pingresp(h) | Packet::Disconnect(h) => h,
        }
    }

    /// The type implied by the variant, independent of what the header says.
    pub fn packet_type(&self) -> PacketType {
        match self {
            Packet::Connect(_) => PacketType::Connect,
            Packet::Connack(_) => PacketType::Connack,
            Packet::Publish(_) => PacketType::Publish,
            Packet::Puback(_) => PacketType::Puback,
            Packet::Pubrec(_) => PacketType::Pubrec,
            Packet::Pubrel(_) => PacketType::Pubrel,
            Packet::Pubcomp(_) => PacketType::Pubcomp,
            Packet::Subscribe(_) => PacketType::Subscribe,
            Packet::Suback(_) => PacketType::Suback,
            Packet::Unsubscribe(_) => PacketType::Unsubscribe,
            Packet::Unsuback(_) => PacketType::Unsuback,
            Packet::Pingreq(_) => PacketType::Pingreq,
            Packet::Pingresp(_) => PacketType::Pingresp,
            Packet::Disconnect(_) => PacketType::Disconnect,
        }
    }

    pub fn puback(message_id: u16) -> Self {
        Packet::Puback(Ack::new(PacketType::Puback, message_id))
    }

    pub fn pubrec(message_id: u16) -> Self {
        Packet::Pubrec(Ack::new(PacketType::Pubrec, message_id))
    }

    pub fn pubrel(message_id: u16) -> Self {
        Packet::Pubrel(Ack::new(PacketType::Pubrel, message_id))
    }

    pub fn pubcomp(message_id: u16) -> Self {
        Packet::Pubcomp(Ack::new(PacketType::Pubcomp, message_id))
    }

    pub fn unsuback(message_id: u16) -> Self {
        Packet::Unsuback(Ack::new(PacketType::Unsuback, message_id))
    }

    pub fn pingreq() -> Self {
        Packet::Pingreq(Header::for_type(PacketType::Pingreq))
    }

    pub fn pingresp() -> Self {
        Packet::Pingresp(Header::for_type(PacketType::Pingresp))
    }

    pub fn disconnect() -> Self {
        Packet::Disconnect(Header::for_type(PacketType::Disconnect))
    }
}

/// CONNECT packet.
///
/// The connect flags byte is not stored; it is derived from which optional
/// fields are present (see [`Connect::flags`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connect {
    pub header: Header,
    pub protocol_name: String,
    pub protocol_version: u8,
    pub clean_session: bool,
    /// Seconds
    pub keep_alive: u16,
    pub client_id: String,
    pub will: Option<Will>,
    pub username: Option<String>,
    pub password: Option<Bytes>,
}

impl Connect {
    /// MQTT 3.1.1 CONNECT with a clean session and a 60 second keep-alive.
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            header: Header::for_type(PacketType::Connect),
            protocol_name: PROTOCOL_NAME.to_string(),
            protocol_version: PROTOCOL_VERSION,
            clean_session: true,
            keep_alive: 60,
            client_id: client_id.into(),
            will: None,
            username: None,
            password: None,
        }
    }

    pub fn flags(&self) -> ConnectFlags {
        ConnectFlags {
            clean_session: self.clean_session,
            will: self.will.is_some(),
            will_qos: self.will.as_ref().map(|w| w.qos).unwrap_or_default(),
            will_retain: self.will.as_ref().is_some_and(|w| w.retain),
            password: self.password.is_some(),
            username: self.username.is_some(),
        }
    }
}

/// Last-will message carried in CONNECT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Will {
    pub topic: String,
    pub message: Bytes,
    pub qos: QoS,
    pub retain: bool,
}

/// CONNACK return codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnackCode {
    Accepted = 0,
    UnacceptableProtocolVersion = 1,
    IdentifierRejected = 2,
    ServerUnavailable = 3,
    BadUsernamePassword = 4,
    NotAuthorized = 5,
}

impl TryFrom<u8> for ConnackCode {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ConnackCode::Accepted),
            1 => Ok(ConnackCode::UnacceptableProtocolVersion),
            2 => Ok(ConnackCode::IdentifierRejected),
            3 => Ok(ConnackCode::ServerUnavailable),
            4 => Ok(ConnackCode::BadUsernamePassword),
            5 => Ok(ConnackCode::NotAuthorized),
            _ => Err(DecodeError::InvalidReturnCode(value)),
        }
    }
}

/// CONNACK packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connack {
    pub header: Header,
    /// Bit 0 of the acknowledge flags byte (always false for MQTT 3.1 peers).
    pub session_present: bool,
    pub code: ConnackCode,
}

impl Connack {
    pub fn new(code: ConnackCode, session_present: bool) -> Self {
        Self {
            header: Header::for_type(PacketType::Connack),
            session_present,
            code,
        }
    }
}

/// PUBLISH packet. QoS, DUP and RETAIN live in the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publish {
    pub header: Header,
    pub topic: String,
    /// Present iff `header.qos` is 1 or 2.
    pub message_id: Option<u16>,
    pub payload: Bytes,
}

impl Publish {
    /// QoS 0 publish; no message id.
    pub fn new(topic: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            header: Header::for_type(PacketType::Publish),
            topic: topic.into(),
            message_id: None,
            payload: payload.into(),
        }
    }

    /// Publish at QoS 1 or 2 with the given message id.
    pub fn with_qos(
        topic: impl Into<String>,
        qos: QoS,
        message_id: u16,
        payload: impl Into<Bytes>,
    ) -> Self {
        let mut publish = Self::new(topic, payload);
        publish.header.qos = qos;
        publish.message_id = (qos != QoS::AtMostOnce).then_some(message_id);
        publish
    }

    pub fn qos(&self) -> QoS {
        self.header.qos
    }

    pub fn retain(mut self, retain: bool) -> Self {
        self.header.retain = retain;
        self
    }

    pub fn dup(mut self, dup: bool) -> Self {
        self.header.dup = dup;
        self
    }
}

/// Body of the packets that carry nothing but a message id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack {
    pub header: Header,
    pub message_id: u16,
}

impl Ack {
    pub fn new(packet_type: PacketType, message_id: u16) -> Self {
        Self {
            header: Header::for_type(packet_type),
            message_id,
        }
    }
}

/// One topic filter in a SUBSCRIBE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscribeFilter {
    pub filter: String,
    pub qos: QoS,
}

impl SubscribeFilter {
    pub fn new(filter: impl Into<String>, qos: QoS) -> Self {
        Self {
            filter: filter.into(),
            qos,
        }
    }
}

/// SUBSCRIBE packet. Must carry at least one filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscribe {
    pub header: Header,
    pub message_id: u16,
    pub filters: Vec<SubscribeFilter>,
}

impl Subscribe {
    pub fn new(message_id: u16, filters: Vec<SubscribeFilter>) -> Self {
        Self {
            header: Header::for_type(PacketType::Subscribe),
            message_id,
            filters,
        }
    }
}

/// Per-filter result in a SUBACK.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubackCode {
    Granted(QoS),
    Failure,
}

impl SubackCode {
    pub fn to_byte(self) -> u8 {
        match self {
            SubackCode::Granted(qos) => qos as u8,
            SubackCode::Failure => SUBACK_FAILURE,
        }
    }
}

impl TryFrom<u8> for SubackCode {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            SUBACK_FAILURE => Ok(SubackCode::Failure),
            _ => QoS::try_from(value)
                .map(SubackCode::Granted)
                .map_err(|_| DecodeError::InvalidReturnCode(value)),
        }
    }
}

/// SUBACK packet. Codes are in the same order as the SUBSCRIBE filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suback {
    pub header: Header,
    pub message_id: u16,
    pub return_codes: Vec<SubackCode>,
}

impl Suback {
    pub fn new(message_id: u16, return_codes: Vec<SubackCode>) -> Self {
        Self {
            header: Header::for_type(PacketType::Suback),
            message_id,
            return_codes,
        }
    }
}

/// UNSUBSCRIBE packet. Must carry at least one filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unsubscribe {
    pub header: Header,
    pub message_id: u16,
    pub filters: Vec<String>,
}

impl Unsubscribe {
    pub fn new(message_id: u16, filters: Vec<String>) -> Self {
        Self {
            header: Header::for_type(PacketType::Unsubscribe),
            message_id,
            filters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_flags_follow_optional_fields() {
        let mut connect = Connect::new("client-1");
        assert_eq!(connect.flags().to_byte(), 0x02);

        connect.will = Some(Will {
            topic: "status".into(),
            message: Bytes::from_static(b"offline"),
            qos: QoS::ExactlyOnce,
            retain: true,
        });
        connect.password = Some(Bytes::from_static(b"secret"));
        let flags = connect.flags();
        assert!(flags.will && flags.will_retain && flags.password);
        assert!(!flags.username);
        assert_eq!(flags.will_qos, QoS::ExactlyOnce);
    }

    #[test]
    fn test_publish_qos_zero_drops_message_id() {
        let publish = Publish::with_qos("a/b", QoS::AtMostOnce, 7, vec![1u8]);
        assert_eq!(publish.message_id, None);

        let publish = Publish::with_qos("a/b", QoS::AtLeastOnce, 7, vec![1u8]);
        assert_eq!(publish.message_id, Some(7));
        assert_eq!(publish.qos(), QoS::AtLeastOnce);
    }

    #[test]
    fn test_suback_codes() {
        assert_eq!(
            SubackCode::try_from(0x01),
            Ok(SubackCode::Granted(QoS::AtLeastOnce))
        );
        assert_eq!(SubackCode::try_from(0x80), Ok(SubackCode::Failure));
        assert_eq!(
            SubackCode::try_from(0x03),
            Err(DecodeError::InvalidReturnCode(0x03))
        );
        assert_eq!(SubackCode::Failure.to_byte(), 0x80);
    }

    #[test]
    fn test_packet_type_matches_header() {
        for packet in [
            Packet::puback(1),
            Packet::pubrel(2),
            Packet::unsuback(3),
            Packet::pingreq(),
            Packet::disconnect(),
        ] {
            assert_eq!(packet.header().packet_type, packet.packet_type());
        }
    }
}
