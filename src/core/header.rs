//! # Fixed Header
//!
//! The first byte of every packet, and the CONNECT flags byte.
//!
//! ```text
//! fixed header:   7 6 5 4 | 3   | 2 1 | 0
//!                 type    | dup | qos | retain
//!
//! connect flags:  7        | 6        | 5           | 4 3      | 2    | 1            | 0
//!                 username | password | will retain | will qos | will | clean session | reserved
//! ```
//!
//! Both are packed and unpacked explicitly on a `u8`, so the layout never
//! depends on compiler bit-field ordering.

use crate::error::{constants, DecodeError};

/// MQTT control packet types (high nibble of the fixed header).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PacketType {
    Connect = 1,
    Connack = 2,
    Publish = 3,
    Puback = 4,
    Pubrec = 5,
    Pubrel = 6,
    Pubcomp = 7,
    Subscribe = 8,
    Suback = 9,
    Unsubscribe = 10,
    Unsuback = 11,
    Pingreq = 12,
    Pingresp = 13,
    Disconnect = 14,
}

impl TryFrom<u8> for PacketType {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(PacketType::Connect),
            2 => Ok(PacketType::Connack),
            3 => Ok(PacketType::Publish),
            4 => Ok(PacketType::Puback),
            5 => Ok(PacketType::Pubrec),
            6 => Ok(PacketType::Pubrel),
            7 => Ok(PacketType::Pubcomp),
            8 => Ok(PacketType::Subscribe),
            9 => Ok(PacketType::Suback),
            10 => Ok(PacketType::Unsubscribe),
            11 => Ok(PacketType::Unsuback),
            12 => Ok(PacketType::Pingreq),
            13 => Ok(PacketType::Pingresp),
            14 => Ok(PacketType::Disconnect),
            _ => Err(DecodeError::UnknownPacketType(value)),
        }
    }
}

impl PacketType {
    /// Upper-case protocol name, for logs.
    pub fn name(self) -> &'static str {
        match self {
            PacketType::Connect => "CONNECT",
            PacketType::Connack => "CONNACK",
            PacketType::Publish => "PUBLISH",
            PacketType::Puback => "PUBACK",
            PacketType::Pubrec => "PUBREC",
            PacketType::Pubrel => "PUBREL",
            PacketType::Pubcomp => "PUBCOMP",
            PacketType::Subscribe => "SUBSCRIBE",
            PacketType::Suback => "SUBACK",
            PacketType::Unsubscribe => "UNSUBSCRIBE",
            PacketType::Unsuback => "UNSUBACK",
            PacketType::Pingreq => "PINGREQ",
            PacketType::Pingresp => "PINGRESP",
            PacketType::Disconnect => "DISCONNECT",
        }
    }
}

impl std::fmt::Display for PacketType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Quality of Service levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
#[allow(clippy::enum_variant_names)]
pub enum QoS {
    #[default]
    AtMostOnce = 0,
    AtLeastOnce = 1,
    ExactlyOnce = 2,
}

impl TryFrom<u8> for QoS {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(QoS::AtMostOnce),
            1 => Ok(QoS::AtLeastOnce),
            2 => Ok(QoS::ExactlyOnce),
            _ => Err(DecodeError::InvalidQoS(value)),
        }
    }
}

/// Decomposed fixed header byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub packet_type: PacketType,
    pub dup: bool,
    pub qos: QoS,
    pub retain: bool,
}

impl Header {
    /// Header with all flag bits cleared.
    pub const fn new(packet_type: PacketType) -> Self {
        Self {
            packet_type,
            dup: false,
            qos: QoS::AtMostOnce,
            retain: false,
        }
    }

    /// Header with the flag bits a well-formed packet of this type carries.
    ///
    /// PUBREL, SUBSCRIBE and UNSUBSCRIBE set QoS 1; everything else is zero.
    pub const fn for_type(packet_type: PacketType) -> Self {
        let qos = match packet_type {
            PacketType::Pubrel | PacketType::Subscribe | PacketType::Unsubscribe => {
                QoS::AtLeastOnce
            }
            _ => QoS::AtMostOnce,
        };
        Self {
            packet_type,
            dup: false,
            qos,
            retain: false,
        }
    }

    pub fn to_byte(self) -> u8 {
        ((self.packet_type as u8) << 4)
            | ((self.dup as u8) << 3)
            | ((self.qos as u8) << 1)
            | self.retain as u8
    }

    /// Unpack a header byte. The type nibble is checked before the QoS bits.
    pub fn from_byte(byte: u8) -> Result<Self, DecodeError> {
        let packet_type = PacketType::try_from(byte >> 4)?;
        let qos = QoS::try_from((byte >> 1) & 0x03)
            .map_err(|_| DecodeError::MalformedHeader(constants::ERR_HEADER_QOS))?;
        Ok(Self {
            packet_type,
            dup: byte & 0x08 != 0,
            qos,
            retain: byte & 0x01 != 0,
        })
    }
}

/// Decomposed CONNECT flags byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConnectFlags {
    pub clean_session: bool,
    pub will: bool,
    pub will_qos: QoS,
    pub will_retain: bool,
    pub password: bool,
    pub username: bool,
}

impl ConnectFlags {
    /// Pack into a byte; the reserved bit is always zero.
    pub fn to_byte(self) -> u8 {
        ((self.username as u8) << 7)
            | ((self.password as u8) << 6)
            | ((self.will_retain as u8) << 5)
            | ((self.will_qos as u8) << 3)
            | ((self.will as u8) << 2)
            | ((self.clean_session as u8) << 1)
    }

    pub fn from_byte(byte: u8) -> Result<Self, DecodeError> {
        if byte & 0x01 != 0 {
            return Err(DecodeError::MalformedHeader(constants::ERR_RESERVED_FLAG));
        }
        let will_qos = QoS::try_from((byte >> 3) & 0x03)
            .map_err(|_| DecodeError::MalformedHeader(constants::ERR_WILL_QOS))?;
        let flags = Self {
            clean_session: byte & 0x02 != 0,
            will: byte & 0x04 != 0,
            will_qos,
            will_retain: byte & 0x20 != 0,
            password: byte & 0x40 != 0,
            username: byte & 0x80 != 0,
        };
        if !flags.will && (flags.will_qos != QoS::AtMostOnce || flags.will_retain) {
            return Err(DecodeError::MalformedHeader(constants::ERR_WILL_FLAGS));
        }
        Ok(flags)
    }
}
