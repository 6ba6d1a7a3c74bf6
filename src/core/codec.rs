//! # Stream Framing
//!
//! [`MqttCodec`] adapts the packet codec to `tokio_util::codec`, so a byte
//! stream can be wrapped in `Framed` and read as a stream of [`Packet`]s.
//!
//! The decoder looks only at the fixed header until the whole frame has
//! arrived; partial input is left in the buffer untouched. Frames whose
//! declared size exceeds the configured maximum are refused before their body
//! is buffered.

use bytes::BytesMut;
use std::sync::Arc;
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, warn};

use crate::config::{FramingConfig, DEFAULT_MAX_PACKET_SIZE};
use crate::core::decoder::{decode_packet, packet_len};
use crate::core::encoder::encode_packet_into;
use crate::core::packet::Packet;
use crate::error::{DecodeError, ProtocolError};
use crate::utils::metrics::CodecMetrics;

#[derive(Debug, Clone)]
pub struct MqttCodec {
    max_packet_size: usize,
    metrics: Option<Arc<CodecMetrics>>,
}

impl Default for MqttCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl MqttCodec {
    pub fn new() -> Self {
        Self {
            max_packet_size: DEFAULT_MAX_PACKET_SIZE,
            metrics: None,
        }
    }

    pub fn from_config(config: &FramingConfig) -> Self {
        Self::new().with_max_packet_size(config.max_packet_size)
    }

    pub fn with_max_packet_size(mut self, max_packet_size: usize) -> Self {
        self.max_packet_size = max_packet_size;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<CodecMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn max_packet_size(&self) -> usize {
        self.max_packet_size
    }

    fn decode_failed(&self, err: DecodeError) -> ProtocolError {
        if let Some(metrics) = &self.metrics {
            metrics.decode_error();
        }
        warn!(error = %err, "Dropping malformed frame");
        err.into()
    }
}

impl Decoder for MqttCodec {
    type Item = Packet;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let frame_len = match packet_len(src) {
            Ok(len) => len,
            Err(e) if e.is_incomplete() => return Ok(None),
            Err(e) => return Err(self.decode_failed(e)),
        };

        if frame_len > self.max_packet_size {
            if let Some(metrics) = &self.metrics {
                metrics.oversized_frame();
            }
            warn!(
                size = frame_len,
                max = self.max_packet_size,
                "Refusing oversized frame"
            );
            return Err(DecodeError::PacketTooLarge {
                size: frame_len,
                max: self.max_packet_size,
            }
            .into());
        }

        if src.len() < frame_len {
            src.reserve(frame_len - src.len());
            return Ok(None);
        }

        let frame = src.split_to(frame_len);
        match decode_packet(&frame) {
            Ok((packet, consumed)) => {
                if let Some(metrics) = &self.metrics {
                    metrics.packet_decoded(consumed);
                }
                debug!(packet_type = %packet.packet_type(), size = consumed, "Frame decoded");
                Ok(Some(packet))
            }
            Err(e) => Err(self.decode_failed(e)),
        }
    }
}

impl Encoder<&Packet> for MqttCodec {
    type Error = ProtocolError;

    fn encode(&mut self, item: &Packet, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match encode_packet_into(item, dst) {
            Ok(written) => {
                if let Some(metrics) = &self.metrics {
                    metrics.packet_encoded(written);
                }
                Ok(())
            }
            Err(e) => {
                if let Some(metrics) = &self.metrics {
                    metrics.encode_error();
                }
                warn!(packet_type = %item.packet_type(), error = %e, "Rejecting outgoing packet");
                Err(e.into())
            }
        }
    }
}

impl Encoder<Packet> for MqttCodec {
    type Error = ProtocolError;

    fn encode(&mut self, item: Packet, dst: &mut BytesMut) -> Result<(), Self::Error> {
        Encoder::<&Packet>::encode(self, &item, dst)
    }
}
