//! Codec Metrics
//!
//! Counters for the framing codec: packets and bytes in each direction, plus
//! the failures a connection owner usually wants to alert on.
//!
//! Uses atomic counters so one instance can be shared across connections.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::info;

/// Metrics collector shared by one or more [`MqttCodec`](crate::MqttCodec)s
#[derive(Debug)]
pub struct CodecMetrics {
    /// Packets successfully decoded
    pub packets_decoded: AtomicU64,
    /// Packets successfully encoded
    pub packets_encoded: AtomicU64,
    /// Bytes consumed by decoded packets
    pub bytes_decoded: AtomicU64,
    /// Bytes produced by encoded packets
    pub bytes_encoded: AtomicU64,
    /// Fatal decode errors (anything but a partial frame)
    pub decode_errors: AtomicU64,
    /// Outgoing packets rejected by the encoder
    pub encode_errors: AtomicU64,
    /// Frames refused for exceeding the configured maximum size
    pub oversized_frames: AtomicU64,
    start_time: Instant,
}

impl CodecMetrics {
    pub fn new() -> Self {
        Self {
            packets_decoded: AtomicU64::new(0),
            packets_encoded: AtomicU64::new(0),
            bytes_decoded: AtomicU64::new(0),
            bytes_encoded: AtomicU64::new(0),
            decode_errors: AtomicU64::new(0),
            encode_errors: AtomicU64::new(0),
            oversized_frames: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn packet_decoded(&self, byte_count: usize) {
        self.packets_decoded.fetch_add(1, Ordering::Relaxed);
        self.bytes_decoded
            .fetch_add(byte_count as u64, Ordering::Relaxed);
    }

    pub fn packet_encoded(&self, byte_count: usize) {
        self.packets_encoded.fetch_add(1, Ordering::Relaxed);
        self.bytes_encoded
            .fetch_add(byte_count as u64, Ordering::Relaxed);
    }

    pub fn decode_error(&self) {
        self.decode_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn encode_error(&self) {
        self.encode_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn oversized_frame(&self) {
        self.oversized_frames.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            packets_decoded: self.packets_decoded.load(Ordering::Relaxed),
            packets_encoded: self.packets_encoded.load(Ordering::Relaxed),
            bytes_decoded: self.bytes_decoded.load(Ordering::Relaxed),
            bytes_encoded: self.bytes_encoded.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
            encode_errors: self.encode_errors.load(Ordering::Relaxed),
            oversized_frames: self.oversized_frames.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    /// Log current metrics
    pub fn log_metrics(&self) {
        let snapshot = self.snapshot();
        info!(
            packets_decoded = snapshot.packets_decoded,
            packets_encoded = snapshot.packets_encoded,
            bytes_decoded = snapshot.bytes_decoded,
            bytes_encoded = snapshot.bytes_encoded,
            decode_errors = snapshot.decode_errors,
            encode_errors = snapshot.encode_errors,
            oversized_frames = snapshot.oversized_frames,
            uptime_seconds = snapshot.uptime_seconds,
            "Codec metrics snapshot"
        );
    }
}

impl Default for CodecMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub packets_decoded: u64,
    pub packets_encoded: u64,
    pub bytes_decoded: u64,
    pub bytes_encoded: u64,
    pub decode_errors: u64,
    pub encode_errors: u64,
    pub oversized_frames: u64,
    pub uptime_seconds: u64,
}
