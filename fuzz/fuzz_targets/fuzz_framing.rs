#![no_main]

use bytes::BytesMut;
use libfuzzer_sys::fuzz_target;
use mqtt_wire::MqttCodec;
use tokio_util::codec::Decoder;

fuzz_target!(|data: &[u8]| {
    // Drain a stream of arbitrary bytes through the framing codec
    let mut codec = MqttCodec::new().with_max_packet_size(64 * 1024);
    let mut buf = BytesMut::from(data);
    while let Ok(Some(_packet)) = codec.decode(&mut buf) {}
});
