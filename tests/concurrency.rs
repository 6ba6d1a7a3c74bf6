use bytes::BytesMut;
use mqtt_wire::{decode_packet, encode_packet_into, Packet, Publish, QoS};

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_encode_decode_heavy() {
    use tokio::task::JoinSet;

    let iterations = 2_000usize;
    let payload_sizes = [0usize, 64, 512, 4096, 65536];

    let mut tasks = JoinSet::new();
    for &size in &payload_sizes {
        tasks.spawn(async move {
            let mut buf = BytesMut::new();
            for i in 0..iterations {
                let payload = vec![((i + size) & 0xFF) as u8; size];
                let packet = Packet::Publish(Publish::with_qos(
                    format!("load/{size}"),
                    QoS::AtLeastOnce,
                    (i & 0xFFFF) as u16,
                    payload,
                ));
                encode_packet_into(&packet, &mut buf).unwrap();
                let (decoded, consumed) = decode_packet(&buf).unwrap();
                assert_eq!(consumed, buf.len());
                assert_eq!(decoded, packet);
                buf.clear();
            }
        });
    }

    while let Some(res) = tasks.join_next().await {
        res.unwrap();
    }
}

#[test]
fn shared_input_buffer_across_threads() {
    let mut wire = BytesMut::new();
    for id in 0..100u16 {
        encode_packet_into(&Packet::puback(id), &mut wire).unwrap();
    }
    let wire = wire.freeze();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            let wire = &wire;
            scope.spawn(move || {
                let mut offset = 0;
                let mut expected = 0u16;
                while offset < wire.len() {
                    let (packet, consumed) = decode_packet(&wire[offset..]).unwrap();
                    assert_eq!(packet, Packet::puback(expected));
                    offset += consumed;
                    expected += 1;
                }
                assert_eq!(expected, 100);
            });
        }
    });
}
