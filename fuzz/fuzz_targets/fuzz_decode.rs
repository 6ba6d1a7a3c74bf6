#![no_main]

use libfuzzer_sys::fuzz_target;
use mqtt_wire::{decode_packet, encode_packet};

fuzz_target!(|data: &[u8]| {
    // Any input: no panics, no reads past the end, and a decoded packet must
    // re-encode to exactly the bytes it was decoded from
    if let Ok((packet, consumed)) = decode_packet(data) {
        assert!(consumed <= data.len());
        if let Ok(encoded) = encode_packet(&packet) {
            let (again, _) = decode_packet(&encoded).expect("re-encoded packet must decode");
            assert_eq!(again, packet);
        }
    }
});
