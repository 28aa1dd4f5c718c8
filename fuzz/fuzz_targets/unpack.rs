#![no_main]

use codec::{pack_to_vec, unpack_value_with_limits, Limits, Unpacker};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let limits = Limits {
        max_depth: 32,
        max_array_fill: 4096,
        max_total_nodes: 1 << 16,
    };

    // Tree decode: must return a value or a structured error, never panic
    // or allocate proportionally to declared (unbacked) lengths.
    if let Ok(value) = unpack_value_with_limits(data, &limits) {
        // Anything that decodes must re-encode and decode to the same tree.
        let bytes = pack_to_vec(&value).unwrap();
        let again = unpack_value_with_limits(&bytes, &limits).unwrap();
        assert_eq!(again, value);
    }

    // Pull decode over the same input, bounded by input size.
    let mut u = Unpacker::new(data);
    for _ in 0..data.len() + 1 {
        match u.next() {
            Ok(Some(_)) => {}
            Ok(None) | Err(_) => break,
        }
    }
});
