#![no_main]

use std::cell::RefCell;

use codec::Packer;
use libfuzzer_sys::fuzz_target;

// Drives a bounded sequence of pack operations from the input bytes
// against both an owned and a streaming packer, and checks the two
// produce identical output.
fuzz_target!(|data: &[u8]| {
    let block_size = data.first().map_or(64, |&b| usize::from(b));

    let streamed = RefCell::new(Vec::new());
    let Ok(mut stream) = Packer::streaming(block_size, |chunk: &[u8]| {
        streamed.borrow_mut().extend_from_slice(chunk);
        Ok(())
    }) else {
        return;
    };
    let Ok(mut owned) = Packer::new() else {
        return;
    };

    let mut idx = 1usize;
    let mut ops = 0usize;
    while idx < data.len() && ops < 1024 {
        let op = data[idx] % 8;
        idx += 1;
        ops += 1;

        let mut word = [0u8; 8];
        let avail = (data.len() - idx).min(8);
        word[..avail].copy_from_slice(&data[idx..idx + avail]);
        idx += avail;
        let arg = u64::from_le_bytes(word);

        for p in [&mut owned, &mut stream] {
            let _ = match op {
                0 => p.pack_nil(),
                1 => p.pack_bool(arg & 1 == 1),
                2 => p.pack_uint(arg),
                3 => p.pack_int(arg as i64),
                4 => p.pack_f64(f64::from_bits(arg)),
                5 => p.pack_str(&word[..(arg % 9) as usize]),
                6 => p.pack_array_streaming(),
                _ => p.pack_end(),
            };
        }
    }

    assert_eq!(owned.position(), stream.position());
    let expected = owned.finish().unwrap();
    stream.finish().unwrap();
    assert_eq!(streamed.into_inner(), expected);
});
