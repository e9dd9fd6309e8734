#![no_main]
use dcf_codec::{Reader, Value};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // After a successful validate, generically walking the payload with
    // Value::read_any (which recurses through every container and calls
    // skip on structural mismatches) must never panic or infinitely loop,
    // no matter how the payload bytes are arranged.
    let Ok(mut reader) = Reader::new(data) else { return };
    if reader.validate().is_err() {
        return;
    }
    while !reader.at_end() {
        if Value::read_any(&mut reader).is_err() {
            break;
        }
    }
});
