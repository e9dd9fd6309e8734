#![no_main]
use dcf_codec::Reader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Reader::validate must reject malformed input cleanly, never panic,
    // regardless of magic/version/length/CRC corruption.
    if let Ok(mut reader) = Reader::new(data) {
        let _ = reader.validate();
    }
});
