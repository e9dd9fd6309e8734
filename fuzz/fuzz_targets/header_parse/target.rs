#![no_main]
use dcf_codec::FrameHeader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // FrameHeader::decode must return a Result for any input, never panic.
    let _ = FrameHeader::decode(data);
});
