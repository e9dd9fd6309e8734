#![no_main]
use dcf_codec::varint;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // decode_varint must terminate and return a Result for any byte slice,
    // including ones with the continuation bit set all the way through.
    let _ = varint::decode_varint(data);
});
