use dcf_codec::{CodecError, Flags, Reader, Type, Writer};

#[test]
fn writes_and_reads_back_every_scalar_type() {
    let mut w = Writer::new(5, 0);
    w.write_null().unwrap();
    w.write_bool(true).unwrap();
    w.write_u8(0xAB).unwrap();
    w.write_i8(-5).unwrap();
    w.write_u16(0x1234).unwrap();
    w.write_i16(-1000).unwrap();
    w.write_u32(0xDEAD_BEEF).unwrap();
    w.write_i32(-123456).unwrap();
    w.write_u64(0x0123_4567_89AB_CDEF).unwrap();
    w.write_i64(-9_000_000_000).unwrap();
    w.write_f32(3.5).unwrap();
    w.write_f64(2.718281828).unwrap();
    w.write_timestamp(1_700_000_000_000_000).unwrap();
    w.write_duration(42_000_000).unwrap();
    w.write_uuid(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16]).unwrap();
    w.write_varint(300).unwrap();
    w.write_varsint(-300).unwrap();
    w.write_string("hello frame").unwrap();
    w.write_bytes(&[9, 8, 7]).unwrap();
    let frame = w.finish().unwrap().to_vec();

    let mut r = Reader::new(&frame).unwrap();
    r.validate().unwrap();
    assert_eq!(r.header().unwrap().msg_type, 5);

    r.read_null().unwrap();
    assert_eq!(r.read_bool().unwrap(), true);
    assert_eq!(r.read_u8().unwrap(), 0xAB);
    assert_eq!(r.read_i8().unwrap(), -5);
    assert_eq!(r.read_u16().unwrap(), 0x1234);
    assert_eq!(r.read_i16().unwrap(), -1000);
    assert_eq!(r.read_u32().unwrap(), 0xDEAD_BEEF);
    assert_eq!(r.read_i32().unwrap(), -123456);
    assert_eq!(r.read_u64().unwrap(), 0x0123_4567_89AB_CDEF);
    assert_eq!(r.read_i64().unwrap(), -9_000_000_000);
    assert_eq!(r.read_f32().unwrap(), 3.5);
    assert_eq!(r.read_f64().unwrap(), 2.718281828);
    assert_eq!(r.read_timestamp().unwrap(), 1_700_000_000_000_000);
    assert_eq!(r.read_duration().unwrap(), 42_000_000);
    assert_eq!(r.read_uuid().unwrap(), [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16]);
    assert_eq!(r.read_varint().unwrap(), 300);
    assert_eq!(r.read_varsint().unwrap(), -300);
    assert_eq!(r.read_string().unwrap(), "hello frame");
    assert_eq!(r.read_bytes().unwrap(), &[9, 8, 7]);
    assert!(r.at_end());
}

#[test]
fn nested_containers_round_trip() {
    let mut w = Writer::new(1, Flags::NO_CRC);
    w.array_begin(Type::Map, 2).unwrap();
    for i in 0..2u32 {
        w.map_begin(Type::String, Type::U32, 1).unwrap();
        w.write_string("k").unwrap();
        w.write_u32(i).unwrap();
        w.map_end().unwrap();
    }
    w.array_end().unwrap();
    let frame = w.finish().unwrap().to_vec();

    let mut r = Reader::new(&frame).unwrap();
    r.validate().unwrap();
    let (elem_ty, count) = r.array_begin().unwrap();
    assert_eq!(elem_ty, Type::Map);
    assert_eq!(count, 2);
    for i in 0..2u32 {
        let (key_ty, val_ty, entry_count) = r.map_begin().unwrap();
        assert_eq!(key_ty, Type::String);
        assert_eq!(val_ty, Type::U32);
        assert_eq!(entry_count, 1);
        assert_eq!(r.read_string().unwrap(), "k");
        assert_eq!(r.read_u32().unwrap(), i);
        r.map_end().unwrap();
    }
    r.array_end().unwrap();
}

#[test]
fn borrowed_buffer_writer_produces_a_valid_frame() {
    let mut storage = [0u8; 64];
    {
        let mut w = Writer::init_buffer(&mut storage, 2, 0).unwrap();
        w.write_string("fits").unwrap();
        w.finish().unwrap();
    }

    let mut r = Reader::new(&storage).unwrap();
    r.validate().unwrap();
    assert_eq!(r.read_string().unwrap(), "fits");
}

#[test]
fn flipping_a_payload_byte_is_caught_by_crc() {
    let mut w = Writer::new(1, 0);
    w.write_string("tamper me").unwrap();
    let mut frame = w.finish().unwrap().to_vec();

    frame[dcf_codec::HEADER_SIZE + 2] ^= 0x01;

    let mut r = Reader::new(&frame).unwrap();
    assert!(matches!(r.validate(), Err(CodecError::CrcMismatch { .. })));
}

#[test]
fn no_crc_flag_frame_has_no_trailer_to_corrupt() {
    let mut w = Writer::new(1, Flags::NO_CRC);
    w.write_u8(1).unwrap();
    let frame = w.finish().unwrap().to_vec();
    assert_eq!(frame.len(), dcf_codec::HEADER_SIZE + 2);
}

#[test]
fn message_length_predicts_stream_framing() {
    let mut w = Writer::new(1, 0);
    w.write_string("predict me").unwrap();
    let frame = w.finish().unwrap().to_vec();

    let predicted = dcf_codec::message_length(&frame[..dcf_codec::HEADER_SIZE]).unwrap();
    assert_eq!(predicted, frame.len());
}

#[test]
fn truncated_frame_is_rejected_before_crc_check() {
    let mut w = Writer::new(1, 0);
    w.write_string("a longer payload than the truncation below").unwrap();
    let frame = w.finish().unwrap().to_vec();

    let truncated = &frame[..frame.len() - 5];
    let mut r = Reader::new(truncated).unwrap();
    assert!(matches!(r.validate(), Err(CodecError::Truncated { .. })));
}

#[test]
fn wrong_major_version_is_rejected() {
    let mut w = Writer::new(1, Flags::NO_CRC);
    w.write_u8(0).unwrap();
    let mut frame = w.finish().unwrap().to_vec();
    frame[4] = 0x06; // bump major version byte

    let mut r = Reader::new(&frame).unwrap();
    assert!(matches!(r.validate(), Err(CodecError::VersionMismatch { .. })));
}
