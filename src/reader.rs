//! Zero-copy frame reader: header validation against a buffer, typed value
//! readers, and container cursors that share one depth counter with
//! [`crate::skip`].

use log::warn;

use crate::byteorder;
use crate::error::CodecError;
use crate::header::{self, FrameHeader, CRC_SIZE, HEADER_SIZE, MAGIC, VERSION_MAJOR};
use crate::limits::Limits;
use crate::skip;
use crate::types::Type;
use crate::varint;

/// Reads one frame's worth of a buffer without copying string or byte
/// payloads: borrowed values carry the reader's own lifetime.
pub struct Reader<'a> {
    buf: &'a [u8],
    position: usize,
    payload_start: usize,
    payload_end: usize,
    depth: usize,
    header: Option<FrameHeader>,
    limits: Limits,
}

impl<'a> Reader<'a> {
    /// Creates a reader over `buf` with default limits. Call [`Reader::validate`]
    /// before reading any values.
    pub fn new(buf: &'a [u8]) -> Result<Self, CodecError> {
        Self::with_limits(buf, Limits::default())
    }

    /// Like [`Reader::new`], with custom [`Limits`].
    pub fn with_limits(buf: &'a [u8], limits: Limits) -> Result<Self, CodecError> {
        if buf.len() < HEADER_SIZE {
            return Err(CodecError::Truncated { expected: HEADER_SIZE, actual: buf.len() });
        }
        Ok(Self {
            buf,
            position: 0,
            payload_start: 0,
            payload_end: 0,
            depth: 0,
            header: None,
            limits,
        })
    }

    /// Validates the header (magic, version, declared length against the
    /// actual buffer, CRC-32 trailer) and positions the cursor at the start
    /// of the payload. Must be called before any typed read.
    pub fn validate(&mut self) -> Result<(), CodecError> {
        let header = FrameHeader::decode(self.buf)?;

        if header.magic != MAGIC {
            warn!("reader validate: invalid magic {:#010x}", header.magic);
            return Err(CodecError::InvalidMagic { expected: MAGIC, actual: header.magic });
        }
        let major = header.major_version();
        if major != VERSION_MAJOR {
            warn!("reader validate: version mismatch, got major {}", major);
            return Err(CodecError::VersionMismatch { expected: VERSION_MAJOR, actual: major });
        }

        let payload_len = header.payload_len as usize;
        let crc_len = if header.has_crc() { CRC_SIZE } else { 0 };
        let total_needed = HEADER_SIZE + payload_len + crc_len;

        if payload_len > self.limits.max_message || total_needed > self.limits.max_message {
            return Err(CodecError::TooLarge { limit: self.limits.max_message, actual: total_needed });
        }
        if self.buf.len() < total_needed {
            return Err(CodecError::Truncated { expected: total_needed, actual: self.buf.len() });
        }

        if header.has_crc() {
            let trailer_start = HEADER_SIZE + payload_len;
            let stored = u32::from_be_bytes(
                self.buf[trailer_start..trailer_start + CRC_SIZE].try_into().unwrap(),
            );
            let computed = header::trailer_crc(&self.buf[..trailer_start]);
            if stored != computed {
                warn!("reader validate: crc mismatch expected={:#010x} actual={:#010x}", stored, computed);
                return Err(CodecError::CrcMismatch { expected: stored, actual: computed });
            }
        }

        self.payload_start = HEADER_SIZE;
        self.payload_end = HEADER_SIZE + payload_len;
        self.position = HEADER_SIZE;
        self.header = Some(header);
        Ok(())
    }

    /// The validated frame header, if [`Reader::validate`] has succeeded.
    pub fn header(&self) -> Option<&FrameHeader> {
        self.header.as_ref()
    }

    /// Bytes left to read in the payload.
    pub fn remaining(&self) -> usize {
        self.payload_end.saturating_sub(self.position)
    }

    /// True once the cursor has reached the end of the payload.
    pub fn at_end(&self) -> bool {
        self.position >= self.payload_end
    }

    /// Looks at the next value's tag byte without consuming it.
    pub fn peek_type(&self) -> Option<u8> {
        if self.at_end() {
            None
        } else {
            Some(self.buf[self.position])
        }
    }

    pub(crate) fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if self.position + n > self.payload_end {
            return Err(CodecError::Truncated {
                expected: n,
                actual: self.payload_end.saturating_sub(self.position),
            });
        }
        let slice = &self.buf[self.position..self.position + n];
        self.position += n;
        Ok(slice)
    }

    pub(crate) fn read_tag(&mut self) -> Result<u8, CodecError> {
        Ok(self.take(1)?[0])
    }

    pub(crate) fn remaining_slice(&self) -> &'a [u8] {
        &self.buf[self.position..self.payload_end]
    }

    pub(crate) fn push_depth(&mut self) -> Result<(), CodecError> {
        if self.depth >= self.limits.max_depth {
            return Err(CodecError::DepthExceeded { limit: self.limits.max_depth });
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn pop_depth(&mut self) -> Result<(), CodecError> {
        if self.depth == 0 {
            return Err(CodecError::Malformed("unbalanced container nesting"));
        }
        self.depth -= 1;
        Ok(())
    }

    /// The configured cap on an `ARRAY`/`MAP` element count, shared with
    /// [`crate::skip`] so a declared count can't drive more skip iterations
    /// than a typed `array_begin`/`map_begin` would ever allow.
    pub(crate) fn max_array(&self) -> usize {
        self.limits.max_array
    }

    fn expect_type(&mut self, expected: Type) -> Result<(), CodecError> {
        let tag = self.read_tag()?;
        if tag == expected as u8 {
            return Ok(());
        }
        match Type::from_tag(tag) {
            Some(actual) => Err(CodecError::TypeMismatch { expected, actual }),
            None => Err(CodecError::InvalidType(tag)),
        }
    }

    /// Reads a `NULL` value.
    pub fn read_null(&mut self) -> Result<(), CodecError> {
        self.expect_type(Type::Null)
    }

    /// Reads a `BOOL` value.
    pub fn read_bool(&mut self) -> Result<bool, CodecError> {
        self.expect_type(Type::Bool)?;
        Ok(self.take(1)?[0] != 0)
    }

    /// Reads a `U8` value.
    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        self.expect_type(Type::U8)?;
        Ok(self.take(1)?[0])
    }

    /// Reads an `I8` value.
    pub fn read_i8(&mut self) -> Result<i8, CodecError> {
        self.expect_type(Type::I8)?;
        Ok(self.take(1)?[0] as i8)
    }

    /// Reads a `U16` value.
    pub fn read_u16(&mut self) -> Result<u16, CodecError> {
        self.expect_type(Type::U16)?;
        let bytes = self.take(2)?;
        Ok(byteorder::ntoh16(u16::from_ne_bytes(bytes.try_into().unwrap())))
    }

    /// Reads an `I16` value.
    pub fn read_i16(&mut self) -> Result<i16, CodecError> {
        self.expect_type(Type::I16)?;
        let bytes = self.take(2)?;
        Ok(byteorder::ntoh16(u16::from_ne_bytes(bytes.try_into().unwrap())) as i16)
    }

    /// Reads a `U32` value.
    pub fn read_u32(&mut self) -> Result<u32, CodecError> {
        self.expect_type(Type::U32)?;
        let bytes = self.take(4)?;
        Ok(byteorder::ntoh32(u32::from_ne_bytes(bytes.try_into().unwrap())))
    }

    /// Reads an `I32` value.
    pub fn read_i32(&mut self) -> Result<i32, CodecError> {
        self.expect_type(Type::I32)?;
        let bytes = self.take(4)?;
        Ok(byteorder::ntoh32(u32::from_ne_bytes(bytes.try_into().unwrap())) as i32)
    }

    /// Reads a `U64` value.
    pub fn read_u64(&mut self) -> Result<u64, CodecError> {
        self.expect_type(Type::U64)?;
        let bytes = self.take(8)?;
        Ok(byteorder::ntoh64(u64::from_ne_bytes(bytes.try_into().unwrap())))
    }

    /// Reads an `I64` value.
    pub fn read_i64(&mut self) -> Result<i64, CodecError> {
        self.expect_type(Type::I64)?;
        let bytes = self.take(8)?;
        Ok(byteorder::ntoh64(u64::from_ne_bytes(bytes.try_into().unwrap())) as i64)
    }

    /// Reads an `F32` value.
    pub fn read_f32(&mut self) -> Result<f32, CodecError> {
        self.expect_type(Type::F32)?;
        let bytes = self.take(4)?;
        let net = u32::from_ne_bytes(bytes.try_into().unwrap());
        Ok(f32::from_bits(byteorder::ntoh32(net)))
    }

    /// Reads an `F64` value.
    pub fn read_f64(&mut self) -> Result<f64, CodecError> {
        self.expect_type(Type::F64)?;
        let bytes = self.take(8)?;
        let net = u64::from_ne_bytes(bytes.try_into().unwrap());
        Ok(f64::from_bits(byteorder::ntoh64(net)))
    }

    /// Reads a `TIMESTAMP` value (microseconds since the Unix epoch).
    pub fn read_timestamp(&mut self) -> Result<u64, CodecError> {
        self.expect_type(Type::Timestamp)?;
        let bytes = self.take(8)?;
        Ok(byteorder::ntoh64(u64::from_ne_bytes(bytes.try_into().unwrap())))
    }

    /// Reads a `DURATION` value (nanoseconds).
    pub fn read_duration(&mut self) -> Result<u64, CodecError> {
        self.expect_type(Type::Duration)?;
        let bytes = self.take(8)?;
        Ok(byteorder::ntoh64(u64::from_ne_bytes(bytes.try_into().unwrap())))
    }

    /// Reads a `UUID` value.
    pub fn read_uuid(&mut self) -> Result<[u8; 16], CodecError> {
        self.expect_type(Type::Uuid)?;
        let bytes = self.take(16)?;
        let mut out = [0u8; 16];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Reads an unsigned `VARINT` value.
    pub fn read_varint(&mut self) -> Result<u64, CodecError> {
        self.expect_type(Type::Varint)?;
        let (val, consumed) = varint::decode_varint(self.remaining_slice())?;
        self.position += consumed;
        Ok(val)
    }

    /// Reads a `VARINT` and zigzag-decodes it into a signed value. There is
    /// no separate signed-varint tag on the wire.
    pub fn read_varsint(&mut self) -> Result<i64, CodecError> {
        let u = self.read_varint()?;
        Ok(varint::zigzag_decode(u))
    }

    fn read_length_prefixed(&mut self, ty: Type, limit: usize) -> Result<&'a [u8], CodecError> {
        self.expect_type(ty)?;
        let len_bytes = self.take(4)?;
        let len = u32::from_be_bytes(len_bytes.try_into().unwrap()) as usize;
        if len > limit {
            return Err(CodecError::TooLarge { limit, actual: len });
        }
        self.take(len)
    }

    /// Reads a `STRING` value as a borrowed `&str`.
    ///
    /// The wire format only promises `STRING` bytes are UTF-8 "by contract,"
    /// without the decoder itself validating it. A Rust `&str` can't carry
    /// that looseness safely, so this does validate, surfacing invalid
    /// UTF-8 as [`CodecError::Malformed`] rather than exposing the raw bytes
    /// as text. Use [`Reader::read_bytes`] if you need the unvalidated bytes.
    pub fn read_string(&mut self) -> Result<&'a str, CodecError> {
        let bytes = self.read_length_prefixed(Type::String, self.limits.max_string)?;
        std::str::from_utf8(bytes).map_err(|_| CodecError::Malformed("STRING value is not valid UTF-8"))
    }

    /// Reads a `BYTES` value as a borrowed slice.
    pub fn read_bytes(&mut self) -> Result<&'a [u8], CodecError> {
        self.read_length_prefixed(Type::Bytes, self.limits.max_array)
    }

    /// Reads a `STRING` value, copying it into `out`. Returns the number of
    /// bytes written, or [`CodecError::CopyOverflow`] if `out` is too small.
    pub fn read_string_copy(&mut self, out: &mut [u8]) -> Result<usize, CodecError> {
        let bytes = self.read_string()?.as_bytes();
        if bytes.len() > out.len() {
            return Err(CodecError::CopyOverflow { needed: bytes.len(), available: out.len() });
        }
        out[..bytes.len()].copy_from_slice(bytes);
        Ok(bytes.len())
    }

    /// Reads a `BYTES` value, copying it into `out`. Returns the number of
    /// bytes written, or [`CodecError::CopyOverflow`] if `out` is too small.
    pub fn read_bytes_copy(&mut self, out: &mut [u8]) -> Result<usize, CodecError> {
        let data = self.read_bytes()?;
        if data.len() > out.len() {
            return Err(CodecError::CopyOverflow { needed: data.len(), available: out.len() });
        }
        out[..data.len()].copy_from_slice(data);
        Ok(data.len())
    }

    /// Reads `len` raw bytes without expecting a tag.
    pub fn read_raw(&mut self, len: usize) -> Result<&'a [u8], CodecError> {
        self.take(len)
    }

    /// Begins reading an `ARRAY`, returning its declared element type and
    /// count. Each element still carries its own tag.
    pub fn array_begin(&mut self) -> Result<(Type, u32), CodecError> {
        self.expect_type(Type::Array)?;
        let elem_tag = self.read_tag()?;
        let elem_type = Type::from_tag(elem_tag).ok_or(CodecError::InvalidType(elem_tag))?;
        let count_bytes = self.take(4)?;
        let count = u32::from_be_bytes(count_bytes.try_into().unwrap());
        if count as usize > self.limits.max_array {
            return Err(CodecError::TooLarge { limit: self.limits.max_array, actual: count as usize });
        }
        self.push_depth()?;
        Ok((elem_type, count))
    }

    /// Closes the most recently opened array.
    pub fn array_end(&mut self) -> Result<(), CodecError> {
        self.pop_depth()
    }

    /// Begins reading a `MAP`, returning its declared key/value types and
    /// entry count.
    pub fn map_begin(&mut self) -> Result<(Type, Type, u32), CodecError> {
        self.expect_type(Type::Map)?;
        let key_tag = self.read_tag()?;
        let val_tag = self.read_tag()?;
        let key_type = Type::from_tag(key_tag).ok_or(CodecError::InvalidType(key_tag))?;
        let val_type = Type::from_tag(val_tag).ok_or(CodecError::InvalidType(val_tag))?;
        let count_bytes = self.take(4)?;
        let count = u32::from_be_bytes(count_bytes.try_into().unwrap());
        if count as usize > self.limits.max_array {
            return Err(CodecError::TooLarge { limit: self.limits.max_array, actual: count as usize });
        }
        self.push_depth()?;
        Ok((key_type, val_type, count))
    }

    /// Closes the most recently opened map.
    pub fn map_end(&mut self) -> Result<(), CodecError> {
        self.pop_depth()
    }

    /// Begins reading a `STRUCT`, returning its `type_id`.
    pub fn struct_begin(&mut self) -> Result<u16, CodecError> {
        self.expect_type(Type::Struct)?;
        let bytes = self.take(2)?;
        self.push_depth()?;
        Ok(u16::from_be_bytes(bytes.try_into().unwrap()))
    }

    /// Reads the next field header, or `None` at the `(0, NULL)`
    /// end-of-fields sentinel.
    pub fn read_field(&mut self) -> Result<Option<(u16, Type)>, CodecError> {
        let id_bytes = self.take(2)?;
        let field_id = u16::from_be_bytes(id_bytes.try_into().unwrap());
        let ty_tag = self.read_tag()?;
        if field_id == 0 && ty_tag == Type::Null as u8 {
            return Ok(None);
        }
        let ty = Type::from_tag(ty_tag).ok_or(CodecError::InvalidType(ty_tag))?;
        Ok(Some((field_id, ty)))
    }

    /// Closes the most recently opened struct.
    pub fn struct_end(&mut self) -> Result<(), CodecError> {
        self.pop_depth()
    }

    /// Skips the next value, regardless of its type, recursing into nested
    /// containers. Lets callers tolerate wire fields or elements their own
    /// schema doesn't know about.
    pub fn skip(&mut self) -> Result<(), CodecError> {
        skip::skip_value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::Flags;
    use crate::writer::Writer;

    #[test]
    fn round_trips_a_simple_frame() {
        let mut w = Writer::new(3, 0);
        w.write_u32(0xDEAD_BEEF).unwrap();
        w.write_string("hi").unwrap();
        let frame = w.finish().unwrap().to_vec();

        let mut r = Reader::new(&frame).unwrap();
        r.validate().unwrap();
        assert_eq!(r.header().unwrap().msg_type, 3);
        assert_eq!(r.read_u32().unwrap(), 0xDEAD_BEEF);
        assert_eq!(r.read_string().unwrap(), "hi");
        assert!(r.at_end());
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = vec![0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(b"XXXX");
        let mut r = Reader::new(&bytes).unwrap();
        assert!(matches!(r.validate(), Err(CodecError::InvalidMagic { .. })));
    }

    #[test]
    fn detects_corrupted_payload_via_crc() {
        let mut w = Writer::new(1, 0);
        w.write_u8(5).unwrap();
        let mut frame = w.finish().unwrap().to_vec();
        let last = frame.len() - 1;
        frame[HEADER_SIZE] ^= 0xFF;
        let _ = last;

        let mut r = Reader::new(&frame).unwrap();
        assert!(matches!(r.validate(), Err(CodecError::CrcMismatch { .. })));
    }

    #[test]
    fn type_mismatch_reports_actual_type() {
        let mut w = Writer::new(1, Flags::NO_CRC);
        w.write_u8(5).unwrap();
        let frame = w.finish().unwrap().to_vec();

        let mut r = Reader::new(&frame).unwrap();
        r.validate().unwrap();
        let err = r.read_string().unwrap_err();
        assert!(matches!(err, CodecError::TypeMismatch { expected: Type::String, actual: Type::U8 }));
    }

    #[test]
    fn unknown_field_can_be_skipped() {
        let mut w = Writer::new(1, Flags::NO_CRC);
        w.struct_begin(7).unwrap();
        w.write_field(1, Type::U32).unwrap();
        w.write_u32(1).unwrap();
        w.write_field(2, Type::String).unwrap();
        w.write_string("ignored").unwrap();
        w.struct_end().unwrap();
        let frame = w.finish().unwrap().to_vec();

        let mut r = Reader::new(&frame).unwrap();
        r.validate().unwrap();
        let type_id = r.struct_begin().unwrap();
        assert_eq!(type_id, 7);
        let mut seen_field_one = false;
        while let Some((field_id, ty)) = r.read_field().unwrap() {
            if field_id == 1 {
                assert_eq!(ty, Type::U32);
                assert_eq!(r.read_u32().unwrap(), 1);
                seen_field_one = true;
            } else {
                r.skip().unwrap();
            }
        }
        r.struct_end().unwrap();
        assert!(seen_field_one);
        assert!(r.at_end());
    }

    #[test]
    fn array_elements_carry_their_own_tags() {
        let mut w = Writer::new(1, Flags::NO_CRC);
        w.array_begin(Type::U8, 2).unwrap();
        w.write_u8(1).unwrap();
        w.write_u8(2).unwrap();
        w.array_end().unwrap();
        let frame = w.finish().unwrap().to_vec();

        let mut r = Reader::new(&frame).unwrap();
        r.validate().unwrap();
        let (elem_type, count) = r.array_begin().unwrap();
        assert_eq!(elem_type, Type::U8);
        assert_eq!(count, 2);
        assert_eq!(r.read_u8().unwrap(), 1);
        assert_eq!(r.read_u8().unwrap(), 2);
        r.array_end().unwrap();
    }

    #[test]
    fn copy_overflow_reports_required_length() {
        let mut w = Writer::new(1, Flags::NO_CRC);
        w.write_string("hello world").unwrap();
        let frame = w.finish().unwrap().to_vec();

        let mut r = Reader::new(&frame).unwrap();
        r.validate().unwrap();
        let mut small = [0u8; 3];
        let err = r.read_string_copy(&mut small).unwrap_err();
        assert!(matches!(err, CodecError::CopyOverflow { needed: 11, available: 3 }));
    }
}
