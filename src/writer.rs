//! Frame-building writer: header reservation, typed value appenders, and
//! two-pass finish that backfills the payload length and trailer CRC.

use log::debug;

use crate::byteorder;
use crate::error::CodecError;
use crate::header::{self, FrameHeader, CRC_SIZE, HEADER_SIZE, MAGIC, VERSION};
use crate::limits::Limits;
use crate::types::Type;
use crate::varint;

enum Buffer<'a> {
    Owned(Vec<u8>),
    Borrowed(&'a mut [u8]),
}

/// Builds one frame at a time: reserve header bytes, append typed values,
/// then [`Writer::finish`] backfills the header and appends the trailer.
///
/// Either owns its backing storage (growing up to [`Limits::max_message`])
/// or borrows a caller-supplied buffer that it will never grow past.
pub struct Writer<'a> {
    buffer: Buffer<'a>,
    position: usize,
    depth: usize,
    msg_type: u16,
    flags: u8,
    sequence: u32,
    limits: Limits,
}

impl<'a> Writer<'a> {
    /// Creates a writer with its own growable buffer and default limits.
    pub fn new(msg_type: u16, flags: u8) -> Self {
        Self::with_limits(msg_type, flags, Limits::default())
    }

    /// Like [`Writer::new`], with custom [`Limits`].
    pub fn with_limits(msg_type: u16, flags: u8, limits: Limits) -> Self {
        let mut buf = Vec::with_capacity(crate::header::INITIAL_CAP);
        buf.resize(HEADER_SIZE, 0);
        Self {
            buffer: Buffer::Owned(buf),
            position: HEADER_SIZE,
            depth: 0,
            msg_type,
            flags,
            sequence: 0,
            limits,
        }
    }

    /// Creates a writer over a caller-supplied buffer. The writer never
    /// grows `buf`; running out of room yields [`CodecError::BufferFull`].
    pub fn init_buffer(buf: &'a mut [u8], msg_type: u16, flags: u8) -> Result<Self, CodecError> {
        Self::init_buffer_with_limits(buf, msg_type, flags, Limits::default())
    }

    /// Like [`Writer::init_buffer`], with custom [`Limits`].
    pub fn init_buffer_with_limits(
        buf: &'a mut [u8],
        msg_type: u16,
        flags: u8,
        limits: Limits,
    ) -> Result<Self, CodecError> {
        if buf.len() < HEADER_SIZE {
            return Err(CodecError::BufferFull {
                requested: HEADER_SIZE,
                available: buf.len(),
            });
        }
        Ok(Self {
            buffer: Buffer::Borrowed(buf),
            position: HEADER_SIZE,
            depth: 0,
            msg_type,
            flags,
            sequence: 0,
            limits,
        })
    }

    /// Rewinds the writer to an empty payload, reusing its storage for a new
    /// frame with a (possibly different) message type and flags.
    pub fn reset(&mut self, msg_type: u16, flags: u8) {
        self.position = HEADER_SIZE;
        self.depth = 0;
        self.msg_type = msg_type;
        self.flags = flags;
        self.sequence = 0;
        if let Buffer::Owned(buf) = &mut self.buffer {
            buf.truncate(HEADER_SIZE);
        }
    }

    /// Sets the header's sequence number for the next [`Writer::finish`].
    pub fn set_sequence(&mut self, sequence: u32) {
        self.sequence = sequence;
    }

    /// Bytes written to the payload so far (header and trailer excluded).
    pub fn payload_size(&self) -> usize {
        self.position - HEADER_SIZE
    }

    fn ensure_capacity(&mut self, additional: usize) -> Result<(), CodecError> {
        match &mut self.buffer {
            Buffer::Owned(buf) => {
                let needed_total = self.position + additional;
                if needed_total > self.limits.max_message {
                    return Err(CodecError::TooLarge {
                        limit: self.limits.max_message,
                        actual: needed_total,
                    });
                }
                if buf.len() < needed_total {
                    buf.try_reserve(needed_total - buf.len())
                        .map_err(|_| CodecError::AllocFail { requested: needed_total })?;
                    buf.resize(needed_total, 0);
                }
                Ok(())
            }
            Buffer::Borrowed(buf) => {
                if self.position + additional > buf.len() {
                    return Err(CodecError::BufferFull {
                        requested: additional,
                        available: buf.len() - self.position,
                    });
                }
                Ok(())
            }
        }
    }

    fn raw_write(&mut self, bytes: &[u8]) {
        match &mut self.buffer {
            Buffer::Owned(buf) => buf[self.position..self.position + bytes.len()].copy_from_slice(bytes),
            Buffer::Borrowed(buf) => buf[self.position..self.position + bytes.len()].copy_from_slice(bytes),
        }
        self.position += bytes.len();
    }

    /// Appends raw, untagged bytes. Used internally by the framing logic;
    /// exposed for callers embedding an already-encoded sub-message.
    pub fn write_raw(&mut self, bytes: &[u8]) -> Result<(), CodecError> {
        self.ensure_capacity(bytes.len())?;
        self.raw_write(bytes);
        Ok(())
    }

    /// Reserves `len` bytes at the current position and returns them as a
    /// writable slice, for callers that want to fill bytes in place.
    pub fn reserve(&mut self, len: usize) -> Result<&mut [u8], CodecError> {
        self.ensure_capacity(len)?;
        let start = self.position;
        self.position += len;
        Ok(match &mut self.buffer {
            Buffer::Owned(buf) => &mut buf[start..start + len],
            Buffer::Borrowed(buf) => &mut buf[start..start + len],
        })
    }

    fn write_tagged(&mut self, ty: Type, body: &[u8]) -> Result<(), CodecError> {
        self.ensure_capacity(1 + body.len())?;
        self.raw_write(&[ty as u8]);
        self.raw_write(body);
        Ok(())
    }

    /// Writes a `NULL` value.
    pub fn write_null(&mut self) -> Result<(), CodecError> {
        self.write_tagged(Type::Null, &[])
    }

    /// Writes a `BOOL` value.
    pub fn write_bool(&mut self, val: bool) -> Result<(), CodecError> {
        self.write_tagged(Type::Bool, &[val as u8])
    }

    /// Writes a `U8` value.
    pub fn write_u8(&mut self, val: u8) -> Result<(), CodecError> {
        self.write_tagged(Type::U8, &[val])
    }

    /// Writes an `I8` value.
    pub fn write_i8(&mut self, val: i8) -> Result<(), CodecError> {
        self.write_tagged(Type::I8, &[val as u8])
    }

    /// Writes a `U16` value.
    pub fn write_u16(&mut self, val: u16) -> Result<(), CodecError> {
        self.write_tagged(Type::U16, &byteorder::hton16(val).to_ne_bytes())
    }

    /// Writes an `I16` value.
    pub fn write_i16(&mut self, val: i16) -> Result<(), CodecError> {
        self.write_tagged(Type::I16, &byteorder::hton16(val as u16).to_ne_bytes())
    }

    /// Writes a `U32` value.
    pub fn write_u32(&mut self, val: u32) -> Result<(), CodecError> {
        self.write_tagged(Type::U32, &byteorder::hton32(val).to_ne_bytes())
    }

    /// Writes an `I32` value.
    pub fn write_i32(&mut self, val: i32) -> Result<(), CodecError> {
        self.write_tagged(Type::I32, &byteorder::hton32(val as u32).to_ne_bytes())
    }

    /// Writes a `U64` value.
    pub fn write_u64(&mut self, val: u64) -> Result<(), CodecError> {
        self.write_tagged(Type::U64, &byteorder::hton64(val).to_ne_bytes())
    }

    /// Writes an `I64` value.
    pub fn write_i64(&mut self, val: i64) -> Result<(), CodecError> {
        self.write_tagged(Type::I64, &byteorder::hton64(val as u64).to_ne_bytes())
    }

    /// Writes an `F32` value.
    pub fn write_f32(&mut self, val: f32) -> Result<(), CodecError> {
        self.write_tagged(Type::F32, &byteorder::hton32(val.to_bits()).to_ne_bytes())
    }

    /// Writes an `F64` value.
    pub fn write_f64(&mut self, val: f64) -> Result<(), CodecError> {
        self.write_tagged(Type::F64, &byteorder::hton64(val.to_bits()).to_ne_bytes())
    }

    /// Writes a `TIMESTAMP` value (microseconds since the Unix epoch).
    pub fn write_timestamp(&mut self, micros_since_epoch: u64) -> Result<(), CodecError> {
        self.write_tagged(Type::Timestamp, &byteorder::hton64(micros_since_epoch).to_ne_bytes())
    }

    /// Writes a `DURATION` value (nanoseconds).
    pub fn write_duration(&mut self, nanos: u64) -> Result<(), CodecError> {
        self.write_tagged(Type::Duration, &byteorder::hton64(nanos).to_ne_bytes())
    }

    /// Writes a `UUID` value.
    pub fn write_uuid(&mut self, uuid: &[u8; 16]) -> Result<(), CodecError> {
        self.write_tagged(Type::Uuid, uuid)
    }

    /// Writes an unsigned `VARINT` value.
    pub fn write_varint(&mut self, val: u64) -> Result<(), CodecError> {
        let mut buf = [0u8; 10];
        let len = varint::encode_varint_into(val, &mut buf);
        self.write_tagged(Type::Varint, &buf[..len])
    }

    /// Writes a signed value, zigzag-encoded onto the wire as a `VARINT`
    /// (there is no separate signed-varint tag).
    pub fn write_varsint(&mut self, val: i64) -> Result<(), CodecError> {
        self.write_varint(varint::zigzag_encode(val))
    }

    fn write_length_prefixed(&mut self, ty: Type, data: &[u8], limit: usize) -> Result<(), CodecError> {
        if data.len() > limit {
            return Err(CodecError::TooLarge { limit, actual: data.len() });
        }
        self.ensure_capacity(1 + 4 + data.len())?;
        self.raw_write(&[ty as u8]);
        self.raw_write(&(data.len() as u32).to_be_bytes());
        self.raw_write(data);
        Ok(())
    }

    /// Writes a `STRING` value.
    pub fn write_string(&mut self, s: &str) -> Result<(), CodecError> {
        self.write_length_prefixed(Type::String, s.as_bytes(), self.limits.max_string)
    }

    /// Writes a `BYTES` value.
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<(), CodecError> {
        self.write_length_prefixed(Type::Bytes, data, self.limits.max_array)
    }

    /// Begins an `ARRAY` of `count` elements of declared type `elem_type`.
    /// Each element still carries its own tag when written; the declared
    /// type is informational for readers that want to check consistency.
    pub fn array_begin(&mut self, elem_type: Type, count: u32) -> Result<(), CodecError> {
        if count as usize > self.limits.max_array {
            return Err(CodecError::TooLarge { limit: self.limits.max_array, actual: count as usize });
        }
        if self.depth >= self.limits.max_depth {
            return Err(CodecError::DepthExceeded { limit: self.limits.max_depth });
        }
        self.ensure_capacity(1 + 1 + 4)?;
        self.raw_write(&[Type::Array as u8, elem_type as u8]);
        self.raw_write(&count.to_be_bytes());
        self.depth += 1;
        Ok(())
    }

    /// Closes the most recently opened array.
    pub fn array_end(&mut self) -> Result<(), CodecError> {
        if self.depth == 0 {
            return Err(CodecError::Malformed("array_end without matching array_begin"));
        }
        self.depth -= 1;
        Ok(())
    }

    /// Begins a `MAP` of `count` entries with declared key/value types.
    pub fn map_begin(&mut self, key_type: Type, value_type: Type, count: u32) -> Result<(), CodecError> {
        if count as usize > self.limits.max_array {
            return Err(CodecError::TooLarge { limit: self.limits.max_array, actual: count as usize });
        }
        if self.depth >= self.limits.max_depth {
            return Err(CodecError::DepthExceeded { limit: self.limits.max_depth });
        }
        self.ensure_capacity(1 + 2 + 4)?;
        self.raw_write(&[Type::Map as u8, key_type as u8, value_type as u8]);
        self.raw_write(&count.to_be_bytes());
        self.depth += 1;
        Ok(())
    }

    /// Closes the most recently opened map.
    pub fn map_end(&mut self) -> Result<(), CodecError> {
        if self.depth == 0 {
            return Err(CodecError::Malformed("map_end without matching map_begin"));
        }
        self.depth -= 1;
        Ok(())
    }

    /// Begins a `STRUCT` identified by `type_id`. Fields are written with
    /// [`Writer::write_field`] in declaration order, then the struct is
    /// closed with [`Writer::struct_end`].
    pub fn struct_begin(&mut self, type_id: u16) -> Result<(), CodecError> {
        if self.depth >= self.limits.max_depth {
            return Err(CodecError::DepthExceeded { limit: self.limits.max_depth });
        }
        self.write_tagged(Type::Struct, &type_id.to_be_bytes())?;
        self.depth += 1;
        Ok(())
    }

    /// Writes a field header (`field_id` + type tag); the field's value must
    /// follow as the next write.
    pub fn write_field(&mut self, field_id: u16, ty: Type) -> Result<(), CodecError> {
        self.ensure_capacity(2 + 1)?;
        self.raw_write(&field_id.to_be_bytes());
        self.raw_write(&[ty as u8]);
        Ok(())
    }

    /// Closes the most recently opened struct, emitting the `(0, NULL)`
    /// end-of-fields sentinel.
    pub fn struct_end(&mut self) -> Result<(), CodecError> {
        if self.depth == 0 {
            return Err(CodecError::Malformed("struct_end without matching struct_begin"));
        }
        self.ensure_capacity(2 + 1)?;
        self.raw_write(&0u16.to_be_bytes());
        self.raw_write(&[Type::Null as u8]);
        self.depth -= 1;
        Ok(())
    }

    /// Finalizes the frame: backfills the header's payload length, then
    /// appends the CRC-32 trailer unless [`Flags::NO_CRC`] is set. Returns
    /// the complete frame's bytes.
    pub fn finish(&mut self) -> Result<&[u8], CodecError> {
        if self.depth != 0 {
            return Err(CodecError::Malformed("finish called with unclosed container"));
        }

        let header = FrameHeader {
            magic: MAGIC,
            version: VERSION,
            msg_type: self.msg_type,
            flags: self.flags,
            payload_len: self.payload_size() as u32,
            sequence: self.sequence,
        };
        let mut header_bytes = [0u8; HEADER_SIZE];
        header.encode(&mut header_bytes);

        match &mut self.buffer {
            Buffer::Owned(buf) => buf[..HEADER_SIZE].copy_from_slice(&header_bytes),
            Buffer::Borrowed(buf) => buf[..HEADER_SIZE].copy_from_slice(&header_bytes),
        }

        if header.has_crc() {
            self.ensure_capacity(CRC_SIZE)?;
            let crc = match &self.buffer {
                Buffer::Owned(buf) => header::trailer_crc(&buf[..self.position]),
                Buffer::Borrowed(buf) => header::trailer_crc(&buf[..self.position]),
            };
            debug!("writer finish: payload_len={} crc={:#010x}", header.payload_len, crc);
            self.raw_write(&crc.to_be_bytes());
        } else {
            debug!("writer finish: payload_len={} (no crc)", header.payload_len);
        }

        Ok(match &self.buffer {
            Buffer::Owned(buf) => &buf[..self.position],
            Buffer::Borrowed(buf) => &buf[..self.position],
        })
    }
}
