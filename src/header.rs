//! The 17-byte frame header and the constants that govern it.
//!
//! At 17 bytes this header isn't a multiple of any natural alignment, so
//! it's encoded and decoded by manual big-endian byte slicing rather than a
//! `#[repr(C)]` / `bytemuck::Pod` cast.

use crate::crc32;
use crate::error::CodecError;

/// Magic number identifying a frame: the ASCII bytes `"DCFS"`.
pub const MAGIC: u32 = 0x4443_4653;

/// Wire format version, major 0x05 / minor 0x20.
pub const VERSION: u16 = 0x0520;

/// Major version byte this codec implements and requires on decode.
pub const VERSION_MAJOR: u8 = 0x05;

/// Size in bytes of the fixed frame header.
pub const HEADER_SIZE: usize = 17;

/// Size in bytes of the optional CRC-32 trailer.
pub const CRC_SIZE: usize = 4;

/// Default cap on total message size (header + payload + trailer).
pub const MAX_MESSAGE: usize = 16 * 1024 * 1024;

/// Default cap on a `STRING` value's byte length.
pub const MAX_STRING: usize = 64 * 1024;

/// Default cap on an `ARRAY`/`MAP` element count or `BYTES` length.
pub const MAX_ARRAY: usize = 1024 * 1024;

/// Default cap on container nesting depth.
pub const MAX_DEPTH: usize = 32;

/// Starting capacity reserved for a newly constructed owned [`crate::Writer`].
pub const INITIAL_CAP: usize = 256;

/// Header flag bits.
#[allow(non_snake_case)]
pub mod Flags {
    /// Payload bytes are compressed (opaque to this crate; carried through).
    pub const COMPRESSED: u8 = 0x01;
    /// Payload bytes are encrypted (opaque to this crate; carried through).
    pub const ENCRYPTED: u8 = 0x02;
    /// Part of a multi-frame stream.
    pub const STREAMING: u8 = 0x04;
    /// Final frame of a multi-frame stream.
    pub const FINAL: u8 = 0x08;
    /// Out-of-band priority delivery hint.
    pub const PRIORITY: u8 = 0x10;
    /// No CRC-32 trailer follows the payload.
    pub const NO_CRC: u8 = 0x20;
    /// Reserved for a future extended-header variant.
    pub const EXTENDED: u8 = 0x80;
}

/// The fixed 17-byte frame header: magic, version, message type, flags,
/// payload length, and sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub magic: u32,
    pub version: u16,
    pub msg_type: u16,
    pub flags: u8,
    pub payload_len: u32,
    pub sequence: u32,
}

impl FrameHeader {
    /// Writes the header's wire representation into `out`.
    pub fn encode(&self, out: &mut [u8; HEADER_SIZE]) {
        out[0..4].copy_from_slice(&self.magic.to_be_bytes());
        out[4..6].copy_from_slice(&self.version.to_be_bytes());
        out[6..8].copy_from_slice(&self.msg_type.to_be_bytes());
        out[8] = self.flags;
        out[9..13].copy_from_slice(&self.payload_len.to_be_bytes());
        out[13..17].copy_from_slice(&self.sequence.to_be_bytes());
    }

    /// Parses a header from the front of `bytes`. Does not validate magic,
    /// version, or length against a buffer; see [`crate::Reader::validate`]
    /// for the full contract check.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() < HEADER_SIZE {
            return Err(CodecError::Truncated {
                expected: HEADER_SIZE,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            magic: u32::from_be_bytes(bytes[0..4].try_into().unwrap()),
            version: u16::from_be_bytes(bytes[4..6].try_into().unwrap()),
            msg_type: u16::from_be_bytes(bytes[6..8].try_into().unwrap()),
            flags: bytes[8],
            payload_len: u32::from_be_bytes(bytes[9..13].try_into().unwrap()),
            sequence: u32::from_be_bytes(bytes[13..17].try_into().unwrap()),
        })
    }

    /// Whether this header's flags call for a trailing CRC-32.
    pub fn has_crc(&self) -> bool {
        self.flags & Flags::NO_CRC == 0
    }

    /// The header's major version byte.
    pub fn major_version(&self) -> u8 {
        (self.version >> 8) as u8
    }
}

/// Computes the total on-wire length (header + payload + optional trailer)
/// of a message, given at least its header bytes.
///
/// Useful for stream framing: read `HEADER_SIZE` bytes, call this, then read
/// the rest of the message knowing exactly how many bytes to expect.
pub fn message_length(header_prefix: &[u8]) -> Result<usize, CodecError> {
    let header = FrameHeader::decode(header_prefix)?;
    let crc = if header.has_crc() { CRC_SIZE } else { 0 };
    Ok(HEADER_SIZE + header.payload_len as usize + crc)
}

/// Computes the CRC-32 trailer value for a complete header+payload buffer.
pub(crate) fn trailer_crc(header_and_payload: &[u8]) -> u32 {
    crc32::crc32(header_and_payload)
}
