//! Error types shared across the codec.

use thiserror::Error;

use crate::types::Type;

/// Everything that can go wrong encoding or decoding a frame.
///
/// There is no `NullPtr`-style variant here: Rust's ownership model makes
/// that class of error unrepresentable in the first place.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A borrowed buffer has no room left for the requested write.
    #[error("buffer full: requested {requested} bytes, {available} available")]
    BufferFull { requested: usize, available: usize },

    /// Growing an owned buffer's backing storage failed.
    #[error("allocation failed while growing to {requested} bytes")]
    AllocFail { requested: usize },

    /// A value, container count, or whole message exceeded a configured limit.
    #[error("size {actual} exceeds limit of {limit}")]
    TooLarge { limit: usize, actual: usize },

    /// Container nesting went past the configured maximum depth.
    #[error("nesting depth exceeded: limit is {limit}")]
    DepthExceeded { limit: usize },

    /// The frame header's magic number didn't match.
    #[error("invalid magic number: expected {expected:#010x}, got {actual:#010x}")]
    InvalidMagic { expected: u32, actual: u32 },

    /// The frame header's major version isn't one this codec understands.
    #[error("version mismatch: expected major {expected}, got {actual}")]
    VersionMismatch { expected: u8, actual: u8 },

    /// Fewer bytes were available than the format requires at this point.
    #[error("truncated: expected at least {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    /// The trailer CRC didn't match the recomputed checksum.
    #[error("CRC mismatch: expected {expected:#010x}, got {actual:#010x}")]
    CrcMismatch { expected: u32, actual: u32 },

    /// A tag byte doesn't name any defined [`Type`].
    #[error("invalid type tag: {0:#04x}")]
    InvalidType(u8),

    /// A varint's encoding implies a value wider than 64 bits.
    #[error("varint overflow: value exceeds 64 bits")]
    Overflow,

    /// A `_copy` read's destination buffer was smaller than the value.
    #[error("copy buffer too small: need {needed} bytes, have {available}")]
    CopyOverflow { needed: usize, available: usize },

    /// A structural rule was violated (unbalanced container begin/end, etc).
    #[error("malformed structure: {0}")]
    Malformed(&'static str),

    /// An argument passed to an encoding call was invalid on its own terms,
    /// independent of what's already on the wire.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// A value's tag didn't match what the caller (or a schema) expected.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: Type, actual: Type },

    /// A struct's wire `type_id` didn't match the schema being decoded against.
    #[error("struct type id mismatch: expected {expected}, got {actual}")]
    StructTypeMismatch { expected: u16, actual: u16 },
}
