//! # dcf-codec
//!
//! A self-describing binary codec and framed wire format: a fixed 17-byte
//! big-endian header, a type-tagged payload grammar, and an optional
//! CRC-32 trailer.
//!
//! ## Layout
//!
//! A message on the wire is:
//!
//! ```text
//! +----------------+-------------------------+------------------+
//! | header (17 B)  | payload (tagged values)  | CRC-32 (4 B, opt)|
//! +----------------+-------------------------+------------------+
//! ```
//!
//! [`Writer`] builds a message: reserve the header, append typed values,
//! then [`Writer::finish`] backfills the payload length and trailer.
//! [`Reader`] does the reverse: [`Reader::validate`] checks magic, version,
//! declared length, and CRC, then typed `read_*` methods walk the payload.
//! [`Reader::skip`] consumes the next value without knowing its shape,
//! which is what lets [`schema::decode_struct`] tolerate unknown fields.
//!
//! ## Example
//!
//! ```rust
//! use dcf_codec::{Flags, Reader, Writer};
//!
//! let mut w = Writer::new(1, Flags::NO_CRC);
//! w.write_u32(42).unwrap();
//! w.write_string("hello").unwrap();
//! let frame = w.finish().unwrap().to_vec();
//!
//! let mut r = Reader::new(&frame).unwrap();
//! r.validate().unwrap();
//! assert_eq!(r.read_u32().unwrap(), 42);
//! assert_eq!(r.read_string().unwrap(), "hello");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

/// Host/network byte order primitives.
pub mod byteorder;

/// CRC-32/ISO-HDLC checksum.
pub mod crc32;

/// Diagnostic helpers for inspecting a message without fully decoding it.
pub mod diag;

/// Error types shared across the codec.
pub mod error;

/// The 17-byte frame header and its constants.
pub mod header;

/// Tunable caps on message and value sizes.
pub mod limits;

/// Zero-copy frame reader.
pub mod reader;

/// Schema-driven struct (de)serialization.
pub mod schema;

mod skip;

/// Wire type tags.
pub mod types;

/// LEB128 varints and zigzag encoding.
pub mod varint;

/// Frame-building writer.
pub mod writer;

pub use diag::validate_message;
pub use error::CodecError;
pub use header::{
    FrameHeader, Flags, CRC_SIZE, HEADER_SIZE, INITIAL_CAP, MAGIC, MAX_ARRAY, MAX_DEPTH,
    MAX_MESSAGE, MAX_STRING, VERSION, VERSION_MAJOR, message_length,
};
pub use limits::Limits;
pub use reader::Reader;
pub use schema::{decode_struct, encode_struct, field_flags, Schema, SchemaField, Value};
pub use types::Type;
pub use writer::Writer;

/// The crate version string.
pub const VERSION_STRING: &str = env!("CARGO_PKG_VERSION");

/// Returns the crate version string.
///
/// ```rust
/// let version = dcf_codec::version();
/// assert!(!version.is_empty());
/// ```
#[must_use]
pub fn version() -> &'static str {
    VERSION_STRING
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_not_empty() {
        assert!(!version().is_empty());
    }

    #[test]
    fn round_trips_a_struct_through_the_public_api() {
        let fields: &[SchemaField] = &[
            SchemaField { name: "id", field_id: 1, ty: Type::U32, flags: field_flags::REQUIRED, offset: 0, size: 4 },
        ];
        let schema = Schema { name: "ping", type_id: 1, fields, struct_size: 4 };

        let mut w = Writer::new(1, Flags::NO_CRC);
        encode_struct(&mut w, &schema, &[(1, Value::U32(5))]).unwrap();
        let frame = w.finish().unwrap().to_vec();

        let mut r = Reader::new(&frame).unwrap();
        r.validate().unwrap();
        let decoded = decode_struct(&mut r, &schema).unwrap();
        assert_eq!(decoded, vec![(1, Value::U32(5))]);
    }
}
