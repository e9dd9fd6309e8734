//! Wire type tags for the self-describing payload grammar.

use std::fmt;

/// A single byte preceding every encoded value, naming its wire shape.
///
/// `Tuple`, `Optional`, `Enum`, and `Extension` are reserved tag values:
/// they round-trip through [`Type::from_tag`] so that readers can name them
/// in error messages, but no writer in this crate ever emits them, and
/// [`crate::Reader`] rejects them wherever a tag is expected.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Null = 0x00,
    Bool = 0x01,
    U8 = 0x02,
    I8 = 0x03,
    U16 = 0x04,
    I16 = 0x05,
    U32 = 0x06,
    I32 = 0x07,
    U64 = 0x08,
    I64 = 0x09,
    F32 = 0x0A,
    F64 = 0x0B,
    Varint = 0x10,
    String = 0x11,
    Bytes = 0x12,
    Uuid = 0x13,
    Array = 0x20,
    Map = 0x21,
    Struct = 0x22,
    Tuple = 0x23,
    Timestamp = 0x30,
    Duration = 0x31,
    Optional = 0x32,
    Enum = 0x33,
    Extension = 0xFE,
}

impl Type {
    /// Maps a raw wire byte to its [`Type`], or `None` if the byte names no
    /// defined tag at all.
    pub fn from_tag(tag: u8) -> Option<Type> {
        Some(match tag {
            0x00 => Type::Null,
            0x01 => Type::Bool,
            0x02 => Type::U8,
            0x03 => Type::I8,
            0x04 => Type::U16,
            0x05 => Type::I16,
            0x06 => Type::U32,
            0x07 => Type::I32,
            0x08 => Type::U64,
            0x09 => Type::I64,
            0x0A => Type::F32,
            0x0B => Type::F64,
            0x10 => Type::Varint,
            0x11 => Type::String,
            0x12 => Type::Bytes,
            0x13 => Type::Uuid,
            0x20 => Type::Array,
            0x21 => Type::Map,
            0x22 => Type::Struct,
            0x23 => Type::Tuple,
            0x30 => Type::Timestamp,
            0x31 => Type::Duration,
            0x32 => Type::Optional,
            0x33 => Type::Enum,
            0xFE => Type::Extension,
            _ => return None,
        })
    }

    /// True for tags that are defined but not yet allocated to a writable
    /// shape (`Tuple`, `Optional`, `Enum`, `Extension`).
    pub fn is_reserved(&self) -> bool {
        matches!(self, Type::Tuple | Type::Optional | Type::Enum | Type::Extension)
    }

    /// Byte width of a fixed-size value's body (tag excluded), or `None` for
    /// length-prefixed and container shapes.
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            Type::Null => Some(0),
            Type::Bool | Type::U8 | Type::I8 => Some(1),
            Type::U16 | Type::I16 => Some(2),
            Type::U32 | Type::I32 | Type::F32 => Some(4),
            Type::U64 | Type::I64 | Type::F64 | Type::Timestamp | Type::Duration => Some(8),
            Type::Uuid => Some(16),
            _ => None,
        }
    }

    /// Short lowercase name, used in error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Type::Null => "null",
            Type::Bool => "bool",
            Type::U8 => "u8",
            Type::I8 => "i8",
            Type::U16 => "u16",
            Type::I16 => "i16",
            Type::U32 => "u32",
            Type::I32 => "i32",
            Type::U64 => "u64",
            Type::I64 => "i64",
            Type::F32 => "f32",
            Type::F64 => "f64",
            Type::Varint => "varint",
            Type::String => "string",
            Type::Bytes => "bytes",
            Type::Uuid => "uuid",
            Type::Array => "array",
            Type::Map => "map",
            Type::Struct => "struct",
            Type::Tuple => "tuple",
            Type::Timestamp => "timestamp",
            Type::Duration => "duration",
            Type::Optional => "optional",
            Type::Enum => "enum",
            Type::Extension => "extension",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
