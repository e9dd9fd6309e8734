//! Schema-driven struct (de)serialization.
//!
//! A [`Schema`] names a struct's fields in declaration order; [`encode_struct`]
//! writes them in that order, and [`decode_struct`] tolerates wire fields in
//! any order, skipping ones the schema doesn't know about.
//!
//! A raw-pointer implementation would reflect fields by `(offset, size)`
//! into a memory record, but that's not something Rust can do safely
//! without an `unsafe` pointer cast. [`SchemaField`] still carries
//! `offset`/`size` for callers that want them for reflection or debugging,
//! but encode/decode here work over a safe [`Value`] instead.

use crate::error::CodecError;
use crate::reader::Reader;
use crate::types::Type;
use crate::writer::Writer;

/// Per-field bit flags, set in [`SchemaField::flags`].
#[allow(non_snake_case)]
pub mod field_flags {
    pub const REQUIRED: u16 = 0x0001;
    pub const OPTIONAL: u16 = 0x0002;
    pub const REPEATED: u16 = 0x0004;
    pub const PACKED: u16 = 0x0008;
}

/// Describes one field of a [`Schema`].
#[derive(Debug, Clone, Copy)]
pub struct SchemaField {
    pub name: &'static str,
    pub field_id: u16,
    pub ty: Type,
    pub flags: u16,
    /// Byte offset of the field within a native record layout. Not used by
    /// [`encode_struct`]/[`decode_struct`]; kept for reflection parity.
    pub offset: usize,
    /// Byte size of the field within a native record layout. Same caveat as
    /// `offset`.
    pub size: usize,
}

/// Describes a struct's wire shape: its `type_id` and fields in declaration
/// order.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub name: &'static str,
    pub type_id: u16,
    pub fields: &'static [SchemaField],
    /// Byte size of the native record layout this schema reflects. Same
    /// caveat as `SchemaField::offset`/`size`: not used by
    /// [`encode_struct`]/[`decode_struct`], kept for reflection parity.
    pub struct_size: usize,
}

/// A self-describing value, used as the record representation for
/// schema-driven encode/decode and for generic (schema-less) decoding of
/// array/map elements and nested structs.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    F32(f32),
    F64(f64),
    Varint(u64),
    VarSInt(i64),
    String(String),
    Bytes(Vec<u8>),
    Uuid([u8; 16]),
    Timestamp(u64),
    Duration(u64),
    Array(Type, Vec<Value>),
    Map(Type, Type, Vec<(Value, Value)>),
    Struct(u16, Vec<(u16, Value)>),
}

impl Value {
    /// The wire [`Type`] this value would be written as.
    pub fn ty(&self) -> Type {
        match self {
            Value::Null => Type::Null,
            Value::Bool(_) => Type::Bool,
            Value::U8(_) => Type::U8,
            Value::I8(_) => Type::I8,
            Value::U16(_) => Type::U16,
            Value::I16(_) => Type::I16,
            Value::U32(_) => Type::U32,
            Value::I32(_) => Type::I32,
            Value::U64(_) => Type::U64,
            Value::I64(_) => Type::I64,
            Value::F32(_) => Type::F32,
            Value::F64(_) => Type::F64,
            Value::Varint(_) | Value::VarSInt(_) => Type::Varint,
            Value::String(_) => Type::String,
            Value::Bytes(_) => Type::Bytes,
            Value::Uuid(_) => Type::Uuid,
            Value::Timestamp(_) => Type::Timestamp,
            Value::Duration(_) => Type::Duration,
            Value::Array(..) => Type::Array,
            Value::Map(..) => Type::Map,
            Value::Struct(..) => Type::Struct,
        }
    }

    fn write_body(&self, w: &mut Writer) -> Result<(), CodecError> {
        match self {
            Value::Null => w.write_null(),
            Value::Bool(v) => w.write_bool(*v),
            Value::U8(v) => w.write_u8(*v),
            Value::I8(v) => w.write_i8(*v),
            Value::U16(v) => w.write_u16(*v),
            Value::I16(v) => w.write_i16(*v),
            Value::U32(v) => w.write_u32(*v),
            Value::I32(v) => w.write_i32(*v),
            Value::U64(v) => w.write_u64(*v),
            Value::I64(v) => w.write_i64(*v),
            Value::F32(v) => w.write_f32(*v),
            Value::F64(v) => w.write_f64(*v),
            Value::Varint(v) => w.write_varint(*v),
            Value::VarSInt(v) => w.write_varsint(*v),
            Value::String(v) => w.write_string(v),
            Value::Bytes(v) => w.write_bytes(v),
            Value::Uuid(v) => w.write_uuid(v),
            Value::Timestamp(v) => w.write_timestamp(*v),
            Value::Duration(v) => w.write_duration(*v),
            Value::Array(elem_ty, items) => {
                w.array_begin(*elem_ty, items.len() as u32)?;
                for item in items {
                    item.write_body(w)?;
                }
                w.array_end()
            }
            Value::Map(key_ty, val_ty, entries) => {
                w.map_begin(*key_ty, *val_ty, entries.len() as u32)?;
                for (k, v) in entries {
                    k.write_body(w)?;
                    v.write_body(w)?;
                }
                w.map_end()
            }
            Value::Struct(type_id, fields) => {
                w.struct_begin(*type_id)?;
                for (field_id, value) in fields {
                    w.write_field(*field_id, value.ty())?;
                    value.write_body(w)?;
                }
                w.struct_end()
            }
        }
    }

    /// Reads the next value, whatever its type, recursing into containers
    /// and nested structs without a schema.
    pub fn read_any(r: &mut Reader) -> Result<Value, CodecError> {
        let tag = r.peek_type().ok_or(CodecError::Truncated { expected: 1, actual: 0 })?;
        let ty = Type::from_tag(tag).ok_or(CodecError::InvalidType(tag))?;
        Value::read_body(r, ty)
    }

    fn read_body(r: &mut Reader, ty: Type) -> Result<Value, CodecError> {
        match ty {
            Type::Null => {
                r.read_null()?;
                Ok(Value::Null)
            }
            Type::Bool => Ok(Value::Bool(r.read_bool()?)),
            Type::U8 => Ok(Value::U8(r.read_u8()?)),
            Type::I8 => Ok(Value::I8(r.read_i8()?)),
            Type::U16 => Ok(Value::U16(r.read_u16()?)),
            Type::I16 => Ok(Value::I16(r.read_i16()?)),
            Type::U32 => Ok(Value::U32(r.read_u32()?)),
            Type::I32 => Ok(Value::I32(r.read_i32()?)),
            Type::U64 => Ok(Value::U64(r.read_u64()?)),
            Type::I64 => Ok(Value::I64(r.read_i64()?)),
            Type::F32 => Ok(Value::F32(r.read_f32()?)),
            Type::F64 => Ok(Value::F64(r.read_f64()?)),
            Type::Varint => Ok(Value::Varint(r.read_varint()?)),
            Type::String => Ok(Value::String(r.read_string()?.to_owned())),
            Type::Bytes => Ok(Value::Bytes(r.read_bytes()?.to_vec())),
            Type::Uuid => Ok(Value::Uuid(r.read_uuid()?)),
            Type::Timestamp => Ok(Value::Timestamp(r.read_timestamp()?)),
            Type::Duration => Ok(Value::Duration(r.read_duration()?)),
            Type::Array => {
                let (elem_ty, count) = r.array_begin()?;
                let mut items = Vec::new();
                for _ in 0..count {
                    items.push(Value::read_any(r)?);
                }
                r.array_end()?;
                Ok(Value::Array(elem_ty, items))
            }
            Type::Map => {
                let (key_ty, val_ty, count) = r.map_begin()?;
                let mut entries = Vec::new();
                for _ in 0..count {
                    let key = Value::read_any(r)?;
                    let val = Value::read_any(r)?;
                    entries.push((key, val));
                }
                r.map_end()?;
                Ok(Value::Map(key_ty, val_ty, entries))
            }
            Type::Struct => {
                let type_id = r.struct_begin()?;
                let mut fields = Vec::new();
                while let Some((field_id, field_ty)) = r.read_field()? {
                    fields.push((field_id, Value::read_body(r, field_ty)?));
                }
                r.struct_end()?;
                Ok(Value::Struct(type_id, fields))
            }
            Type::Tuple | Type::Optional | Type::Enum | Type::Extension => {
                Err(CodecError::InvalidType(ty as u8))
            }
        }
    }
}

/// Encodes `values` as a `STRUCT` matching `schema`, in the schema's
/// declared field order. `values` may be given in any order; each is looked
/// up by `field_id`.
pub fn encode_struct(w: &mut Writer, schema: &Schema, values: &[(u16, Value)]) -> Result<(), CodecError> {
    w.struct_begin(schema.type_id)?;
    for field in schema.fields {
        let value = values
            .iter()
            .find(|(id, _)| *id == field.field_id)
            .map(|(_, v)| v)
            .ok_or(CodecError::InvalidArgument("missing value for schema field during encode"))?;
        if value.ty() != field.ty {
            return Err(CodecError::TypeMismatch { expected: field.ty, actual: value.ty() });
        }
        w.write_field(field.field_id, field.ty)?;
        value.write_body(w)?;
    }
    w.struct_end()
}

/// Decodes a `STRUCT` against `schema`. Wire fields the schema doesn't
/// declare are skipped; wire field order doesn't need to match the
/// schema's declaration order.
pub fn decode_struct(r: &mut Reader, schema: &Schema) -> Result<Vec<(u16, Value)>, CodecError> {
    let type_id = r.struct_begin()?;
    if type_id != schema.type_id {
        return Err(CodecError::StructTypeMismatch { expected: schema.type_id, actual: type_id });
    }

    let mut values = Vec::with_capacity(schema.fields.len());
    while let Some((field_id, wire_ty)) = r.read_field()? {
        match schema.fields.iter().find(|f| f.field_id == field_id) {
            Some(field) => {
                if field.ty != wire_ty {
                    return Err(CodecError::TypeMismatch { expected: field.ty, actual: wire_ty });
                }
                let value = Value::read_body(r, wire_ty)?;
                values.push((field_id, value));
            }
            None => {
                r.skip()?;
            }
        }
    }
    r.struct_end()?;
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::Flags;

    const FIELDS: &[SchemaField] = &[
        SchemaField { name: "id", field_id: 1, ty: Type::U32, flags: field_flags::REQUIRED, offset: 0, size: 4 },
        SchemaField { name: "name", field_id: 2, ty: Type::String, flags: field_flags::REQUIRED, offset: 4, size: 0 },
    ];
    const SCHEMA: Schema = Schema { name: "widget", type_id: 42, fields: FIELDS, struct_size: 4 };

    #[test]
    fn encode_then_decode_round_trips_declared_fields() {
        let values = vec![(1, Value::U32(7)), (2, Value::String("lamp".into()))];
        let mut w = Writer::new(1, Flags::NO_CRC);
        encode_struct(&mut w, &SCHEMA, &values).unwrap();
        let frame = w.finish().unwrap().to_vec();

        let mut r = Reader::new(&frame).unwrap();
        r.validate().unwrap();
        let decoded = decode_struct(&mut r, &SCHEMA).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn decode_skips_unknown_wire_fields() {
        // Hand-write a struct with an extra field id 99 the schema doesn't know.
        let mut w = Writer::new(1, Flags::NO_CRC);
        w.struct_begin(42).unwrap();
        w.write_field(99, Type::Bool).unwrap();
        w.write_bool(true).unwrap();
        w.write_field(1, Type::U32).unwrap();
        w.write_u32(3).unwrap();
        w.write_field(2, Type::String).unwrap();
        w.write_string("x").unwrap();
        w.struct_end().unwrap();
        let frame = w.finish().unwrap().to_vec();

        let mut r = Reader::new(&frame).unwrap();
        r.validate().unwrap();
        let decoded = decode_struct(&mut r, &SCHEMA).unwrap();
        assert_eq!(decoded, vec![(1, Value::U32(3)), (2, Value::String("x".into()))]);
    }

    #[test]
    fn decode_rejects_wrong_type_id() {
        let mut w = Writer::new(1, Flags::NO_CRC);
        w.struct_begin(1).unwrap();
        w.struct_end().unwrap();
        let frame = w.finish().unwrap().to_vec();

        let mut r = Reader::new(&frame).unwrap();
        r.validate().unwrap();
        let err = decode_struct(&mut r, &SCHEMA).unwrap_err();
        assert!(matches!(err, CodecError::StructTypeMismatch { expected: 42, actual: 1 }));
    }

    #[test]
    fn encode_rejects_field_type_mismatch() {
        let values = vec![(1, Value::String("wrong type".into())), (2, Value::String("lamp".into()))];
        let mut w = Writer::new(1, Flags::NO_CRC);
        let err = encode_struct(&mut w, &SCHEMA, &values).unwrap_err();
        assert!(matches!(err, CodecError::TypeMismatch { expected: Type::U32, actual: Type::String }));
    }

    #[test]
    fn generic_value_read_any_matches_schema_decode() {
        let values = vec![(1, Value::U32(7)), (2, Value::String("lamp".into()))];
        let mut w = Writer::new(1, Flags::NO_CRC);
        encode_struct(&mut w, &SCHEMA, &values).unwrap();
        let frame = w.finish().unwrap().to_vec();

        let mut r = Reader::new(&frame).unwrap();
        r.validate().unwrap();
        match Value::read_any(&mut r).unwrap() {
            Value::Struct(type_id, fields) => {
                assert_eq!(type_id, 42);
                assert_eq!(fields, values);
            }
            other => panic!("expected Value::Struct, got {other:?}"),
        }
    }
}
