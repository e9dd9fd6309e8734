#![no_main]
use dcf_codec::{decode_struct, field_flags, Reader, Schema, SchemaField, Type};
use libfuzzer_sys::fuzz_target;

const FIELDS: &[SchemaField] = &[
    SchemaField { name: "id", field_id: 1, ty: Type::U32, flags: field_flags::REQUIRED, offset: 0, size: 4 },
    SchemaField { name: "name", field_id: 2, ty: Type::String, flags: field_flags::OPTIONAL, offset: 4, size: 0 },
    SchemaField { name: "tags", field_id: 3, ty: Type::Array, flags: field_flags::OPTIONAL, offset: 4, size: 0 },
];
const SCHEMA: Schema = Schema { name: "fuzz_record", type_id: 1, fields: FIELDS, struct_size: 8 };

fuzz_target!(|data: &[u8]| {
    // decode_struct must reject adversarial bytes without panicking, whether
    // the corruption is in the header, the struct's type_id, a field's tag,
    // or an unknown field that has to be skipped.
    let Ok(mut reader) = Reader::new(data) else { return };
    if reader.validate().is_err() {
        return;
    }
    let _ = decode_struct(&mut reader, &SCHEMA);
});
