//! Generic value skipping: walks the grammar of whatever comes next without
//! knowing its shape ahead of time, so a reader can tolerate wire fields its
//! own schema doesn't declare.

use crate::error::CodecError;
use crate::reader::Reader;
use crate::types::Type;
use crate::varint;

pub(crate) fn skip_value(r: &mut Reader<'_>) -> Result<(), CodecError> {
    let tag = r.read_tag()?;
    skip_tagged(r, tag)
}

fn skip_tagged(r: &mut Reader<'_>, tag: u8) -> Result<(), CodecError> {
    let ty = Type::from_tag(tag).ok_or(CodecError::InvalidType(tag))?;
    match ty {
        Type::Null => Ok(()),
        Type::Bool | Type::U8 | Type::I8 => {
            r.take(1)?;
            Ok(())
        }
        Type::U16 | Type::I16 => {
            r.take(2)?;
            Ok(())
        }
        Type::U32 | Type::I32 | Type::F32 => {
            r.take(4)?;
            Ok(())
        }
        Type::U64 | Type::I64 | Type::F64 | Type::Timestamp | Type::Duration => {
            r.take(8)?;
            Ok(())
        }
        Type::Uuid => {
            r.take(16)?;
            Ok(())
        }
        Type::Varint => {
            let (_, consumed) = varint::decode_varint(r.remaining_slice())?;
            r.take(consumed)?;
            Ok(())
        }
        Type::String | Type::Bytes => {
            let len_bytes = r.take(4)?;
            let len = u32::from_be_bytes(len_bytes.try_into().unwrap()) as usize;
            r.take(len)?;
            Ok(())
        }
        Type::Array => {
            r.take(1)?; // declared element type, informational only
            let count_bytes = r.take(4)?;
            let count = u32::from_be_bytes(count_bytes.try_into().unwrap());
            if count as usize > r.max_array() {
                return Err(CodecError::TooLarge { limit: r.max_array(), actual: count as usize });
            }
            r.push_depth()?;
            for _ in 0..count {
                skip_value(r)?;
            }
            r.pop_depth()
        }
        Type::Map => {
            r.take(2)?; // declared key + value types
            let count_bytes = r.take(4)?;
            let count = u32::from_be_bytes(count_bytes.try_into().unwrap());
            if count as usize > r.max_array() {
                return Err(CodecError::TooLarge { limit: r.max_array(), actual: count as usize });
            }
            r.push_depth()?;
            for _ in 0..count {
                skip_value(r)?;
                skip_value(r)?;
            }
            r.pop_depth()
        }
        Type::Struct => {
            r.take(2)?; // type_id
            r.push_depth()?;
            loop {
                let id_bytes = r.take(2)?;
                let field_id = u16::from_be_bytes(id_bytes.try_into().unwrap());
                let field_tag = r.read_tag()?;
                if field_id == 0 && field_tag == Type::Null as u8 {
                    break;
                }
                skip_tagged(r, field_tag)?;
            }
            r.pop_depth()
        }
        Type::Tuple | Type::Optional | Type::Enum | Type::Extension => {
            Err(CodecError::InvalidType(tag))
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::header::Flags;
    use crate::reader::Reader;
    use crate::types::Type;
    use crate::writer::Writer;

    #[test]
    fn skip_consumes_exactly_as_many_bytes_as_a_typed_read() {
        let mut w = Writer::new(1, Flags::NO_CRC);
        w.write_u32(7).unwrap();
        w.write_string("after").unwrap();
        let frame = w.finish().unwrap().to_vec();

        let mut skipper = Reader::new(&frame).unwrap();
        skipper.validate().unwrap();
        skipper.skip().unwrap();
        let after_skip = skipper.remaining();

        let mut reader = Reader::new(&frame).unwrap();
        reader.validate().unwrap();
        reader.read_u32().unwrap();
        let after_read = reader.remaining();

        assert_eq!(after_skip, after_read);
        assert_eq!(skipper.read_string().unwrap(), "after");
    }

    #[test]
    fn skip_recurses_through_nested_containers() {
        let mut w = Writer::new(1, Flags::NO_CRC);
        w.array_begin(Type::Array, 1).unwrap();
        w.array_begin(Type::U8, 3).unwrap();
        w.write_u8(1).unwrap();
        w.write_u8(2).unwrap();
        w.write_u8(3).unwrap();
        w.array_end().unwrap();
        w.array_end().unwrap();
        w.write_bool(true).unwrap();
        let frame = w.finish().unwrap().to_vec();

        let mut r = Reader::new(&frame).unwrap();
        r.validate().unwrap();
        r.skip().unwrap();
        assert_eq!(r.read_bool().unwrap(), true);
        assert!(r.at_end());
    }

    #[test]
    fn skip_rejects_reserved_tags() {
        let mut w = Writer::new(1, Flags::NO_CRC);
        w.write_u8(0).unwrap(); // placeholder byte, overwritten below
        let mut frame = w.finish().unwrap().to_vec();
        let payload_start = crate::header::HEADER_SIZE;
        frame[payload_start] = Type::Enum as u8;

        let mut r = Reader::new(&frame).unwrap();
        r.validate().unwrap();
        assert!(r.skip().is_err());
    }
}
