//! The encoder: drives [BitBuffer] writes from a live value and its
//! declared field metadata.
//!
//! Fields are emitted strictly in declared order, so earlier fields may gate
//! (`include_if`) or size (length prefixes) later ones. Tuple and sequence
//! elements inherit the parent field's annotation bundle; conditions are
//! evaluated once per field, never per element.

use crate::{
    annotation::{Descriptor, StringShape},
    condition,
    record::{Context, Record, Reflect, ValueRef},
    BitBuffer, Error,
};
use bytes::Bytes;

/// Encodes a value to bytes.
///
/// A non-record value is treated as an anonymous single-field record with
/// default annotations, so top-level scalars, strings and sequences
/// round-trip.
pub fn encode<T: Reflect>(value: &T) -> Result<Bytes, Error> {
    let mut bb = BitBuffer::new();
    encode_into(&mut bb, value)?;
    Ok(bb.finish())
}

/// Encodes a value into an existing [BitBuffer], for composition with other
/// writers (including [crate::Encodable] implementations).
pub fn encode_into<T: Reflect>(bb: &mut BitBuffer, value: &T) -> Result<(), Error> {
    let root: &dyn Reflect = value;
    encode_value(bb, "root", root.view(), &Descriptor::default(), root, 0)
}

fn encode_record(bb: &mut BitBuffer, record: &dyn Record, root: &dyn Reflect) -> Result<(), Error> {
    for (index, def) in record.fields().iter().enumerate() {
        let descriptor = Descriptor::parse(&def.annotations)?;
        if let Some(cond) = &descriptor.include_if {
            if !condition::included(cond, root, record)? {
                continue;
            }
        }
        encode_value(bb, def.name, record.field(index), &descriptor, root, index)?;
    }
    Ok(())
}

fn encode_value(
    bb: &mut BitBuffer,
    name: &str,
    value: ValueRef<'_>,
    descriptor: &Descriptor,
    root: &dyn Reflect,
    index: usize,
) -> Result<(), Error> {
    match value {
        ValueRef::Bool(value) => write_uint_field(bb, u64::from(value), descriptor, 8),
        ValueRef::U8(value) => write_uint_field(bb, u64::from(value), descriptor, 8),
        ValueRef::U16(value) => write_uint_field(bb, u64::from(value), descriptor, 16),
        ValueRef::U32(value) => write_uint_field(bb, u64::from(value), descriptor, 32),
        ValueRef::U64(value) => write_uint_field(bb, value, descriptor, 64),
        ValueRef::Str(value) => match descriptor.string_shape {
            StringShape::NullTerminated { padded_len } => {
                bb.write_string_null_terminated(value, padded_len)
            }
            StringShape::LengthPrefixed { width, endian } => {
                bb.write_string_length_prefixed(value, endian, width)
            }
        },
        ValueRef::Record(record) => encode_record(bb, record, root),
        ValueRef::Tuple(elems) | ValueRef::Seq(elems) => {
            if let Some(prefix) = descriptor.slice_prefix {
                bb.write_uint(elems.len() as u64, prefix.endian, prefix.width)?;
            }
            for (position, elem) in elems.into_iter().enumerate() {
                encode_value(bb, name, elem, descriptor, root, position)?;
            }
            Ok(())
        }
        ValueRef::Codec(custom) => custom.encode(bb, Context::new(root_record(root), index)),
        ValueRef::Unsupported(_) => Err(Error::UnsupportedType(name.to_string())),
    }
}

fn write_uint_field(
    bb: &mut BitBuffer,
    value: u64,
    descriptor: &Descriptor,
    natural_width: usize,
) -> Result<(), Error> {
    bb.write_uint(
        value,
        descriptor.endian,
        descriptor.field_width.unwrap_or(natural_width),
    )
}

fn root_record(root: &dyn Reflect) -> Option<&dyn Record> {
    match root.view() {
        ValueRef::Record(record) => Some(record),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ValueMut;

    #[test]
    fn test_bare_scalar_is_little_endian() {
        let bytes = encode(&0x8001_0203u32).unwrap();
        assert_eq!(&bytes[..], &[0x03, 0x02, 0x01, 0x80]);
    }

    #[test]
    fn test_bare_string_uses_default_framing() {
        let bytes = encode(&String::from("abc")).unwrap();
        assert_eq!(&bytes[..], &[0x03, 0x61, 0x62, 0x63]);
    }

    #[test]
    fn test_bare_sequence_has_no_framing() {
        let bytes = encode(&vec![0x55u8, 0xaa]).unwrap();
        assert_eq!(&bytes[..], &[0x55, 0xaa]);
    }

    #[test]
    fn test_bare_tuple_has_no_framing() {
        let bytes = encode(&[0x55u8, 0xaa]).unwrap();
        assert_eq!(&bytes[..], &[0x55, 0xaa]);
    }

    #[test]
    fn test_unsupported_kind() {
        struct Channel;

        impl Reflect for Channel {
            fn view(&self) -> ValueRef<'_> {
                ValueRef::Unsupported("channel")
            }

            fn view_mut(&mut self) -> ValueMut<'_> {
                ValueMut::Unsupported("channel")
            }
        }

        assert_eq!(
            encode(&Channel),
            Err(Error::UnsupportedType("root".into()))
        );
    }

    #[test]
    fn test_encode_into_composes() {
        let mut bb = BitBuffer::new();
        encode_into(&mut bb, &0x01u8).unwrap();
        encode_into(&mut bb, &0x8001u16).unwrap();
        assert_eq!(&bb.finish()[..], &[0x01, 0x01, 0x80]);
    }
}
