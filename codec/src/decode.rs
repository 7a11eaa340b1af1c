//! The decoder: drives [BitBuffer] reads into a mutable sink.
//!
//! Mirrors the encoder: declared field order, per-field descriptors,
//! condition gating, annotation inheritance for elements. Slots are
//! addressed by [walk] paths so the sink can be re-read between mutations —
//! conditions on later fields see the earlier fields the decoder has already
//! populated.

use crate::{
    annotation::{Descriptor, StringShape},
    condition,
    record::{Context, Reflect, Sequence, ValueMut, ValueRef},
    walk::{self, SlotKind, Step},
    BitBuffer, Error,
};

/// Decodes bytes into a mutable sink.
///
/// Excluded fields keep whatever the sink already held (its default, for a
/// freshly constructed sink). On error the sink is in an intermediate state
/// and should be discarded.
pub fn decode<T: Reflect>(data: &[u8], sink: &mut T) -> Result<(), Error> {
    let mut bb = BitBuffer::from_bytes(data);
    decode_from(&mut bb, sink)
}

/// Decodes from an existing [BitBuffer], for composition with other readers
/// (including [crate::Decodable] implementations).
pub fn decode_from<T: Reflect>(bb: &mut BitBuffer, sink: &mut T) -> Result<(), Error> {
    decode_value(bb, "root", sink, &[], &Descriptor::default(), 0)
}

fn decode_value(
    bb: &mut BitBuffer,
    name: &str,
    root: &mut dyn Reflect,
    path: &[Step],
    descriptor: &Descriptor,
    index: usize,
) -> Result<(), Error> {
    match walk::kind_at(&*root, path) {
        SlotKind::Record => decode_record(bb, root, path),
        SlotKind::Seq => decode_seq(bb, name, root, path, descriptor),
        SlotKind::Tuple(arity) => decode_tuple(bb, name, root, path, descriptor, arity),
        SlotKind::Codec => match walk::locate_mut(root, path) {
            ValueMut::Codec(custom) => custom.decode(bb, Context::new(None, index)),
            _ => unreachable!("probed kind does not match slot"),
        },
        SlotKind::Unsupported(_) => Err(Error::UnsupportedType(name.to_string())),
        _ => decode_primitive(bb, root, path, descriptor),
    }
}

fn decode_record(bb: &mut BitBuffer, root: &mut dyn Reflect, path: &[Step]) -> Result<(), Error> {
    let defs = match walk::locate(&*root, path) {
        ValueRef::Record(record) => record.fields(),
        _ => unreachable!("probed kind does not match slot"),
    };

    for (index, def) in defs.iter().enumerate() {
        let descriptor = Descriptor::parse(&def.annotations)?;
        if let Some(cond) = &descriptor.include_if {
            let parent = match walk::locate(&*root, path) {
                ValueRef::Record(record) => record,
                _ => unreachable!("probed kind does not match slot"),
            };
            if !condition::included(cond, &*root, parent)? {
                continue;
            }
        }

        let mut child = path.to_vec();
        child.push(Step::Field(index));
        decode_value(bb, def.name, root, &child, &descriptor, index)?;
    }

    Ok(())
}

fn decode_primitive(
    bb: &mut BitBuffer,
    root: &mut dyn Reflect,
    path: &[Step],
    descriptor: &Descriptor,
) -> Result<(), Error> {
    match walk::locate_mut(root, path) {
        ValueMut::Bool(slot) => {
            *slot = read_uint_field(bb, descriptor, 8)? > 0;
        }
        ValueMut::U8(slot) => {
            *slot = read_uint_field(bb, descriptor, 8)? as u8;
        }
        ValueMut::U16(slot) => {
            *slot = read_uint_field(bb, descriptor, 16)? as u16;
        }
        ValueMut::U32(slot) => {
            *slot = read_uint_field(bb, descriptor, 32)? as u32;
        }
        ValueMut::U64(slot) => {
            *slot = read_uint_field(bb, descriptor, 64)?;
        }
        ValueMut::Str(slot) => {
            *slot = match descriptor.string_shape {
                StringShape::NullTerminated { padded_len } => {
                    bb.read_string_null_terminated(padded_len)?
                }
                StringShape::LengthPrefixed { width, endian } => {
                    bb.read_string_length_prefixed(endian, width)?
                }
            };
        }
        _ => unreachable!("probed kind does not match slot"),
    }
    Ok(())
}

fn decode_seq(
    bb: &mut BitBuffer,
    name: &str,
    root: &mut dyn Reflect,
    path: &[Step],
    descriptor: &Descriptor,
) -> Result<(), Error> {
    with_seq(root, path, |seq| seq.clear());

    if let Some(prefix) = descriptor.slice_prefix {
        // The prefix promised an exact count; end of input is an error here.
        let count = bb.read_uint(prefix.endian, prefix.width)? as usize;
        for position in 0..count {
            with_seq(root, path, |seq| seq.push_default());
            let mut elem = path.to_vec();
            elem.push(Step::Elem(position));
            decode_value(bb, name, root, &elem, descriptor, position)?;
        }
        return Ok(());
    }

    // Open-ended: read elements until the input runs dry, dropping a
    // partially decoded element.
    let mut position = 0;
    loop {
        with_seq(root, path, |seq| seq.push_default());
        let mut elem = path.to_vec();
        elem.push(Step::Elem(position));
        match decode_value(bb, name, root, &elem, descriptor, position) {
            Ok(()) => position += 1,
            Err(Error::EndOfInput) => {
                with_seq(root, path, |seq| seq.pop_last());
                return Ok(());
            }
            Err(err) => return Err(err),
        }
    }
}

fn decode_tuple(
    bb: &mut BitBuffer,
    name: &str,
    root: &mut dyn Reflect,
    path: &[Step],
    descriptor: &Descriptor,
    arity: usize,
) -> Result<(), Error> {
    if let Some(prefix) = descriptor.slice_prefix {
        // Consumed for alignment; the declared arity wins.
        bb.read_uint(prefix.endian, prefix.width)?;
    }

    for position in 0..arity {
        let mut elem = path.to_vec();
        elem.push(Step::Elem(position));
        decode_value(bb, name, root, &elem, descriptor, position)?;
    }

    Ok(())
}

fn with_seq(root: &mut dyn Reflect, path: &[Step], operation: impl FnOnce(&mut dyn Sequence)) {
    match walk::locate_mut(root, path) {
        ValueMut::Seq(seq) => operation(seq),
        _ => unreachable!("probed kind does not match slot"),
    }
}

fn read_uint_field(
    bb: &mut BitBuffer,
    descriptor: &Descriptor,
    natural_width: usize,
) -> Result<u64, Error> {
    bb.read_uint(
        descriptor.endian,
        descriptor.field_width.unwrap_or(natural_width),
    )
}
