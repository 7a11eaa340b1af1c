//! Slot navigation for the decoder.
//!
//! The decoder holds the sink exclusively, so it cannot keep live references
//! into several levels of the tree at once. Instead it addresses each slot by
//! a path of [Step]s from the root and re-navigates per access; borrows stay
//! strictly sequential, and the sink can be re-read immutably between
//! mutations (which is what lets `include_if` see earlier, already-populated
//! fields).

use crate::record::{Reflect, ValueMut, ValueRef};

/// One level of descent from the root value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// A record field, by declared index.
    Field(usize),
    /// A tuple or sequence element, by position.
    Elem(usize),
}

/// Resolves a path to a shared view of the slot it names.
///
/// # Panics
///
/// Panics when the path does not match the record shape; the walkers only
/// build paths to slots they have just visited.
pub(crate) fn locate<'a>(root: &'a dyn Reflect, path: &[Step]) -> ValueRef<'a> {
    let mut current = root.view();
    for step in path {
        current = match (current, *step) {
            (ValueRef::Record(record), Step::Field(index)) => record.field(index),
            (ValueRef::Tuple(elems), Step::Elem(index))
            | (ValueRef::Seq(elems), Step::Elem(index)) => elems
                .into_iter()
                .nth(index)
                .expect("walker path names a missing element"),
            _ => panic!("walker path does not match record shape"),
        };
    }
    current
}

/// Resolves a path to a mutable view of the slot it names.
///
/// # Panics
///
/// As [locate].
pub(crate) fn locate_mut<'a>(root: &'a mut dyn Reflect, path: &[Step]) -> ValueMut<'a> {
    let mut current = root.view_mut();
    for step in path {
        current = match (current, *step) {
            (ValueMut::Record(record), Step::Field(index)) => record.field_mut(index),
            (ValueMut::Tuple(elems), Step::Elem(index)) => elems
                .into_iter()
                .nth(index)
                .expect("walker path names a missing element"),
            (ValueMut::Seq(seq), Step::Elem(index)) => seq
                .get_mut(index)
                .expect("walker path names a missing element"),
            _ => panic!("walker path does not match record shape"),
        };
    }
    current
}

/// The kind of the slot a path names, with just enough detail to dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SlotKind {
    Bool,
    U8,
    U16,
    U32,
    U64,
    Str,
    Tuple(usize),
    Seq,
    Record,
    Codec,
    Unsupported(&'static str),
}

/// Probes the kind at `path` without taking a mutable borrow.
pub(crate) fn kind_at(root: &dyn Reflect, path: &[Step]) -> SlotKind {
    match locate(root, path) {
        ValueRef::Bool(_) => SlotKind::Bool,
        ValueRef::U8(_) => SlotKind::U8,
        ValueRef::U16(_) => SlotKind::U16,
        ValueRef::U32(_) => SlotKind::U32,
        ValueRef::U64(_) => SlotKind::U64,
        ValueRef::Str(_) => SlotKind::Str,
        ValueRef::Tuple(elems) => SlotKind::Tuple(elems.len()),
        ValueRef::Seq(_) => SlotKind::Seq,
        ValueRef::Record(_) => SlotKind::Record,
        ValueRef::Codec(_) => SlotKind::Codec,
        ValueRef::Unsupported(type_name) => SlotKind::Unsupported(type_name),
    }
}
