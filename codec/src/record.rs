//! The reflection capability the walkers are driven by.
//!
//! # Overview
//!
//! The codec never inspects concrete types directly. Instead it consumes
//! three small traits:
//!
//! - [Record] enumerates a record's fields in declared order: static
//!   metadata ([FieldDef]) plus indexed access to each field's value.
//! - [Reflect] reports a value's kind as a [ValueRef] / [ValueMut] view.
//! - [Sequence] grants the decoder growable access to variable-length
//!   sequences.
//!
//! `#[derive(Record)]` generates [Record] and [Reflect] for named-field
//! structs; the implementations here cover the primitive kinds. A type may
//! also implement the pair by hand.
//!
//! User-defined codecs participate through [Encodable] and [Decodable]: a
//! value whose [Reflect] impl reports the codec kind takes over serialization
//! of its own subtree.

use crate::{annotation::Annotations, BitBuffer, Error};

/// Name and annotation bundle of one declared field.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub name: &'static str,
    pub annotations: Annotations,
}

/// An ordered collection of named, annotated fields.
pub trait Record {
    /// Field metadata in declared order.
    fn fields(&self) -> &'static [FieldDef];

    /// A view of the field at `index`.
    ///
    /// # Panics
    ///
    /// Panics when `index` is out of range; the walkers only use indices
    /// obtained from [Record::fields].
    fn field(&self, index: usize) -> ValueRef<'_>;

    /// A mutable view of the field at `index`.
    ///
    /// # Panics
    ///
    /// Panics when `index` is out of range.
    fn field_mut(&mut self, index: usize) -> ValueMut<'_>;
}

/// A value that can report its kind to the walkers.
pub trait Reflect {
    fn view(&self) -> ValueRef<'_>;
    fn view_mut(&mut self) -> ValueMut<'_>;
}

/// A shared view of a value, tagged by kind.
pub enum ValueRef<'a> {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Str(&'a str),
    /// Fixed-arity homogeneous tuple.
    Tuple(Vec<ValueRef<'a>>),
    /// Variable-length sequence.
    Seq(Vec<ValueRef<'a>>),
    Record(&'a dyn Record),
    /// A value serializing itself through [Encodable] / [Decodable].
    Codec(&'a dyn Encodable),
    /// A kind the codec cannot serialize; carries the host type name.
    Unsupported(&'static str),
}

/// A mutable view of a value, tagged by kind.
pub enum ValueMut<'a> {
    Bool(&'a mut bool),
    U8(&'a mut u8),
    U16(&'a mut u16),
    U32(&'a mut u32),
    U64(&'a mut u64),
    Str(&'a mut String),
    Tuple(Vec<ValueMut<'a>>),
    Seq(&'a mut dyn Sequence),
    Record(&'a mut dyn Record),
    Codec(&'a mut dyn Decodable),
    Unsupported(&'static str),
}

/// Growable element access for variable-length sequences.
pub trait Sequence {
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Drops all elements.
    fn clear(&mut self);
    /// Appends a default-initialized element.
    fn push_default(&mut self);
    /// Drops the last element, if any.
    fn pop_last(&mut self);
    fn get(&self, index: usize) -> Option<ValueRef<'_>>;
    fn get_mut(&mut self, index: usize) -> Option<ValueMut<'_>>;
}

/// State handed to user codecs at each delegation point.
///
/// On encode, [Context::root] is the top-level record (when the value under
/// encode is one). On decode the sink is exclusively borrowed by the walker,
/// so no root is available.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    root: Option<&'a dyn Record>,
    index: usize,
}

impl<'a> Context<'a> {
    pub(crate) fn new(root: Option<&'a dyn Record>, index: usize) -> Self {
        Self { root, index }
    }

    /// The top-level record, when one is reachable.
    pub fn root(&self) -> Option<&'a dyn Record> {
        self.root
    }

    /// Index of the current field (or element) within its parent.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// A value that serializes itself, overriding the walker for its subtree.
pub trait Encodable {
    fn encode(&self, bb: &mut BitBuffer, ctx: Context<'_>) -> Result<(), Error>;
}

/// A value that deserializes itself, overriding the walker for its subtree.
pub trait Decodable {
    fn decode(&mut self, bb: &mut BitBuffer, ctx: Context<'_>) -> Result<(), Error>;
}

// ---------- Reflect implementations ----------

macro_rules! impl_reflect_primitive {
    ($type:ty, $variant:ident) => {
        impl Reflect for $type {
            #[inline]
            fn view(&self) -> ValueRef<'_> {
                ValueRef::$variant(*self)
            }

            #[inline]
            fn view_mut(&mut self) -> ValueMut<'_> {
                ValueMut::$variant(self)
            }
        }
    };
}

impl_reflect_primitive!(bool, Bool);
impl_reflect_primitive!(u8, U8);
impl_reflect_primitive!(u16, U16);
impl_reflect_primitive!(u32, U32);
impl_reflect_primitive!(u64, U64);

impl Reflect for String {
    #[inline]
    fn view(&self) -> ValueRef<'_> {
        ValueRef::Str(self)
    }

    #[inline]
    fn view_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Str(self)
    }
}

// Owning pointers are transparent to the walkers.
impl<T: Reflect + ?Sized> Reflect for Box<T> {
    #[inline]
    fn view(&self) -> ValueRef<'_> {
        (**self).view()
    }

    #[inline]
    fn view_mut(&mut self) -> ValueMut<'_> {
        (**self).view_mut()
    }
}

impl<T: Reflect + Default> Reflect for Vec<T> {
    fn view(&self) -> ValueRef<'_> {
        ValueRef::Seq(self.iter().map(Reflect::view).collect())
    }

    fn view_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Seq(self)
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn view(&self) -> ValueRef<'_> {
        ValueRef::Tuple(self.iter().map(Reflect::view).collect())
    }

    fn view_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Tuple(self.iter_mut().map(Reflect::view_mut).collect())
    }
}

impl<T: Reflect + Default> Sequence for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn clear(&mut self) {
        Vec::clear(self);
    }

    fn push_default(&mut self) {
        self.push(T::default());
    }

    fn pop_last(&mut self) {
        self.pop();
    }

    fn get(&self, index: usize) -> Option<ValueRef<'_>> {
        self.as_slice().get(index).map(Reflect::view)
    }

    fn get_mut(&mut self, index: usize) -> Option<ValueMut<'_>> {
        self.as_mut_slice().get_mut(index).map(Reflect::view_mut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_views() {
        assert!(matches!(true.view(), ValueRef::Bool(true)));
        assert!(matches!(7u8.view(), ValueRef::U8(7)));
        assert!(matches!(7u16.view(), ValueRef::U16(7)));
        assert!(matches!(7u32.view(), ValueRef::U32(7)));
        assert!(matches!(7u64.view(), ValueRef::U64(7)));

        let text = String::from("hi");
        assert!(matches!(text.view(), ValueRef::Str("hi")));
    }

    #[test]
    fn test_primitive_views_mut() {
        let mut value = 7u8;
        if let ValueMut::U8(slot) = value.view_mut() {
            *slot = 9;
        }
        assert_eq!(value, 9);
    }

    #[test]
    fn test_sequence_views() {
        let values = vec![1u8, 2, 3];
        match values.view() {
            ValueRef::Seq(elems) => assert_eq!(elems.len(), 3),
            _ => panic!("expected a sequence view"),
        }

        let tuple = [1u16, 2];
        match tuple.view() {
            ValueRef::Tuple(elems) => assert_eq!(elems.len(), 2),
            _ => panic!("expected a tuple view"),
        }
    }

    #[test]
    fn test_sequence_mutation() {
        let mut values: Vec<u8> = vec![1, 2];
        let seq: &mut dyn Sequence = &mut values;
        seq.push_default();
        assert_eq!(seq.len(), 3);
        if let Some(ValueMut::U8(slot)) = seq.get_mut(2) {
            *slot = 9;
        }
        seq.pop_last();
        assert_eq!(values, vec![1, 2]);

        let seq: &mut dyn Sequence = &mut values;
        seq.clear();
        assert!(values.is_empty());
    }
}
