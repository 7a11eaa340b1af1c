//! Declarative bit-level binary codec.
//!
//! # Overview
//!
//! Wire layout — endianness, bit widths, length framing, string framing,
//! conditional presence — is declared once as per-field annotations, and one
//! pair of entry points ([encode], [decode]) handles all records uniformly.
//! Layout is fixed by the record description at build time: the byte stream
//! carries no type tags and there is no schema versioning.
//!
//! Two pieces do most of the work:
//!
//! - [BitBuffer], a stream supporting sub-byte reads and writes with
//!   MSB-first packing, so annotated fields can be 3 bits wide and length
//!   prefixes can tail the same byte as the field before them.
//! - A symmetric pair of walkers that traverse a record's declared fields in
//!   order, derive each field's [annotation::Descriptor], resolve
//!   cross-field `include_if` conditions, and drive the buffer accordingly.
//!
//! # Supported Field Kinds
//!
//! `bool`, `u8`/`u16`/`u32`/`u64`, `String`, fixed-size arrays, `Vec<T>`,
//! nested records, and user codecs implementing [Encodable] / [Decodable].
//!
//! # Example
//!
//! ```
//! use bitcodec::{decode, encode, Record};
//!
//! #[derive(Debug, Default, PartialEq, Record)]
//! struct Frame {
//!     #[codec(endian = "big")]
//!     source: u16,
//!     #[codec(width = "3")]
//!     channel: u8,
//!     #[codec(width = "5")]
//!     hops: u8,
//!     secure: bool,
//!     #[codec(include_if = ".secure")]
//!     key: u32,
//!     #[codec(slice_prefix = "8")]
//!     payload: Vec<u8>,
//! }
//!
//! # fn main() -> Result<(), bitcodec::Error> {
//! let frame = Frame {
//!     source: 0x8001,
//!     channel: 0b101,
//!     hops: 2,
//!     secure: false,
//!     key: 0,
//!     payload: vec![0x55, 0xaa],
//! };
//!
//! // `channel` and `hops` pack into one byte; `key` is gated off.
//! let bytes = encode(&frame)?;
//! assert_eq!(&bytes[..], &[0x80, 0x01, 0b1010_0010, 0x00, 0x02, 0x55, 0xaa]);
//!
//! let mut restored = Frame::default();
//! decode(&bytes, &mut restored)?;
//! assert_eq!(frame, restored);
//! # Ok(())
//! # }
//! ```

pub mod annotation;
pub mod bitbuffer;
mod condition;
mod decode;
mod encode;
pub mod error;
pub mod record;
mod walk;

// Re-export main types and traits
pub use annotation::Annotations;
pub use bitbuffer::{BitBuffer, Endian};
pub use decode::{decode, decode_from};
pub use encode::{encode, encode_into};
pub use error::Error;
pub use record::{
    Context, Decodable, Encodable, FieldDef, Record, Reflect, Sequence, ValueMut, ValueRef,
};

// Derive macro generating the `Record` reflection capability.
pub use bitcodec_derive::Record;
