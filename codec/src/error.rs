//! Error types for encoding and decoding operations.

use thiserror::Error;

/// Error type returned by every fallible operation in the crate.
///
/// The first error aborts the current encode or decode call; on decode
/// failure the sink is left in an intermediate state and should be
/// discarded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The walker met a value kind it cannot serialize; carries the field name.
    #[error("unsupported type: field '{0}'")]
    UnsupportedType(String),
    /// An annotation violated the grammar or failed numeric parsing.
    #[error("bad annotation: {0}")]
    BadAnnotation(String),
    /// An includeIf path segment did not name a field.
    #[error("include path could not be resolved: '{0}' not found")]
    PathNotFound(String),
    /// An includeIf path descended through a non-record field.
    #[error("include path could not be resolved: '{0}' is not a record")]
    NotARecord(String),
    /// An includeIf path ended on a kind other than bool or unsigned integer.
    #[error("include path '{0}' does not end on a boolean or unsigned integer")]
    UnsupportedConditionType(String),
    /// A bit-granular operation was asked for more than 8 bits.
    #[error("bit operations are limited to 8 bits, {0} requested")]
    TooManyBits(usize),
    /// A width over 8 bits was not a whole number of bytes.
    #[error("bit widths over 8 must be byte aligned, {0} requested")]
    NonByteAlignedWidth(usize),
    /// A value did not fit in the declared field width.
    #[error("value {value} does not fit in a {width} bit field")]
    ValueExceedsWidth { value: u64, width: usize },
    /// A string was too long for its length prefix or padded window.
    #[error("string of {len} bytes exceeds maximum of {max}")]
    StringTooLarge { len: usize, max: usize },
    /// A padded null-terminated read found no terminator in its window.
    #[error("no null terminator found within padded window")]
    UnterminatedString,
    /// The input ended during a specifically-sized read.
    #[error("end of input")]
    EndOfInput,
    /// Decoded string bytes were not valid UTF-8.
    #[error("string data is not valid utf-8")]
    InvalidUtf8,
    /// The decode sink cannot be written to.
    ///
    /// Part of the public taxonomy for API parity; `decode` takes `&mut`,
    /// so the library itself never produces it.
    #[error("sink is not assignable")]
    SinkNotAssignable,
}
