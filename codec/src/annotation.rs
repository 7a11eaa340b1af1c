//! Per-field annotation parsing.
//!
//! Annotations arrive as raw text on a field's metadata (see
//! [Annotations]) and are parsed into a typed [Descriptor] once per field
//! per call. Grammar:
//!
//! | Key | Syntax |
//! |-----|--------|
//! | `endian` | `little` \| `big` |
//! | `width` | `<bits>` |
//! | `slice_prefix` | `<bits>` \| `<bits>,big` \| `<bits>,little` |
//! | `string_type` | `null` \| `null,<pad_bytes>` \| `prefix,<bits>` \| `prefix,<bits>,<endian>` |
//! | `include_if` | `[.]path(==\|!=)?rhs?` |
//!
//! Violations fail with [Error::BadAnnotation].

use crate::{bitbuffer::Endian, Error};

/// Raw textual annotations attached to a field.
///
/// Produced by `#[derive(Record)]` from `#[codec(...)]` attributes, or
/// written out by hand-rolled [crate::Record] implementations. Absent keys
/// take the documented defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Annotations {
    /// Byte order: `"little"` (default) or `"big"`.
    pub endian: Option<&'static str>,
    /// Bit width overriding the type's natural width.
    pub field_width: Option<&'static str>,
    /// Length prefix for tuples and sequences.
    pub slice_prefix: Option<&'static str>,
    /// String framing; defaults to an 8-bit little-endian length prefix.
    pub string_type: Option<&'static str>,
    /// Conditional presence expression.
    pub include_if: Option<&'static str>,
}

/// The parsed, typed form of a field's annotations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub endian: Endian,
    pub field_width: Option<usize>,
    pub slice_prefix: Option<SlicePrefix>,
    pub string_shape: StringShape,
    pub include_if: Option<IncludeIf>,
}

impl Default for Descriptor {
    fn default() -> Self {
        Self {
            endian: Endian::Little,
            field_width: None,
            slice_prefix: None,
            string_shape: StringShape::default(),
            include_if: None,
        }
    }
}

/// Length-prefix layout for tuples and sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlicePrefix {
    pub width: usize,
    pub endian: Endian,
}

/// Wire framing for strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringShape {
    /// `0x00`-terminated, optionally padded to a fixed window in bytes.
    NullTerminated { padded_len: usize },
    /// Preceded by the byte length as an unsigned integer.
    LengthPrefixed { width: usize, endian: Endian },
}

impl Default for StringShape {
    fn default() -> Self {
        Self::LengthPrefixed {
            width: 8,
            endian: Endian::Little,
        }
    }
}

/// A conditional-presence expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeIf {
    /// Whether the path is rooted at the immediate parent rather than the
    /// top-level record.
    pub relative: bool,
    /// Field names, outermost first.
    pub path: Vec<&'static str>,
    pub op: Comparison,
    /// Comparand text, interpreted against the referenced field's kind.
    /// Absent means the kind's default (`true` for bool, `0` for unsigned).
    pub rhs: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equal,
    NotEqual,
}

impl Descriptor {
    /// Parses an annotation bundle, applying defaults for absent keys.
    pub fn parse(annotations: &Annotations) -> Result<Self, Error> {
        let endian = match annotations.endian {
            None => Endian::Little,
            Some(raw) => parse_endian(raw)?,
        };
        let field_width = annotations.field_width.map(parse_width).transpose()?;
        let slice_prefix = annotations.slice_prefix.map(parse_slice_prefix).transpose()?;
        let string_shape = match annotations.string_type {
            None => StringShape::default(),
            Some(raw) => parse_string_type(raw)?,
        };
        let include_if = annotations.include_if.map(parse_include_if).transpose()?;

        Ok(Self {
            endian,
            field_width,
            slice_prefix,
            string_shape,
            include_if,
        })
    }
}

fn parse_endian(raw: &str) -> Result<Endian, Error> {
    match raw {
        "little" => Ok(Endian::Little),
        "big" => Ok(Endian::Big),
        other => Err(Error::BadAnnotation(format!("unknown endian '{other}'"))),
    }
}

fn parse_width(raw: &str) -> Result<usize, Error> {
    raw.parse()
        .map_err(|_| Error::BadAnnotation(format!("invalid bit width '{raw}'")))
}

fn parse_slice_prefix(raw: &str) -> Result<SlicePrefix, Error> {
    let (width_raw, endian) = match raw.split_once(',') {
        None => (raw, Endian::Little),
        Some((width_raw, endian_raw)) => (width_raw, parse_endian(endian_raw)?),
    };
    Ok(SlicePrefix {
        width: parse_width(width_raw)?,
        endian,
    })
}

fn parse_string_type(raw: &str) -> Result<StringShape, Error> {
    let mut parts = raw.split(',');
    let shape = match parts.next() {
        Some("null") => {
            let padded_len = match parts.next() {
                None => 0,
                Some(pad) => pad
                    .parse()
                    .map_err(|_| Error::BadAnnotation(format!("invalid padding '{pad}'")))?,
            };
            StringShape::NullTerminated { padded_len }
        }
        Some("prefix") => {
            let width = match parts.next() {
                None => {
                    return Err(Error::BadAnnotation(
                        "prefix string framing requires a bit width".into(),
                    ))
                }
                Some(width_raw) => parse_width(width_raw)?,
            };
            let endian = match parts.next() {
                None => Endian::Little,
                Some(endian_raw) => parse_endian(endian_raw)?,
            };
            StringShape::LengthPrefixed { width, endian }
        }
        _ => {
            return Err(Error::BadAnnotation(format!(
                "unknown string framing '{raw}'"
            )))
        }
    };
    if parts.next().is_some() {
        return Err(Error::BadAnnotation(format!(
            "trailing items in string framing '{raw}'"
        )));
    }
    Ok(shape)
}

fn parse_include_if(raw: &'static str) -> Result<IncludeIf, Error> {
    let (expr, op, rhs) = if let Some(at) = raw.find("==") {
        (&raw[..at], Comparison::Equal, Some(&raw[at + 2..]))
    } else if let Some(at) = raw.find("!=") {
        (&raw[..at], Comparison::NotEqual, Some(&raw[at + 2..]))
    } else {
        (raw, Comparison::Equal, None)
    };

    // An empty comparand behaves as if none were written.
    let rhs = rhs.filter(|rhs| !rhs.is_empty());

    let (relative, path_raw) = match expr.strip_prefix('.') {
        Some(rest) => (false, rest),
        None => (true, expr),
    };
    if path_raw.is_empty() {
        return Err(Error::BadAnnotation(format!(
            "empty include path in '{raw}'"
        )));
    }
    let path: Vec<&'static str> = path_raw.split('.').collect();
    if path.iter().any(|segment| segment.is_empty()) {
        return Err(Error::BadAnnotation(format!(
            "empty segment in include path '{raw}'"
        )));
    }

    Ok(IncludeIf {
        relative,
        path,
        op,
        rhs,
    })
}
