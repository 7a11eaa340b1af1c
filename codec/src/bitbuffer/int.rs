//! Signed integer reads and writes.
//!
//! Low-level only: the schema-driven codec does not expose signed fields,
//! but user codecs composing on [BitBuffer] directly may need them.

use super::{BitBuffer, Endian};
use crate::Error;

impl BitBuffer {
    /// Reads a two's-complement signed integer of `width` bits, sign-extended
    /// to 64 bits.
    ///
    /// `width` must be a whole number of bytes.
    pub fn read_int(&mut self, endian: Endian, width: usize) -> Result<i64, Error> {
        if width % 8 != 0 {
            return Err(Error::NonByteAlignedWidth(width));
        }

        let raw = self.read_uint(endian, width)?;
        let unused = 64usize.saturating_sub(width) as u32;
        Ok((raw as i64).wrapping_shl(unused).wrapping_shr(unused))
    }

    /// Writes the low `width` bits of a two's-complement signed integer.
    ///
    /// `width` must be a whole number of bytes.
    pub fn write_int(&mut self, value: i64, endian: Endian, width: usize) -> Result<(), Error> {
        if width % 8 != 0 {
            return Err(Error::NonByteAlignedWidth(width));
        }

        let count = width / 8;
        for i in 0..count {
            let shift = match endian {
                Endian::Big => (count - i - 1) * 8,
                Endian::Little => i * 8,
            };
            // Shifts past the sign bit repeat it, matching arithmetic shift
            // semantics for oversized widths.
            let byte = value.wrapping_shr((shift as u32).min(63)) as u8;
            self.write_byte(byte)?;
        }

        Ok(())
    }
}
