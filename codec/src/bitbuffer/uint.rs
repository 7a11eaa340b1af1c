//! Unsigned integer reads and writes at arbitrary widths.

use super::{BitBuffer, Endian};
use crate::Error;

impl BitBuffer {
    /// Reads an unsigned integer of `width` bits.
    ///
    /// Widths under 8 use the bit path and ignore `endian`; wider widths must
    /// be a whole number of bytes ([Error::NonByteAlignedWidth]) and walk the
    /// bytes in the order `endian` dictates.
    pub fn read_uint(&mut self, endian: Endian, width: usize) -> Result<u64, Error> {
        if width < 8 {
            return self.read_bits(width).map(u64::from);
        }
        if width % 8 != 0 {
            return Err(Error::NonByteAlignedWidth(width));
        }

        let count = width / 8;
        let mut value = 0u64;
        for i in 0..count {
            let byte = self.read_byte()?;
            let shift = match endian {
                Endian::Big => (count - i - 1) * 8,
                Endian::Little => i * 8,
            };
            // Bytes shifted beyond 64 bits carry no value.
            if let Some(part) = u64::from(byte).checked_shl(shift as u32) {
                value |= part;
            }
        }

        Ok(value)
    }

    /// Writes `value` as an unsigned integer of `width` bits.
    ///
    /// Fails with [Error::ValueExceedsWidth] when `value` does not fit, and
    /// otherwise follows the width rules of [BitBuffer::read_uint].
    pub fn write_uint(&mut self, value: u64, endian: Endian, width: usize) -> Result<(), Error> {
        if width < 64 && value >> width != 0 {
            return Err(Error::ValueExceedsWidth { value, width });
        }

        if width < 8 {
            return self.write_bits(value as u8, width);
        }
        if width % 8 != 0 {
            return Err(Error::NonByteAlignedWidth(width));
        }

        let count = width / 8;
        for i in 0..count {
            let shift = match endian {
                Endian::Big => (count - i - 1) * 8,
                Endian::Little => i * 8,
            };
            let byte = value.checked_shr(shift as u32).unwrap_or(0) as u8;
            self.write_byte(byte)?;
        }

        Ok(())
    }
}
