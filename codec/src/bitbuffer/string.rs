//! String framing: null-terminated and length-prefixed.

use super::{BitBuffer, Endian};
use crate::Error;

impl BitBuffer {
    /// Writes a null-terminated string.
    ///
    /// With `padded_len == 0` the string is followed by a single `0x00`
    /// sentinel. With `padded_len > 0` the string plus terminator must fit in
    /// `padded_len` bytes ([Error::StringTooLarge] otherwise) and the window
    /// is filled out with `0x00`.
    pub fn write_string_null_terminated(
        &mut self,
        data: &str,
        padded_len: usize,
    ) -> Result<(), Error> {
        let bytes = data.as_bytes();
        if padded_len > 0 && bytes.len() + 1 > padded_len {
            return Err(Error::StringTooLarge {
                len: bytes.len(),
                max: padded_len - 1,
            });
        }

        for &byte in bytes {
            self.write_byte(byte)?;
        }
        self.write_byte(0)?;
        if padded_len > 0 {
            for _ in 0..padded_len - bytes.len() - 1 {
                self.write_byte(0)?;
            }
        }

        Ok(())
    }

    /// Reads a null-terminated string.
    ///
    /// With `padded_len == 0` bytes are consumed until a `0x00` sentinel.
    /// With `padded_len > 0` the terminator must appear within the window
    /// ([Error::UnterminatedString] otherwise) and the remainder of the
    /// window is consumed and discarded.
    pub fn read_string_null_terminated(&mut self, padded_len: usize) -> Result<String, Error> {
        let mut out = Vec::new();

        if padded_len == 0 {
            loop {
                let byte = self.read_byte()?;
                if byte == 0 {
                    break;
                }
                out.push(byte);
            }
            return into_string(out);
        }

        let mut consumed = 0;
        let mut terminated = false;
        while consumed < padded_len {
            let byte = self.read_byte()?;
            consumed += 1;
            if byte == 0 {
                terminated = true;
                break;
            }
            out.push(byte);
        }
        if !terminated {
            return Err(Error::UnterminatedString);
        }
        while consumed < padded_len {
            self.read_byte()?;
            consumed += 1;
        }

        into_string(out)
    }

    /// Writes a string preceded by its byte length as an unsigned integer of
    /// `prefix_width` bits.
    ///
    /// Fails with [Error::StringTooLarge] when the length cannot be
    /// represented by the prefix.
    pub fn write_string_length_prefixed(
        &mut self,
        data: &str,
        endian: Endian,
        prefix_width: usize,
    ) -> Result<(), Error> {
        let bytes = data.as_bytes();
        let max = max_for_width(prefix_width);
        if bytes.len() as u64 > max {
            return Err(Error::StringTooLarge {
                len: bytes.len(),
                max: max as usize,
            });
        }

        self.write_uint(bytes.len() as u64, endian, prefix_width)?;
        for &byte in bytes {
            self.write_byte(byte)?;
        }

        Ok(())
    }

    /// Reads a string preceded by its byte length as an unsigned integer of
    /// `prefix_width` bits.
    pub fn read_string_length_prefixed(
        &mut self,
        endian: Endian,
        prefix_width: usize,
    ) -> Result<String, Error> {
        let len = self.read_uint(endian, prefix_width)?;
        let mut out = Vec::new();
        for _ in 0..len {
            out.push(self.read_byte()?);
        }
        into_string(out)
    }
}

/// Largest length representable by a prefix of `width` bits.
fn max_for_width(width: usize) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

fn into_string(bytes: Vec<u8>) -> Result<String, Error> {
    String::from_utf8(bytes).map_err(|_| Error::InvalidUtf8)
}
