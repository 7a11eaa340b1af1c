//! Bit- and byte-granular I/O over a byte sequence.
//!
//! # Overview
//!
//! [BitBuffer] is the single I/O primitive the codec is built on. It has two
//! modes of use: write-accumulating (created empty with [BitBuffer::new]) and
//! read-draining (wrapping input bytes with [BitBuffer::from_bytes]). Sub-byte
//! operations pack MSB-first: the next bit written lands at bit position
//! `7 - offset` of the in-flight byte, and the next bit read comes from bit 7
//! of the unread byte. Whole bytes bypass the bit path while the stream is
//! byte-aligned, with identical observable results.
//!
//! At any public boundary all bytes in the backing store are fully committed;
//! only the partial register holds unflushed bits. [BitBuffer::finish]
//! zero-pads a non-empty partial register on the LSB side.

mod int;
mod string;
mod uint;

use crate::Error;
use bytes::{BufMut, Bytes, BytesMut};

/// Bit-granular operations handle at most one byte at a time.
const MAX_BIT_OPERATION: usize = 8;

/// Byte order for multi-byte reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    /// Most significant byte first.
    Big,
    /// Least significant byte first.
    #[default]
    Little,
}

/// A stateful stream supporting sub-byte reads and writes.
///
/// A buffer is driven in one direction at a time: writes accumulate into the
/// backing store, reads drain the bytes the buffer was created from. The
/// partial register is shared between the two paths, so interleaving
/// directions mid-stream is not meaningful.
#[derive(Debug, Default)]
pub struct BitBuffer {
    /// Fully committed bytes.
    data: BytesMut,
    /// Read cursor into `data`.
    head: usize,
    /// In-flight bits, MSB-first.
    partial: u8,
    /// Write path: bits accumulated in `partial`. Read path: bits remaining.
    offset: u8,
}

impl BitBuffer {
    /// Creates an empty buffer for writing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a buffer draining the given bytes.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self {
            data: BytesMut::from(data),
            ..Self::default()
        }
    }

    /// Reads `count` bits (at most 8), MSB-first, into the low bits of the
    /// returned byte.
    ///
    /// Fails with [Error::TooManyBits] when `count > 8` and
    /// [Error::EndOfInput] when the input is exhausted.
    pub fn read_bits(&mut self, count: usize) -> Result<u8, Error> {
        if count > MAX_BIT_OPERATION {
            return Err(Error::TooManyBits(count));
        }

        // Fast path while byte-aligned.
        if self.offset == 0 && count == 8 {
            return self.next_byte();
        }

        let mut out = 0u8;
        for _ in 0..count {
            if self.offset == 0 {
                self.partial = self.next_byte()?;
                self.offset = 8;
            }

            let bit = self.partial & 0x80 == 0x80;
            self.partial <<= 1;
            self.offset -= 1;

            out <<= 1;
            if bit {
                out |= 1;
            }
        }

        Ok(out)
    }

    /// Writes the low `count` bits (at most 8) of `bits`, MSB-first.
    ///
    /// Fails with [Error::TooManyBits] when `count > 8`.
    pub fn write_bits(&mut self, bits: u8, count: usize) -> Result<(), Error> {
        if count > MAX_BIT_OPERATION {
            return Err(Error::TooManyBits(count));
        }
        if count == 0 {
            return Ok(());
        }

        // Fast path while byte-aligned.
        if self.offset == 0 && count == 8 {
            self.data.put_u8(bits);
            return Ok(());
        }

        let mask = 1u8 << (count - 1);
        let mut bits = bits;
        for _ in 0..count {
            let bit = bits & mask == mask;
            bits <<= 1;

            self.partial <<= 1;
            if bit {
                self.partial |= 0x01;
            }
            self.offset += 1;

            if self.offset == 8 {
                self.data.put_u8(self.partial);
                self.partial = 0;
                self.offset = 0;
            }
        }

        Ok(())
    }

    /// Reads one whole byte.
    pub fn read_byte(&mut self) -> Result<u8, Error> {
        self.read_bits(8)
    }

    /// Writes one whole byte.
    pub fn write_byte(&mut self, byte: u8) -> Result<(), Error> {
        self.write_bits(byte, 8)
    }

    /// Finalizes the stream and returns the committed bytes.
    ///
    /// A non-empty partial register is flushed as one final byte, zero-padded
    /// on the LSB side.
    pub fn finish(mut self) -> Bytes {
        if self.offset != 0 {
            let _ = self.write_bits(0, 8 - self.offset as usize);
        }
        self.data.freeze()
    }

    fn next_byte(&mut self) -> Result<u8, Error> {
        if self.head >= self.data.len() {
            return Err(Error::EndOfInput);
        }
        let byte = self.data[self.head];
        self.head += 1;
        Ok(byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_many_bits() {
        let mut bb = BitBuffer::new();
        assert_eq!(bb.write_bits(0x00, 9), Err(Error::TooManyBits(9)));

        let mut bb = BitBuffer::from_bytes(&[0xff, 0xff]);
        assert_eq!(bb.read_bits(9), Err(Error::TooManyBits(9)));
    }

    #[test]
    fn test_whole_bytes() {
        let mut bb = BitBuffer::new();
        bb.write_byte(0xaa).unwrap();
        bb.write_byte(0xdd).unwrap();
        assert_eq!(bb.finish(), Bytes::from_static(&[0xaa, 0xdd]));
    }

    #[test]
    fn test_bits_then_byte() {
        // Two 2-bit writes leave the stream mid-byte; the following byte
        // straddles the boundary.
        let mut bb = BitBuffer::new();
        bb.write_bits(0x01, 2).unwrap();
        bb.write_bits(0x02, 2).unwrap();
        bb.write_byte(0xaa).unwrap();
        assert_eq!(bb.finish(), Bytes::from_static(&[0x6a, 0xa0]));
    }

    #[test]
    fn test_finish_pads_lsb_side() {
        let mut bb = BitBuffer::new();
        bb.write_bits(0b101, 3).unwrap();
        bb.write_bits(0b101, 3).unwrap();
        assert_eq!(bb.finish(), Bytes::from_static(&[0b1011_0100]));
    }

    #[test]
    fn test_read_bits_across_boundary() {
        let mut bb = BitBuffer::from_bytes(&[0b1011_0110, 0x00, 0x01]);
        assert_eq!(bb.read_bits(6).unwrap(), 0b10_1101);
        assert_eq!(bb.read_bits(2).unwrap(), 0b10);
        assert_eq!(bb.read_byte().unwrap(), 0x00);
        assert_eq!(bb.read_byte().unwrap(), 0x01);
        assert_eq!(bb.read_byte(), Err(Error::EndOfInput));
    }

    #[test]
    fn test_single_bit_reads_match_byte_reads() {
        let data = [0xa5, 0x3c];
        let mut bits = BitBuffer::from_bytes(&data);
        let mut collected = 0u16;
        for _ in 0..16 {
            collected = collected << 1 | u16::from(bits.read_bits(1).unwrap());
        }
        assert_eq!(collected, 0xa53c);
    }

    #[test]
    fn test_read_past_end_mid_byte() {
        let mut bb = BitBuffer::from_bytes(&[0xff]);
        assert_eq!(bb.read_bits(5).unwrap(), 0b1_1111);
        assert_eq!(bb.read_bits(3).unwrap(), 0b111);
        assert_eq!(bb.read_bits(1), Err(Error::EndOfInput));
    }

    #[test]
    fn test_bit_round_trip_at_all_alignments() {
        // Shift a 5-bit value through every starting alignment.
        for lead in 0..8usize {
            let mut bb = BitBuffer::new();
            if lead > 0 {
                bb.write_bits(0, lead).unwrap();
            }
            bb.write_bits(0b10110, 5).unwrap();
            let bytes = bb.finish();

            let mut bb = BitBuffer::from_bytes(&bytes);
            if lead > 0 {
                bb.read_bits(lead).unwrap();
            }
            assert_eq!(bb.read_bits(5).unwrap(), 0b10110, "lead {lead}");
        }
    }

    #[test]
    fn test_randomized_round_trip() {
        use rand::{rngs::StdRng, Rng, SeedableRng};

        // Deterministic sweep over random widths and values at arbitrary
        // alignments.
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let mut widths = Vec::new();
            let mut values = Vec::new();
            let mut bb = BitBuffer::new();
            for _ in 0..rng.random_range(1..32) {
                let width = rng.random_range(1..=8usize);
                let value = rng.random_range(0..=u8::MAX) >> (8 - width);
                bb.write_bits(value, width).unwrap();
                widths.push(width);
                values.push(value);
            }
            let bytes = bb.finish();

            let mut bb = BitBuffer::from_bytes(&bytes);
            for (width, value) in widths.iter().zip(values.iter()) {
                assert_eq!(bb.read_bits(*width).unwrap(), *value);
            }
        }
    }
}
