//! Bit-level I/O over byte streams.
//!
//! `BitWriter` and `BitReader` wrap any `std::io::Write` / `std::io::Read`
//! and move bits MSB-first (most significant bit first), which is the order
//! the compressed format is defined in.
//!
//! # Padding Rules
//! - BitWriter: `flush` pads an incomplete byte with trailing zeros
//! - BitReader: padding bits are indistinguishable from data; the decoder
//!   stops on the end-of-message codeword and never looks at them
//!
//! Neither side buffers whole blocks: the writer emits each byte as soon as
//! it completes and the reader pulls one byte at a time, so the inner stream
//! position always matches the bit position rounded up. Wrap files in
//! `BufReader`/`BufWriter`.
//!
//! # Example
//! ```
//! use huffpress_core::bitio::{BitWriter, BitReader};
//!
//! let mut writer = BitWriter::new(Vec::new());
//! writer.write_bits(0b101, 3).unwrap();  // Write 3 bits: 1, 0, 1
//! writer.write_bits(0b11, 2).unwrap();   // Write 2 bits: 1, 1
//! // Total: 10111 -> padded to 10111000
//!
//! let bytes = writer.into_inner().unwrap();
//! assert_eq!(bytes, vec![0b10111000]);
//!
//! let mut reader = BitReader::new(&bytes[..]);
//! assert_eq!(reader.read_bits(3).unwrap(), 0b101);
//! assert_eq!(reader.read_bits(2).unwrap(), 0b11);
//! ```

use std::io::{self, Read, Write};

use crate::error::{BitIoError, Result};

/// Writes bits MSB-first into a byte stream.
///
/// # Invariants
/// - `bit_buffer` holds up to 7 pending bits, MSB-aligned
/// - `bit_count` is always < 8
#[derive(Debug)]
pub struct BitWriter<W: Write> {
    inner: W,
    /// Accumulator for the current partial byte (MSB-aligned)
    bit_buffer: u8,
    /// Number of bits in bit_buffer (0-7)
    bit_count: u8,
    /// Complete bytes handed to `inner`
    bytes_written: u64,
}

impl<W: Write> BitWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            bit_buffer: 0,
            bit_count: 0,
            bytes_written: 0,
        }
    }

    /// Write a single bit.
    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        if bit {
            self.bit_buffer |= 1 << (7 - self.bit_count);
        }
        self.bit_count += 1;
        if self.bit_count == 8 {
            self.emit_byte()?;
        }
        Ok(())
    }

    /// Write up to 64 bits.
    ///
    /// Bits are written MSB-first: value=0b101 with count=3 writes 1, 0, 1.
    /// Only the lowest `count` bits of `value` are used.
    ///
    /// # Errors
    /// Returns `BitIoError::InvalidBitCount` if count > 64.
    pub fn write_bits(&mut self, value: u64, count: usize) -> Result<()> {
        if count > 64 {
            return Err(BitIoError::InvalidBitCount(count).into());
        }

        let mut remaining = count;
        let mut val = value;

        while remaining > 0 {
            // How many bits fit in the current byte?
            let bits_to_write = remaining.min(8 - self.bit_count as usize);

            // Extract the top bits_to_write bits of what is left
            let shift = remaining - bits_to_write;
            let bits = ((val >> shift) & ((1u64 << bits_to_write) - 1)) as u8;

            self.bit_buffer |= bits << (8 - self.bit_count as usize - bits_to_write);
            self.bit_count += bits_to_write as u8;

            if self.bit_count == 8 {
                self.emit_byte()?;
            }

            // Clear the bits just written
            val &= (1u64 << shift) - 1;
            remaining -= bits_to_write;
        }

        Ok(())
    }

    /// Pad the partial byte (if any) with zeros, write it, and flush the
    /// inner writer.
    ///
    /// Flushing on a byte boundary adds nothing, so calling this twice is
    /// harmless.
    pub fn flush(&mut self) -> Result<()> {
        if !self.is_aligned() {
            self.emit_byte()?;
        }
        self.inner.flush()?;
        Ok(())
    }

    /// Flush and return the inner writer.
    pub fn into_inner(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.inner)
    }

    /// Total number of bits written, including the pending partial byte.
    pub fn bits_written(&self) -> u64 {
        self.bytes_written * 8 + self.bit_count as u64
    }

    /// True if the next bit starts a fresh byte.
    pub fn is_aligned(&self) -> bool {
        self.bit_count == 0
    }

    fn emit_byte(&mut self) -> io::Result<()> {
        self.inner.write_all(&[self.bit_buffer])?;
        self.bytes_written += 1;
        self.bit_buffer = 0;
        self.bit_count = 0;
        Ok(())
    }
}

/// Reads bits MSB-first from a byte stream.
///
/// # Invariants
/// - `bits_left` is the number of unread bits in `current` (0-8)
#[derive(Debug)]
pub struct BitReader<R: Read> {
    inner: R,
    /// Byte currently being consumed
    current: u8,
    /// Unread bits remaining in `current`
    bits_left: u8,
    /// Total bits handed out so far
    bits_read: u64,
}

impl<R: Read> BitReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            current: 0,
            bits_left: 0,
            bits_read: 0,
        }
    }

    /// Read a single bit.
    ///
    /// # Errors
    /// `BitIoError::UnexpectedEof` if the stream is exhausted.
    pub fn read_bit(&mut self) -> Result<bool> {
        if self.bits_left == 0 {
            self.current = self.next_byte()?;
            self.bits_left = 8;
        }
        self.bits_left -= 1;
        self.bits_read += 1;
        Ok((self.current >> self.bits_left) & 1 == 1)
    }

    /// Read up to 64 bits, MSB-first.
    ///
    /// Reading 3 bits from byte 0b10110000 returns 0b101.
    ///
    /// # Errors
    /// - `BitIoError::InvalidBitCount` if count > 64
    /// - `BitIoError::UnexpectedEof` if the stream ends first
    pub fn read_bits(&mut self, count: usize) -> Result<u64> {
        if count > 64 {
            return Err(BitIoError::InvalidBitCount(count).into());
        }

        let mut result = 0u64;
        let mut remaining = count;

        while remaining > 0 {
            if self.bits_left == 0 {
                self.current = self.next_byte()?;
                self.bits_left = 8;
            }

            let bits_to_read = remaining.min(self.bits_left as usize);
            let mask = ((1u16 << bits_to_read) - 1) as u8;
            let bits = (self.current >> (self.bits_left as usize - bits_to_read)) & mask;

            result = (result << bits_to_read) | bits as u64;

            self.bits_left -= bits_to_read as u8;
            self.bits_read += bits_to_read as u64;
            remaining -= bits_to_read;
        }

        Ok(result)
    }

    /// Total number of bits consumed so far.
    pub fn bits_read(&self) -> u64 {
        self.bits_read
    }

    /// Return the inner reader. Unread bits of a partially consumed byte are
    /// dropped.
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn next_byte(&mut self) -> Result<u8> {
        let mut byte = [0u8; 1];
        loop {
            match self.inner.read(&mut byte) {
                Ok(0) => return Err(BitIoError::UnexpectedEof.into()),
                Ok(_) => return Ok(byte[0]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}
