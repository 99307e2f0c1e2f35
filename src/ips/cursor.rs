// Sequential big-endian cursor over a byte buffer.
//
// All IPS integers are big-endian: 24-bit offsets, 16-bit lengths,
// the optional 24-bit truncation tail. `ByteReader` tracks a position
// into a borrowed slice and reports underflow instead of panicking;
// `ByteWriter` appends to an owned buffer.

use thiserror::Error;

/// A read past the end of the input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unexpected end of input: {needed} bytes needed, {remaining} remaining")]
pub struct Underflow {
    pub needed: usize,
    pub remaining: usize,
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Big-endian reader with a tracked position.
#[derive(Debug)]
pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes left between the position and the end of the buffer.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Take the next `n` bytes as a slice.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8], Underflow> {
        if self.remaining() < n {
            return Err(Underflow {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8, Underflow> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, Underflow> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub fn read_u24(&mut self) -> Result<u32, Underflow> {
        let b = self.take(3)?;
        Ok((b[0] as u32) << 16 | (b[1] as u32) << 8 | b[2] as u32)
    }

    /// Consume `expected.len()` bytes and report whether they match.
    pub fn matches(&mut self, expected: &[u8]) -> Result<bool, Underflow> {
        Ok(self.take(expected.len())? == expected)
    }
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Big-endian writer appending to an owned buffer.
#[derive(Debug, Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            buf: Vec::with_capacity(cap),
        }
    }

    #[inline]
    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    #[inline]
    pub fn write_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Write the low 24 bits of `value`. Callers validate the range.
    #[inline]
    pub fn write_u24(&mut self, value: u32) {
        self.buf
            .extend_from_slice(&[(value >> 16) as u8, (value >> 8) as u8, value as u8]);
    }

    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
