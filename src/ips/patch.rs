// IPS patch container: serialization, parsing, and replay.
//
// Wire layout (all integers big-endian):
//
//   "PATCH"
//   repeated records:
//     3-byte offset
//     2-byte length  -- nonzero: that many literal bytes follow
//                    -- zero:    2-byte run length + 1-byte run value
//   "EOF"
//   optional 3-byte truncation length (present iff exactly 3 bytes remain)

use log::debug;
use thiserror::Error;

use super::chunk::{Chunk, EOF_MARKER, EOF_OFFSET, MAX_CHUNK_LEN, MAX_OFFSET, SIGNATURE};
use super::chunkify::chunkify;
use super::cursor::{ByteReader, ByteWriter, Underflow};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error parsing an IPS byte stream.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The stream does not begin with the "PATCH" signature.
    #[error("invalid IPS signature (expected \"PATCH\")")]
    Signature,
    /// Bytes remain after the terminator that are neither empty nor
    /// exactly a 3-byte truncation field.
    #[error("IPS stream contains {0} bytes of invalid trailing data")]
    TrailingData(usize),
    /// The stream ended in the middle of a record.
    #[error(transparent)]
    Truncated(#[from] Underflow),
}

/// Error serializing a chunk list.
///
/// The chunkifier never produces chunks that violate the format limits;
/// these checks guard externally assembled lists.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("chunk offset {0:#08X} exceeds the 24-bit offset field")]
    OffsetOverflow(u32),
    #[error("chunk length {0} outside the encodable range 1..=0xFFFF")]
    LengthOverflow(u32),
    #[error("chunk offset 0x454F46 is reserved for the EOF terminator")]
    ReservedOffset,
}

// ---------------------------------------------------------------------------
// Patch
// ---------------------------------------------------------------------------

/// A parsed or freshly built IPS patch: an ordered chunk list, the
/// literal bytes backing its copy chunks, and the optional truncation
/// length. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct Patch {
    chunks: Vec<Chunk>,
    truncate: Option<u32>,
    /// Literal store indexed by absolute target offset. Offsets not
    /// covered by any copy chunk read as 0.
    data: Vec<u8>,
}

impl Patch {
    /// Diff `original` against `modified` and build the patch that
    /// rewrites one into the other.
    pub fn from_buffers(original: &[u8], modified: &[u8]) -> Self {
        let chunks = chunkify(original, modified);
        let truncate = (modified.len() < original.len()).then(|| modified.len() as u32);
        Self {
            chunks,
            truncate,
            data: modified.to_vec(),
        }
    }

    /// Assemble a patch from an externally built chunk list. `data` is
    /// indexed by absolute target offset; bytes it does not cover read
    /// as 0. Format limits are enforced at [`Patch::to_bytes`] time.
    pub fn new(chunks: Vec<Chunk>, data: Vec<u8>, truncate: Option<u32>) -> Self {
        Self {
            chunks,
            truncate,
            data,
        }
    }

    /// The ordered chunk list.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Intended final size when the patch shrinks its target, if any.
    pub fn truncate(&self) -> Option<u32> {
        self.truncate
    }

    #[inline]
    fn literal_byte(&self, offset: usize) -> u8 {
        self.data.get(offset).copied().unwrap_or(0)
    }

    // -----------------------------------------------------------------------
    // Decode
    // -----------------------------------------------------------------------

    /// Parse an IPS byte stream.
    pub fn parse(bytes: &[u8]) -> Result<Self, ParseError> {
        let mut reader = ByteReader::new(bytes);
        if !reader.matches(&SIGNATURE)? {
            return Err(ParseError::Signature);
        }

        let mut chunks = Vec::new();
        let mut data = Vec::new();

        loop {
            let offset = reader.read_u24()?;
            if offset == EOF_OFFSET {
                break;
            }

            let length = reader.read_u16()?;
            if length != 0 {
                let end = offset + length as u32;
                let literal = reader.take(length as usize)?;
                if data.len() < end as usize {
                    data.resize(end as usize, 0);
                }
                data[offset as usize..end as usize].copy_from_slice(literal);
                chunks.push(Chunk::copy(offset, end));
            } else {
                let repeat = reader.read_u16()?;
                let value = reader.read_u8()?;
                chunks.push(Chunk::run(offset, offset + repeat as u32, value));
            }
        }

        let truncate = if reader.remaining() == 3 {
            Some(reader.read_u24()?)
        } else {
            None
        };
        if reader.remaining() != 0 {
            return Err(ParseError::TrailingData(reader.remaining()));
        }

        debug!(
            "parsed IPS stream: {} chunks, truncate={:?}",
            chunks.len(),
            truncate
        );
        Ok(Self {
            chunks,
            truncate,
            data,
        })
    }

    // -----------------------------------------------------------------------
    // Encode
    // -----------------------------------------------------------------------

    /// Serialize to IPS bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        let body: usize = self.chunks.iter().map(Chunk::wire_size).sum();
        let tail = if self.truncate.is_some() { 3 } else { 0 };
        let mut writer = ByteWriter::with_capacity(SIGNATURE.len() + body + EOF_MARKER.len() + tail);

        writer.write_bytes(&SIGNATURE);
        for chunk in &self.chunks {
            self.write_chunk(&mut writer, chunk)?;
        }
        writer.write_bytes(&EOF_MARKER);
        if let Some(len) = self.truncate {
            writer.write_u24(len);
        }

        Ok(writer.into_inner())
    }

    fn write_chunk(&self, writer: &mut ByteWriter, chunk: &Chunk) -> Result<(), EncodeError> {
        if chunk.start > MAX_OFFSET {
            return Err(EncodeError::OffsetOverflow(chunk.start));
        }
        if chunk.start == EOF_OFFSET {
            return Err(EncodeError::ReservedOffset);
        }
        if chunk.is_empty() || chunk.len() > MAX_CHUNK_LEN {
            return Err(EncodeError::LengthOverflow(chunk.len()));
        }

        writer.write_u24(chunk.start);
        match chunk.run {
            Some(value) => {
                writer.write_u16(0);
                writer.write_u16(chunk.len() as u16);
                writer.write_u8(value);
            }
            None => {
                writer.write_u16(chunk.len() as u16);
                let (start, end) = (chunk.start as usize, chunk.end as usize);
                if self.data.len() >= end {
                    writer.write_bytes(&self.data[start..end]);
                } else {
                    for offset in start..end {
                        writer.write_u8(self.literal_byte(offset));
                    }
                }
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Apply
    // -----------------------------------------------------------------------

    /// Replay the chunk list onto `target`, zero-extending it first if
    /// it is shorter than the largest chunk end.
    ///
    /// The truncation length is metadata only: it is never applied to
    /// the output here, mirroring the encode/decode asymmetry of the
    /// format's reference tooling.
    pub fn apply(&self, target: &mut Vec<u8>) {
        let min_size = self
            .chunks
            .iter()
            .map(|chunk| chunk.end as usize)
            .max()
            .unwrap_or(0);
        if target.len() < min_size {
            target.resize(min_size, 0);
        }

        for chunk in &self.chunks {
            let (start, end) = (chunk.start as usize, chunk.end as usize);
            match chunk.run {
                Some(value) => target[start..end].fill(value),
                None if self.data.len() >= end => {
                    target[start..end].copy_from_slice(&self.data[start..end]);
                }
                None => {
                    for (offset, slot) in target[start..end].iter_mut().enumerate() {
                        *slot = self.literal_byte(start + offset);
                    }
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
