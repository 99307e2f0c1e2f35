// IPS chunk model and format constants.
//
// An IPS patch is an ordered list of records, each replacing one byte
// range of the target: either a literal-copy record (raw bytes) or a
// run-length record (one repeated byte). Both are represented here by
// `Chunk`; a run record carries `Some(value)` in its `run` field.

/// 5-byte format signature at offset 0 of every IPS file.
pub const SIGNATURE: [u8; 5] = *b"PATCH";

/// 3-byte terminator marking the end of the record stream.
pub const EOF_MARKER: [u8; 3] = *b"EOF";

/// The terminator interpreted as a big-endian 24-bit offset (0x454F46).
///
/// This value is reserved: no record may start here, since the decoder
/// would read it as end-of-stream. Encoders shift such a start back by
/// one byte instead.
pub const EOF_OFFSET: u32 =
    (EOF_MARKER[0] as u32) << 16 | (EOF_MARKER[1] as u32) << 8 | EOF_MARKER[2] as u32;

/// Maximum byte length of a single record (16-bit length field).
pub const MAX_CHUNK_LEN: u32 = 0xFFFF;

/// Maximum record offset (24-bit offset field).
pub const MAX_OFFSET: u32 = (1 << 24) - 1;

/// One patch record: the half-open target range `[start, end)`, plus the
/// repeated byte value for run-length records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    /// Absolute target offset of the first patched byte.
    pub start: u32,
    /// Absolute target offset one past the last patched byte.
    pub end: u32,
    /// `Some(value)` for a run-length record, `None` for a literal copy.
    pub run: Option<u8>,
}

impl Chunk {
    /// A literal-copy chunk over `[start, end)`.
    #[inline]
    pub fn copy(start: u32, end: u32) -> Self {
        Self {
            start,
            end,
            run: None,
        }
    }

    /// A run-length chunk filling `[start, end)` with `value`.
    #[inline]
    pub fn run(start: u32, end: u32, value: u8) -> Self {
        Self {
            start,
            end,
            run: Some(value),
        }
    }

    /// Number of target bytes covered by this chunk. Saturates to 0 for
    /// inverted ranges, which serialization rejects as empty.
    #[inline]
    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Encoded size in bytes: a run record is a fixed 8 bytes
    /// (3 offset + 2 zero + 2 length + 1 value); a copy record is
    /// 5 bytes of header plus its literal payload.
    #[inline]
    pub fn wire_size(&self) -> usize {
        if self.run.is_some() {
            8
        } else {
            5 + self.len() as usize
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
