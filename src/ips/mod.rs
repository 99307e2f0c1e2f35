// IPS format implementation.
//
// This module provides encoding and decoding of the IPS patch format
// ("PATCH" signature, 24-bit offsets, 16-bit lengths, "EOF" terminator)
// and the diff algorithm producing minimal record lists.
//
// # Modules
//
// - `cursor`   — Big-endian byte reader/writer with a tracked position
// - `chunk`    — Chunk value type and format constants
// - `chunkify` — Forward-scan diff with copy/run cost accumulators
// - `patch`    — Patch container: encode, decode, apply

pub mod chunk;
pub mod chunkify;
pub mod cursor;
pub mod patch;

// Re-export key types for convenience.
pub use chunk::{Chunk, EOF_MARKER, EOF_OFFSET, MAX_CHUNK_LEN, MAX_OFFSET, SIGNATURE};
pub use chunkify::chunkify;
pub use patch::{EncodeError, ParseError, Patch};
