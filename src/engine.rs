// High-level IPS operations over in-memory buffers.
//
// The three-operation surface consumed by hosts and the CLI:
//   - `create`: diff two buffers into IPS bytes
//   - `apply`:  replay one or more IPS patches onto a target buffer
//   - `parse`:  expose the chunk list of an IPS byte stream

use crate::ips::patch::{EncodeError, ParseError, Patch};
use crate::ips::{Chunk, chunkify};

/// Build an IPS patch transforming `original` into `modified`.
pub fn create(original: &[u8], modified: &[u8]) -> Result<Vec<u8>, EncodeError> {
    Patch::from_buffers(original, modified).to_bytes()
}

/// Apply `patches` to `target` in order, returning the patched buffer.
///
/// The buffer is zero-extended as needed; applications do not commute,
/// so callers pick the order. Truncation metadata in the patches is not
/// applied to the output.
pub fn apply(target: &[u8], patches: &[&[u8]]) -> Result<Vec<u8>, ParseError> {
    let mut output = target.to_vec();
    for bytes in patches {
        Patch::parse(bytes)?.apply(&mut output);
    }
    Ok(output)
}

/// Parse an IPS byte stream into its ordered chunk list.
pub fn parse(patch: &[u8]) -> Result<Vec<Chunk>, ParseError> {
    Ok(Patch::parse(patch)?.chunks().to_vec())
}

/// Diff two buffers into chunks without serializing.
pub fn diff(original: &[u8], modified: &[u8]) -> Vec<Chunk> {
    chunkify(original, modified)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
