// File-level helpers for creating and applying IPS patches.
//
// Wraps the in-memory engine with whole-file reads and writes (IPS
// buffers are bounded by the 24-bit address space, so streaming buys
// nothing here). Optionally computes SHA-256 digests for the stats
// structs (feature-gated behind `file-io`).

use std::fs;
use std::io;
use std::path::Path;

use log::info;
use thiserror::Error;

#[cfg(feature = "file-io")]
use sha2::{Digest, Sha256};

use crate::engine;
use crate::ips::patch::{EncodeError, ParseError, Patch};
use crate::ips::Chunk;

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by [`create_file`].
#[derive(Debug, Clone)]
pub struct CreateStats {
    /// Original file size in bytes.
    pub original_size: u64,
    /// Modified file size in bytes.
    pub modified_size: u64,
    /// Patch output size in bytes.
    pub patch_size: u64,
    /// Number of records in the patch.
    pub chunks: usize,
    /// Truncation length recorded in the patch, if any.
    pub truncate: Option<u32>,
    /// SHA-256 of the modified file (if `file-io` is enabled).
    pub modified_sha256: Option<[u8; 32]>,
}

/// Statistics returned by [`apply_files`].
#[derive(Debug, Clone)]
pub struct ApplyStats {
    /// Input file size in bytes.
    pub input_size: u64,
    /// Patched output size in bytes.
    pub output_size: u64,
    /// Number of patches applied.
    pub patches: usize,
    /// SHA-256 of the patched output (if `file-io` is enabled).
    pub output_sha256: Option<[u8; 32]>,
}

#[cfg(feature = "file-io")]
fn sha256(data: &[u8]) -> Option<[u8; 32]> {
    Some(Sha256::digest(data).into())
}

#[cfg(not(feature = "file-io"))]
fn sha256(_data: &[u8]) -> Option<[u8; 32]> {
    None
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for file operations.
#[derive(Debug, Error)]
pub enum IoError {
    /// I/O error (file open, read, write).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Patch serialization error.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),
    /// Patch parsing error.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Diff `original` against `modified` and write the IPS patch to `output`.
pub fn create_file(
    original: &Path,
    modified: &Path,
    output: &Path,
) -> Result<CreateStats, IoError> {
    let original_data = fs::read(original)?;
    let modified_data = fs::read(modified)?;

    let patch = Patch::from_buffers(&original_data, &modified_data);
    let bytes = patch.to_bytes()?;
    fs::write(output, &bytes)?;

    info!(
        "created {}: {} records, {} bytes",
        output.display(),
        patch.chunks().len(),
        bytes.len()
    );
    Ok(CreateStats {
        original_size: original_data.len() as u64,
        modified_size: modified_data.len() as u64,
        patch_size: bytes.len() as u64,
        chunks: patch.chunks().len(),
        truncate: patch.truncate(),
        modified_sha256: sha256(&modified_data),
    })
}

/// Apply `patches` to `input` in order and write the result to `output`.
pub fn apply_files(input: &Path, output: &Path, patches: &[&Path]) -> Result<ApplyStats, IoError> {
    let input_data = fs::read(input)?;

    let mut patch_data = Vec::with_capacity(patches.len());
    for path in patches {
        patch_data.push(fs::read(path)?);
    }
    let patch_refs: Vec<&[u8]> = patch_data.iter().map(Vec::as_slice).collect();

    let output_data = engine::apply(&input_data, &patch_refs)?;
    fs::write(output, &output_data)?;

    info!(
        "applied {} patches: {} -> {} bytes",
        patches.len(),
        input_data.len(),
        output_data.len()
    );
    Ok(ApplyStats {
        input_size: input_data.len() as u64,
        output_size: output_data.len() as u64,
        patches: patches.len(),
        output_sha256: sha256(&output_data),
    })
}

/// Parse an IPS file into its chunk list.
pub fn parse_file(patch: &Path) -> Result<Vec<Chunk>, IoError> {
    let data = fs::read(patch)?;
    Ok(engine::parse(&data)?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
