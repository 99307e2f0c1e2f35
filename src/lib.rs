//! Oxips: IPS patch encoding/decoding in Rust.
//!
//! The crate provides:
//! - A pure-Rust IPS engine (`ips`): diffing, serialization, replay
//! - High-level buffer APIs (`engine`)
//! - File-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```
//! use oxips::engine;
//!
//! let original = b"hello old world";
//! let modified = b"hello new world";
//!
//! let patch = engine::create(original, modified).unwrap();
//! let patched = engine::apply(original, &[&patch]).unwrap();
//! assert_eq!(patched, modified);
//! ```

pub mod engine;
pub mod io;
pub mod ips;

#[cfg(feature = "cli")]
pub mod cli;
