//! # streamflate
//!
//! A streaming DEFLATE (RFC 1951) and zlib (RFC 1950) compressor with a
//! fixed memory footprint.
//!
//! Input arrives in arbitrary chunks; compressed bytes are pushed to a
//! caller-supplied [`Sink`] in runs of at most 4 KiB. All working state
//! lives in buffers allocated once at construction: a 32 KiB sliding
//! dictionary with hash chains, a 24 KiB token buffer, and a 4 KiB output
//! staging buffer. Every block on the wire is a dynamic-Huffman DEFLATE
//! block built from length-limited canonical codes.
//!
//! ## Example
//!
//! ```rust
//! use streamflate::{compress_to_vec, CompressOptions};
//!
//! let data = b"Hello, World! Hello, World!";
//! let compressed = compress_to_vec(data, &CompressOptions::default()).unwrap();
//! assert_eq!(&compressed[..2], &[0x78, 0x01]); // zlib header
//! ```
//!
//! Streaming into any [`Sink`]:
//!
//! ```rust
//! use streamflate::Compressor;
//!
//! let mut compressor = Compressor::new(Vec::new());
//! compressor.write(b"first chunk, ").unwrap();
//! compressor.write(b"second chunk").unwrap();
//! compressor.finish().unwrap();
//! let compressed = compressor.into_sink();
//! assert!(!compressed.is_empty());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod adler32;
mod bits;
pub mod deflate;
pub mod error;
mod huffman;
mod lz77;
pub mod sink;
mod tables;

pub use adler32::adler32;
pub use deflate::{compress_to_slice, compress_to_vec, CompressOptions, Compressor};
pub use error::{Error, Result};
pub use sink::{Sink, SliceSink};
