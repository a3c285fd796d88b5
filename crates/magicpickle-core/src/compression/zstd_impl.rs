//! Zstd compression implementation.
//!
//! This module wraps the zstd library for compressing and decompressing
//! serialized payloads.

use std::io::Cursor;

use crate::error::{Error, Result};

/// Magic number opening every zstd frame.
const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

/// Compress data using zstd.
///
/// # Arguments
///
/// * `data` - The data to compress
/// * `level` - Compression level (1-22, lower = faster)
///
/// # Errors
///
/// Returns an error if compression fails.
pub fn compress(data: &[u8], level: i32) -> Result<Vec<u8>> {
    let cursor = Cursor::new(data);
    zstd::stream::encode_all(cursor, level)
        .map_err(|e| Error::Compression(format!("zstd compress failed: {e}")))
}

/// Decompress zstd data.
///
/// # Errors
///
/// Returns an error if decompression fails.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let cursor = Cursor::new(data);
    zstd::stream::decode_all(cursor)
        .map_err(|e| Error::Compression(format!("zstd decompress failed: {e}")))
}

/// Whether `data` starts with a zstd frame header.
#[must_use]
pub fn is_compressed(data: &[u8]) -> bool {
    data.starts_with(&ZSTD_MAGIC)
}
