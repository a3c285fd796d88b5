//! Payload file format.
//!
//! A payload is the whole store queue written as one JSON array, optionally
//! wrapped in a zstd frame. The same format is used for the file shipped
//! through the relay tool and for the cache slot, so a cached payload can be
//! replayed byte-for-byte.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::compression::{self, Compression};
use crate::error::{Error, Result};

/// File name of the payload inside a session working directory.
///
/// The relay tool preserves the sender's file name, so the receiving side
/// expects exactly this name after a pull.
pub const PAYLOAD_FILE_NAME: &str = "store";

/// Serialize `items` into payload bytes.
pub fn encode(items: &[Value], compression: Compression) -> Result<Vec<u8>> {
    let json = serde_json::to_vec(items)?;
    match compression.level() {
        Some(level) => compression::compress(&json, level),
        None => Ok(json),
    }
}

/// Parse payload bytes, decompressing first when they carry a zstd frame.
pub fn decode(bytes: &[u8]) -> Result<Vec<Value>> {
    let items = if compression::is_compressed(bytes) {
        serde_json::from_slice(&compression::decompress(bytes)?)
    } else {
        serde_json::from_slice(bytes)
    };
    items.map_err(|e| Error::Serialization(format!("payload is not a JSON array: {e}")))
}

/// Write `items` to `path`.
pub fn write(path: &Path, items: &[Value], compression: Compression) -> Result<u64> {
    let bytes = encode(items, compression)?;
    fs::write(path, &bytes)?;
    debug!(
        "wrote {} objects ({} bytes, compression {compression}) to {}",
        items.len(),
        bytes.len(),
        path.display()
    );
    Ok(bytes.len() as u64)
}

/// Read a payload from `path`.
pub fn read(path: &Path) -> Result<Vec<Value>> {
    let bytes = fs::read(path)?;
    let items = decode(&bytes)?;
    debug!("read {} objects from {}", items.len(), path.display());
    Ok(items)
}
