//! Single-slot payload cache.
//!
//! Every successful fresh pull on the local side copies the received payload
//! into the cache slot, replacing whatever was there. A later local session
//! can replay the slot instead of doing a live exchange, which is handy when
//! re-running a visualization script against the last result.
//!
//! The slot is replaced wholesale: the new payload is written to a sibling
//! temporary file and renamed over the old one, so readers never observe a
//! half-written slot.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{Error, Result};
use crate::payload;

/// File name of the default cache slot inside the system temp directory.
pub const DEFAULT_CACHE_FILE_NAME: &str = "magicpickle_cache";

/// Metadata about a populated cache slot.
#[derive(Debug, Clone)]
pub struct CacheInfo {
    /// Slot location
    pub path: PathBuf,
    /// Size of the stored payload in bytes
    pub size: u64,
    /// Last time the slot was overwritten
    pub modified: Option<SystemTime>,
}

/// A single persisted payload at a fixed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSlot {
    path: PathBuf,
}

impl CacheSlot {
    /// A slot at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The slot at the well-known temp-directory location.
    #[must_use]
    pub fn at_default_location() -> Self {
        Self::new(Self::default_path())
    }

    /// `<temp dir>/magicpickle_cache`
    #[must_use]
    pub fn default_path() -> PathBuf {
        std::env::temp_dir().join(DEFAULT_CACHE_FILE_NAME)
    }

    /// Slot location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the slot currently holds a payload.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Replace the slot contents with the payload file at `source`.
    pub fn store_from(&self, source: &Path) -> Result<()> {
        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        fs::create_dir_all(&parent)?;

        let bytes = fs::read(source)?;
        let mut staging = NamedTempFile::new_in(&parent)?;
        staging.write_all(&bytes)?;
        staging.as_file().sync_all()?;
        staging
            .persist(&self.path)
            .map_err(|e| Error::Io(e.error))?;

        debug!("cached {} bytes at {}", bytes.len(), self.path.display());
        Ok(())
    }

    /// Decode the cached payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CacheUnavailable`] when the slot is empty.
    pub fn read(&self) -> Result<Vec<Value>> {
        if !self.exists() {
            return Err(Error::CacheUnavailable(format!(
                "no cached payload at {}",
                self.path.display()
            )));
        }
        payload::read(&self.path)
    }

    /// Size and modification time of the slot, if populated.
    pub fn info(&self) -> Result<Option<CacheInfo>> {
        if !self.exists() {
            return Ok(None);
        }
        let meta = fs::metadata(&self.path)?;
        Ok(Some(CacheInfo {
            path: self.path.clone(),
            size: meta.len(),
            modified: meta.modified().ok(),
        }))
    }

    /// Empty the slot. Returns whether anything was removed.
    pub fn clear(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
