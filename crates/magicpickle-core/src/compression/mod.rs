//! Payload compression.
//!
//! The whole serialized queue is compressed as a single unit with zstd.
//! Whether and how hard to compress is a [`Compression`] setting, which reads
//! from config either as a boolean or as an integer level.
//!
//! ## Example
//!
//! ```rust,ignore
//! use magicpickle_core::compression::Compression;
//!
//! let off: Compression = false.into();
//! let default: Compression = true.into();
//! let level: Compression = 9.into();
//! ```

mod zstd_impl;

pub use zstd_impl::{compress, decompress, is_compressed};

use serde::{Deserialize, Serialize};

/// Level used when compression is switched on without an explicit level.
pub const DEFAULT_LEVEL: i32 = 3;

/// Highest level zstd accepts.
pub const MAX_LEVEL: i32 = 22;

/// Compression setting for a session payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// Write plain JSON
    #[default]
    Off,
    /// Compress with zstd at this level (1-22)
    Level(i32),
}

impl Compression {
    /// Level to hand to zstd, or `None` when compression is off.
    #[must_use]
    pub const fn level(self) -> Option<i32> {
        match self {
            Self::Off => None,
            Self::Level(level) => Some(level),
        }
    }

    /// Whether compression is enabled.
    #[must_use]
    pub const fn is_enabled(self) -> bool {
        matches!(self, Self::Level(_))
    }
}

impl From<bool> for Compression {
    fn from(enabled: bool) -> Self {
        if enabled {
            Self::Level(DEFAULT_LEVEL)
        } else {
            Self::Off
        }
    }
}

impl From<i32> for Compression {
    /// `0` or below disables compression; anything else is clamped to zstd's range.
    fn from(level: i32) -> Self {
        if level <= 0 {
            Self::Off
        } else {
            Self::Level(level.min(MAX_LEVEL))
        }
    }
}

impl std::fmt::Display for Compression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Off => write!(f, "off"),
            Self::Level(level) => write!(f, "zstd level {level}"),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum CompressionRepr {
    Flag(bool),
    Level(i64),
}

impl Serialize for Compression {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Off => CompressionRepr::Flag(false),
            Self::Level(level) => CompressionRepr::Level(i64::from(*level)),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Compression {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        match CompressionRepr::deserialize(deserializer)? {
            CompressionRepr::Flag(enabled) => Ok(enabled.into()),
            CompressionRepr::Level(level) => {
                let level = i32::try_from(level.clamp(0, i64::from(MAX_LEVEL)))
                    .map_err(serde::de::Error::custom)?;
                Ok(level.into())
            }
        }
    }
}
