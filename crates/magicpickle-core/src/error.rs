//! Error types for MagicPickle.
//!
//! This module provides a unified error type for all MagicPickle operations,
//! with specific error variants for different failure modes.

use std::io;

use thiserror::Error;

/// A specialized `Result` type for MagicPickle operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Which classification a pane scan found more than once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneMatch {
    /// Pane is waiting for a pairing instruction
    WaitingForCode,
    /// Pane shows a freshly minted pairing code
    CodeEmitted,
}

impl std::fmt::Display for PaneMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WaitingForCode => write!(f, "local"),
            Self::CodeEmitted => write!(f, "remote"),
        }
    }
}

/// The main error type for MagicPickle.
#[derive(Error, Debug)]
pub enum Error {
    /// `save` or `load` called from the wrong role (E001)
    #[error("cannot {operation} in {role} mode")]
    RoleViolation {
        /// The rejected operation
        operation: &'static str,
        /// Role of the session it was called on
        role: crate::role::Role,
    },

    /// More loads than saves (E002)
    #[error("queue exhausted after {loaded} loads: remote saved fewer objects")]
    QueueExhausted {
        /// Number of objects successfully loaded before the failure
        loaded: usize,
    },

    /// Malformed pairing instruction (E003)
    #[error("invalid instruction '{input}': {reason}")]
    InvalidInstruction {
        /// The raw input that was rejected
        input: String,
        /// Why it was rejected
        reason: String,
    },

    /// Relay tool failed or produced no output (E004)
    #[error("transfer failed: {0}")]
    TransferFailed(String),

    /// Cache requested but missing or unconfigured (E005)
    #[error("cache unavailable: {0}")]
    CacheUnavailable(String),

    /// Terminal host reported no panes (E006)
    #[error("no terminal panes found")]
    NoPanesFound,

    /// Two panes share the same identifier (E007)
    #[error("pane identifier '{0}' reported more than once")]
    DuplicateAddressing(String),

    /// More than one pane matched a classification (E008)
    #[error("multiple {kind} panes: {}", panes.join(", "))]
    AmbiguousPane {
        /// The classification that matched more than once
        kind: PaneMatch,
        /// Identifiers of every matching pane
        panes: Vec<String>,
    },

    /// Relay tool is not installed
    #[error("'{0}' not found in PATH")]
    ToolNotFound(String),

    /// Terminal host command failed
    #[error("terminal host error: {0}")]
    PaneHost(String),

    /// Configuration file error
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Compression error
    #[error("compression error: {0}")]
    Compression(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl Error {
    /// Returns the error code associated with this error, if any.
    ///
    /// Error codes follow the pattern EXXX where XXX is a 3-digit number.
    #[must_use]
    pub const fn code(&self) -> Option<&'static str> {
        match self {
            Self::RoleViolation { .. } => Some("E001"),
            Self::QueueExhausted { .. } => Some("E002"),
            Self::InvalidInstruction { .. } => Some("E003"),
            Self::TransferFailed(_) => Some("E004"),
            Self::CacheUnavailable(_) => Some("E005"),
            Self::NoPanesFound => Some("E006"),
            Self::DuplicateAddressing(_) => Some("E007"),
            Self::AmbiguousPane { .. } => Some("E008"),
            _ => None,
        }
    }

    /// Returns a helpful suggestion for resolving the error, if applicable.
    #[must_use]
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::ToolNotFound(_) => Some(
                "Install magic-wormhole:\n\
                   pip install magic-wormhole\n\
                 Or point `general.tool` in the config at another binary",
            ),
            Self::InvalidInstruction { .. } => Some(
                "Paste the full line printed by the sender, e.g.\n\
                   wormhole receive 7-guitarist-revenge\n\
                 Or press Enter on an empty line to use the cache",
            ),
            Self::CacheUnavailable(_) => Some(
                "Run one live transfer first so the cache slot is populated,\n\
                 and check `session.cache_path` in the config",
            ),
            Self::AmbiguousPane { .. } => {
                Some("Close or clear the extra panes, then run the relay again")
            }
            Self::QueueExhausted { .. } => Some(
                "Local and remote must follow the same control flow:\n\
                 every `load` needs a matching `save` on the remote side",
            ),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::Role;

    #[test]
    fn test_error_codes() {
        let err = Error::RoleViolation {
            operation: "save",
            role: Role::Local,
        };
        assert_eq!(err.code(), Some("E001"));
        assert_eq!(Error::NoPanesFound.code(), Some("E006"));
        assert_eq!(Error::ConfigError("x".into()).code(), None);
    }

    #[test]
    fn test_role_violation_message() {
        let err = Error::RoleViolation {
            operation: "load",
            role: Role::Remote,
        };
        assert_eq!(err.to_string(), "cannot load in remote mode");
    }

    #[test]
    fn test_ambiguous_pane_lists_panes() {
        let err = Error::AmbiguousPane {
            kind: PaneMatch::WaitingForCode,
            panes: vec!["%1".into(), "%4".into()],
        };
        assert_eq!(err.to_string(), "multiple local panes: %1, %4");
        assert!(err.suggestion().is_some());
    }
}
