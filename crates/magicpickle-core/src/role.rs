//! Role resolution.
//!
//! A process is either the **remote** side (runs computations and saves
//! objects) or the **local** side (loads objects and consumes them). The role
//! is decided once, when a session is constructed, and never changes.
//!
//! ## Example
//!
//! ```rust,ignore
//! use magicpickle_core::role::{Role, RoleResolver};
//!
//! // The laptop is "local"; every other machine is "remote".
//! let role = RoleResolver::hostname("think-jason").resolve();
//!
//! // Tests pin the role instead of relying on the ambient hostname.
//! let role = RoleResolver::fixed(Role::Local).resolve();
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which side of the transfer this process is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Consumes objects pulled from the relay tool or the cache
    Local,
    /// Produces objects and pushes them through the relay tool
    Remote,
}

impl Role {
    /// Build a role from an "is local" flag.
    #[must_use]
    pub const fn from_is_local(is_local: bool) -> Self {
        if is_local {
            Self::Local
        } else {
            Self::Remote
        }
    }

    /// Whether this is the local side.
    #[must_use]
    pub const fn is_local(self) -> bool {
        matches!(self, Self::Local)
    }

    /// Whether this is the remote side.
    #[must_use]
    pub const fn is_remote(self) -> bool {
        matches!(self, Self::Remote)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Remote => write!(f, "remote"),
        }
    }
}

/// Strategy for deciding the role of the current process.
///
/// Resolution never fails: anything that does not positively identify the
/// local machine resolves to [`Role::Remote`].
pub enum RoleResolver {
    /// Caller-supplied predicate returning `true` for local
    Predicate(Box<dyn Fn() -> bool>),
    /// Local when the machine hostname contains this substring
    Hostname(String),
}

impl RoleResolver {
    /// Resolve with an arbitrary predicate.
    pub fn predicate(is_local: impl Fn() -> bool + 'static) -> Self {
        Self::Predicate(Box::new(is_local))
    }

    /// Resolve by matching a substring against the machine hostname.
    pub fn hostname(pattern: impl Into<String>) -> Self {
        Self::Hostname(pattern.into())
    }

    /// Always resolve to `role`.
    #[must_use]
    pub fn fixed(role: Role) -> Self {
        Self::predicate(move || role.is_local())
    }

    /// Evaluate the strategy once and produce a role.
    #[must_use]
    pub fn resolve(&self) -> Role {
        let role = match self {
            Self::Predicate(is_local) => Role::from_is_local(is_local()),
            Self::Hostname(pattern) => {
                let host = current_hostname();
                Role::from_is_local(hostname_matches(host.as_deref(), pattern))
            }
        };
        debug!("resolved role: {role}");
        role
    }
}

impl fmt::Debug for RoleResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Predicate(_) => f.write_str("RoleResolver::Predicate(..)"),
            Self::Hostname(pattern) => f
                .debug_tuple("RoleResolver::Hostname")
                .field(pattern)
                .finish(),
        }
    }
}

fn current_hostname() -> Option<String> {
    hostname::get()
        .ok()
        .map(|h| h.to_string_lossy().to_string())
}

/// Substring match of `pattern` against `host`.
///
/// An empty pattern never matches, so an unset config value cannot turn every
/// machine into the local side.
fn hostname_matches(host: Option<&str>, pattern: &str) -> bool {
    if pattern.is_empty() {
        return false;
    }
    host.is_some_and(|h| h.contains(pattern))
}
