//! Configuration management for MagicPickle.
//!
//! This module handles loading, saving, and managing MagicPickle configuration.
//!
//! ## Configuration File Locations
//!
//! | Platform | Path |
//! |----------|------|
//! | Linux | `~/.config/magicpickle/config.toml` |
//! | macOS | `~/Library/Application Support/com.magicpickle.MagicPickle/config.toml` |
//! | Windows | `%APPDATA%\MagicPickle\MagicPickle\config\config.toml` |
//!
//! ## Example
//!
//! ```rust,ignore
//! use magicpickle_core::config::Config;
//!
//! let config = Config::load()?;
//! let role = config.role_resolver().resolve();
//! let session = TransferSession::open(role, config.session_options())?;
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::cache::CacheSlot;
use crate::compression::Compression;
use crate::error::{Error, Result};
use crate::prompt::DEFAULT_PROMPT;
use crate::relay::{RelayConfig, DEFAULT_TAIL_LINES};
use crate::role::{Role, RoleResolver};
use crate::session::SessionOptions;
use crate::tool::DEFAULT_TOOL;

/// Main configuration struct for MagicPickle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,
    /// Transfer session settings
    pub session: SessionConfig,
    /// Pane relay settings
    pub relay: PaneRelayConfig,
}

/// General configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Relay tool binary
    pub tool: String,
    /// Hostname substring identifying the local machine
    pub local_hostname: Option<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            tool: DEFAULT_TOOL.to_string(),
            local_hostname: None,
        }
    }
}

/// Transfer session configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Log session milestones at info level
    pub verbose: bool,
    /// `false`, `true` or a zstd level
    pub compress: Compression,
    /// Keep a copy of every fresh pull
    pub use_cache: bool,
    /// Cache slot location (None = system temp directory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_path: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            compress: Compression::Off,
            use_cache: true,
            cache_path: None,
        }
    }
}

impl SessionConfig {
    /// The configured cache slot, if caching is enabled.
    #[must_use]
    pub fn cache_slot(&self) -> Option<CacheSlot> {
        if !self.use_cache {
            return None;
        }
        Some(self.cache_path.as_ref().map_or_else(
            CacheSlot::at_default_location,
            |p| CacheSlot::new(p.clone()),
        ))
    }
}

/// Pane relay configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaneRelayConfig {
    /// Trailing non-empty lines inspected per pane
    pub tail_lines: usize,
    /// Prompt a waiting local session prints
    pub prompt: String,
}

impl Default for PaneRelayConfig {
    fn default() -> Self {
        Self {
            tail_lines: DEFAULT_TAIL_LINES,
            prompt: DEFAULT_PROMPT.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// If the configuration file doesn't exist, returns the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, falling back to defaults if it is absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigError(format!("Failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to the default location.
    ///
    /// Creates the configuration directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be written.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::ConfigError(format!("Failed to create config directory: {e}"))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| Error::ConfigError(format!("Failed to write config: {e}")))
    }

    /// Get the default configuration directory path.
    #[must_use]
    pub fn config_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "magicpickle", "MagicPickle")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the full path to the configuration file.
    #[must_use]
    pub fn config_path() -> PathBuf {
        Self::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("config.toml")
    }

    /// Role resolver from `general.local_hostname`.
    ///
    /// Without a configured hostname every machine resolves to remote.
    #[must_use]
    pub fn role_resolver(&self) -> RoleResolver {
        match &self.general.local_hostname {
            Some(pattern) => RoleResolver::hostname(pattern.clone()),
            None => RoleResolver::fixed(Role::Remote),
        }
    }

    /// Session options built from this configuration.
    #[must_use]
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            verbose: self.session.verbose,
            compress: self.session.compress,
            cache: self.session.cache_slot(),
            tool: self.general.tool.clone(),
            prompt: self.relay.prompt.clone(),
        }
    }

    /// Relay settings built from this configuration.
    #[must_use]
    pub fn relay_config(&self) -> RelayConfig {
        RelayConfig {
            tool: self.general.tool.clone(),
            prompt: self.relay.prompt.clone(),
            tail_lines: self.relay.tail_lines,
        }
    }
}
