//! CLI command definitions and handlers.

use clap::{Parser, Subcommand, ValueEnum};

/// Load configuration with graceful fallback to defaults.
///
/// A missing or unparsable config file never stops a command; the problem is
/// logged and the defaults are used.
pub fn load_config() -> magicpickle_core::config::Config {
    magicpickle_core::config::Config::load().unwrap_or_else(|e| {
        tracing::warn!("{e}; using default configuration");
        magicpickle_core::config::Config::default()
    })
}

pub mod cache;
pub mod completions;
pub mod config;
pub mod demo;
pub mod relay;

/// MagicPickle - ship in-memory objects between machines over magic-wormhole
#[derive(Parser)]
#[command(name = "magicpickle")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand)]
pub enum Command {
    /// Copy a pairing code from a sending pane into a waiting pane (tmux)
    Relay(RelayArgs),

    /// Run the reference session: remote saves messages, local prints them
    Demo(DemoArgs),

    /// Inspect or clear the payload cache
    Cache(CacheArgs),

    /// Inspect or initialize configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the relay command
#[derive(Parser)]
pub struct RelayArgs {
    /// Trailing non-empty lines inspected per pane
    #[arg(long)]
    pub tail_lines: Option<usize>,

    /// Report what would be typed without typing it
    #[arg(long)]
    pub dry_run: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the demo command
#[derive(Parser)]
pub struct DemoArgs {
    /// Act as the local (receiving) side
    #[arg(long, conflicts_with = "remote")]
    pub local: bool,

    /// Act as the remote (sending) side
    #[arg(long)]
    pub remote: bool,

    /// Message to send; repeat for several (remote only)
    #[arg(short, long = "message", value_name = "TEXT")]
    pub messages: Vec<String>,

    /// Compress the payload (remote only)
    #[arg(long)]
    pub compress: bool,

    /// Do not read or refresh the cache slot
    #[arg(long)]
    pub no_cache: bool,
}

/// Arguments for the cache command
#[derive(Parser)]
pub struct CacheArgs {
    /// Cache subcommand
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Clone, Copy)]
pub enum CacheAction {
    /// Show the cached payload's size, age and contents
    Show {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Remove the cached payload
    Clear,

    /// Print the cache slot location
    Path,
}

/// Arguments for the config command
#[derive(Parser)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands
#[derive(Subcommand, Clone, Copy)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,

    /// Print the configuration file location
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
}

/// Arguments for the completions command
#[derive(Parser)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: ShellType,
}

/// Supported shell types for completions
#[derive(Clone, Copy, ValueEnum, Debug)]
pub enum ShellType {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    #[value(name = "powershell")]
    PowerShell,
    /// Elvish shell
    Elvish,
}
