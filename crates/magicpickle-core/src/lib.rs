//! # MagicPickle Core Library
//!
//! `magicpickle-core` ships arbitrary in-memory objects from a "remote"
//! process that produces them to a "local" process that consumes them,
//! without a shared filesystem or network path. The bytes travel through
//! magic-wormhole; the last received payload is kept in a single-slot cache
//! for offline replay.
//!
//! ## Features
//!
//! - **Role-asymmetric queue**: remote code only saves, local code only loads,
//!   in the same order on both sides
//! - **Scoped sessions**: a private working directory that is always removed,
//!   and a push that only happens after a clean scope
//! - **Cache replay**: press Enter at the prompt to reuse the last payload
//! - **Pane relay**: forwards the pairing code between tmux panes
//!
//! ## Modules
//!
//! - [`cache`] - Single-slot payload cache
//! - [`code`] - Pairing code and instruction parsing
//! - [`compression`] - Payload compression settings and zstd wrapper
//! - [`config`] - Configuration management
//! - [`pane`] - Terminal pane addressing (tmux)
//! - [`payload`] - Payload file format
//! - [`prompt`] - Instruction sources for the local side
//! - [`queue`] - The role-asymmetric store queue
//! - [`relay`] - Pairing-code relay between panes
//! - [`role`] - Local/remote role resolution
//! - [`session`] - Paired transfer sessions
//! - [`tool`] - External relay tool (magic-wormhole)
//!
//! ## Example
//!
//! ```rust,ignore
//! use magicpickle_core::{Role, RoleResolver, SessionOptions, TransferSession};
//!
//! let role = RoleResolver::hostname("think-jason").resolve();
//! TransferSession::open(role, SessionOptions::default())?.run(|mp| {
//!     if mp.is_remote() {
//!         mp.save("hello")?;
//!     } else {
//!         println!("{}", mp.load::<String>()?);
//!     }
//!     Ok::<_, magicpickle_core::Error>(())
//! })?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]

pub mod cache;
pub mod code;
pub mod compression;
pub mod config;
pub mod error;
pub mod pane;
pub mod payload;
pub mod prompt;
pub mod queue;
pub mod relay;
pub mod role;
pub mod session;
pub mod tool;

pub use error::{Error, Result};
pub use role::{Role, RoleResolver};
pub use session::{SessionOptions, TransferSession};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
