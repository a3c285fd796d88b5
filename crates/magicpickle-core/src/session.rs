//! Paired transfer sessions.
//!
//! A [`TransferSession`] is a scoped resource. Opening it allocates a private
//! working directory and, on the local side, fills the queue from the relay
//! tool or the cache slot. Closing it pushes the queue on the remote side and
//! then removes the working directory.
//!
//! Release is guaranteed on every exit path:
//!
//! - [`TransferSession::close`] pushes (remote only) and cleans up;
//! - [`TransferSession::abort`] cleans up without pushing;
//! - dropping an open session (early return, `?`, panic) behaves like
//!   `abort`, so a half-built queue is never shipped.
//!
//! [`TransferSession::run`] ties these together around a closure: the push
//! happens only when the closure returns `Ok`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use magicpickle_core::role::RoleResolver;
//! use magicpickle_core::session::{SessionOptions, TransferSession};
//!
//! let role = RoleResolver::hostname("think-jason").resolve();
//! TransferSession::open(role, SessionOptions::default())?.run(|mp| {
//!     if mp.is_remote() {
//!         mp.save(&compute())?;
//!     } else {
//!         plot(mp.load::<Vec<f64>>()?);
//!     }
//!     Ok::<_, magicpickle_core::Error>(())
//! })?;
//! ```

use std::fmt::Display;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tempfile::TempDir;
use tracing::{debug, info, warn};

use crate::cache::CacheSlot;
use crate::code::{Instruction, PairingCode};
use crate::compression::Compression;
use crate::error::{Error, Result};
use crate::payload::{self, PAYLOAD_FILE_NAME};
use crate::prompt::{InstructionSource, StdinPrompt, DEFAULT_PROMPT};
use crate::queue::StoreQueue;
use crate::role::Role;
use crate::tool::{RelayTool, WormholeTool, DEFAULT_TOOL};

/// Prefix of every session working directory.
const WORKDIR_PREFIX: &str = "magicpickle-";

/// Session configuration.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Log session milestones at info level instead of debug
    pub verbose: bool,
    /// Compression applied to the pushed payload
    pub compress: Compression,
    /// Cache slot refreshed on every fresh pull (None disables caching)
    pub cache: Option<CacheSlot>,
    /// Relay tool binary
    pub tool: String,
    /// Prompt shown while waiting for an instruction
    pub prompt: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            compress: Compression::Off,
            cache: Some(CacheSlot::at_default_location()),
            tool: DEFAULT_TOOL.to_string(),
            prompt: DEFAULT_PROMPT.to_string(),
        }
    }
}

impl SessionOptions {
    /// Set verbose logging.
    #[must_use]
    pub const fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set the compression setting.
    #[must_use]
    pub fn with_compress(mut self, compress: impl Into<Compression>) -> Self {
        self.compress = compress.into();
        self
    }

    /// Use the cache slot at `path`.
    #[must_use]
    pub fn with_cache(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache = Some(CacheSlot::new(path));
        self
    }

    /// Disable the cache slot.
    #[must_use]
    pub fn without_cache(mut self) -> Self {
        self.cache = None;
        self
    }

    /// Use a different relay tool binary.
    #[must_use]
    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = tool.into();
        self
    }
}

/// Where a local session's objects came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadOrigin {
    /// Remote session; the queue is being built here
    Outgoing,
    /// Pulled live with this pairing code
    Fresh(PairingCode),
    /// Replayed from the cache slot
    Cache(PathBuf),
}

/// A paired transfer session.
pub struct TransferSession {
    role: Role,
    options: SessionOptions,
    tool: Box<dyn RelayTool>,
    workdir: Option<TempDir>,
    queue: StoreQueue,
    origin: PayloadOrigin,
}

impl std::fmt::Debug for TransferSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferSession")
            .field("role", &self.role)
            .field("options", &self.options)
            .field("tool", &self.tool.name())
            .field("workdir", &self.working_dir())
            .field("queued", &self.queue.len())
            .field("origin", &self.origin)
            .finish()
    }
}

impl TransferSession {
    /// Open a session using the real relay tool and an interactive prompt.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ToolNotFound`] if the relay tool is not installed, plus
    /// every error [`TransferSession::open_with`] can return.
    pub fn open(role: Role, options: SessionOptions) -> Result<Self> {
        let tool = WormholeTool::new(options.tool.clone());
        tool.ensure_available()?;
        Self::open_with(role, options, Box::new(tool), &mut StdinPrompt)
    }

    /// Open a session with an explicit relay tool and instruction source.
    ///
    /// The instruction source is only consulted on the local side.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInstruction`] for a malformed instruction (the relay
    ///   tool is not invoked)
    /// - [`Error::TransferFailed`] if the pull fails or leaves no payload
    /// - [`Error::CacheUnavailable`] if the cache was requested but is missing
    ///   or disabled
    pub fn open_with(
        role: Role,
        options: SessionOptions,
        tool: Box<dyn RelayTool>,
        source: &mut dyn InstructionSource,
    ) -> Result<Self> {
        let workdir = tempfile::Builder::new()
            .prefix(WORKDIR_PREFIX)
            .tempdir()?;

        let mut session = Self {
            role,
            options,
            tool,
            workdir: None,
            queue: StoreQueue::new(role),
            origin: PayloadOrigin::Outgoing,
        };
        session.note(format_args!("role: {role}"));
        session.note(format_args!("working dir: {}", workdir.path().display()));

        if role.is_local() {
            // On error `workdir` is dropped here, which removes it.
            let (items, origin) = session.fill_local(workdir.path(), source)?;
            session.note(format_args!("loaded {} objects", items.len()));
            session.queue = StoreQueue::from_items(items);
            session.origin = origin;
        }

        session.workdir = Some(workdir);
        Ok(session)
    }

    /// Run `body` inside the session scope.
    ///
    /// On `Ok` the session is closed (remote pushes); on `Err` it is aborted
    /// and the error returned unchanged. The working directory is removed
    /// either way.
    pub fn run<R, E, F>(mut self, body: F) -> std::result::Result<R, E>
    where
        F: FnOnce(&mut Self) -> std::result::Result<R, E>,
        E: From<Error>,
    {
        match body(&mut self) {
            Ok(value) => {
                self.close()?;
                Ok(value)
            }
            Err(e) => {
                self.abort();
                Err(e)
            }
        }
    }

    /// Role of this session.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Whether this is the local side.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        self.role.is_local()
    }

    /// Whether this is the remote side.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        self.role.is_remote()
    }

    /// Session configuration.
    #[must_use]
    pub const fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Where the queued objects came from.
    #[must_use]
    pub const fn origin(&self) -> &PayloadOrigin {
        &self.origin
    }

    /// The private working directory, while the session is open.
    #[must_use]
    pub fn working_dir(&self) -> Option<&Path> {
        self.workdir.as_ref().map(TempDir::path)
    }

    /// Objects still queued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Append an object to the outgoing queue. Remote only.
    pub fn save<T: Serialize + ?Sized>(&mut self, obj: &T) -> Result<()> {
        self.queue.save(obj)
    }

    /// Take the next object from the incoming queue. Local only.
    pub fn load<T: DeserializeOwned>(&mut self) -> Result<T> {
        self.queue.load()
    }

    /// Take the next object without decoding it. Local only.
    pub fn load_value(&mut self) -> Result<Value> {
        self.queue.load_value()
    }

    /// Release the session after a successful scope.
    ///
    /// A remote session serializes its queue and pushes it through the relay
    /// tool. The working directory is removed afterwards even if the push
    /// failed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TransferFailed`] if the push fails.
    pub fn close(mut self) -> Result<()> {
        let pushed = if self.role.is_remote() {
            self.push()
        } else {
            Ok(())
        };
        let cleaned = self.cleanup();
        pushed.and(cleaned)
    }

    /// Release the session after a failed scope, without pushing.
    pub fn abort(mut self) {
        if self.role.is_remote() {
            warn!(
                "scope failed, not pushing {} queued objects",
                self.queue.len()
            );
        }
        if let Err(e) = self.cleanup() {
            warn!("failed to remove working directory: {e}");
        }
    }

    fn fill_local(
        &self,
        workdir: &Path,
        source: &mut dyn InstructionSource,
    ) -> Result<(Vec<Value>, PayloadOrigin)> {
        let line = source.read_instruction(&self.options.prompt)?;

        match Instruction::parse(&line, self.tool.name())? {
            Instruction::Receive(code) => {
                self.note(format_args!("receiving with code {code}"));
                self.tool.receive(&code, workdir)?;

                let store = workdir.join(PAYLOAD_FILE_NAME);
                if !store.is_file() {
                    return Err(Error::TransferFailed(format!(
                        "{PAYLOAD_FILE_NAME} not found in {}",
                        workdir.display()
                    )));
                }

                if let Some(cache) = &self.options.cache {
                    cache.store_from(&store)?;
                    self.note(format_args!(
                        "cached payload at {}",
                        cache.path().display()
                    ));
                }

                Ok((payload::read(&store)?, PayloadOrigin::Fresh(code)))
            }
            Instruction::UseCache => {
                let cache = self.options.cache.as_ref().ok_or_else(|| {
                    Error::CacheUnavailable("no cache location configured".to_string())
                })?;
                self.note(format_args!("using cache at {}", cache.path().display()));
                let items = cache.read()?;
                Ok((items, PayloadOrigin::Cache(cache.path().to_path_buf())))
            }
        }
    }

    fn push(&self) -> Result<()> {
        let dir = self.working_dir().ok_or_else(|| {
            Error::TransferFailed("working directory already released".to_string())
        })?;
        let path = dir.join(PAYLOAD_FILE_NAME);

        let bytes = payload::write(&path, &self.queue.to_vec(), self.options.compress)?;
        self.note(format_args!(
            "sending {} objects ({bytes} bytes)",
            self.queue.len()
        ));
        self.tool.send(&path)
    }

    fn cleanup(&mut self) -> Result<()> {
        if let Some(dir) = self.workdir.take() {
            let path = dir.path().to_path_buf();
            dir.close()?;
            debug!("removed {}", path.display());
        }
        Ok(())
    }

    fn note(&self, message: impl Display) {
        if self.options.verbose {
            info!("MagicPickle {message}");
        } else {
            debug!("MagicPickle {message}");
        }
    }
}

impl Drop for TransferSession {
    fn drop(&mut self) {
        if self.workdir.is_some() {
            if self.role.is_remote() {
                warn!("session dropped without close, payload not pushed");
            }
            if let Err(e) = self.cleanup() {
                warn!("failed to remove working directory: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::FixedInstruction;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Relay tool that records calls and never touches the network.
    #[derive(Default, Clone)]
    struct RecordingTool {
        calls: Rc<RefCell<Vec<String>>>,
        fail: bool,
    }

    impl RelayTool for RecordingTool {
        fn name(&self) -> &str {
            "wormhole"
        }

        fn receive(&self, code: &PairingCode, _dest_dir: &Path) -> Result<()> {
            self.calls.borrow_mut().push(format!("receive {code}"));
            if self.fail {
                return Err(Error::TransferFailed("boom".into()));
            }
            Ok(())
        }

        fn send(&self, payload: &Path) -> Result<()> {
            assert!(payload.is_file(), "payload must exist while sending");
            self.calls.borrow_mut().push("send".to_string());
            if self.fail {
                return Err(Error::TransferFailed("boom".into()));
            }
            Ok(())
        }
    }

    fn options() -> SessionOptions {
        SessionOptions::default().without_cache()
    }

    #[test]
    fn test_remote_close_pushes_and_cleans_up() {
        let tool = RecordingTool::default();
        let calls = tool.calls.clone();
        let mut session = TransferSession::open_with(
            Role::Remote,
            options(),
            Box::new(tool),
            &mut FixedInstruction::use_cache(),
        )
        .unwrap();

        session.save("hello").unwrap();
        let dir = session.working_dir().unwrap().to_path_buf();
        assert!(dir.is_dir());

        session.close().unwrap();
        assert_eq!(*calls.borrow(), vec!["send"]);
        assert!(!dir.exists());
    }

    #[test]
    fn test_failed_push_still_cleans_up() {
        let tool = RecordingTool {
            fail: true,
            ..Default::default()
        };
        let session = TransferSession::open_with(
            Role::Remote,
            options(),
            Box::new(tool),
            &mut FixedInstruction::use_cache(),
        )
        .unwrap();
        let dir = session.working_dir().unwrap().to_path_buf();

        assert!(matches!(session.close(), Err(Error::TransferFailed(_))));
        assert!(!dir.exists());
    }

    #[test]
    fn test_run_skips_push_on_error() {
        let tool = RecordingTool::default();
        let calls = tool.calls.clone();
        let session = TransferSession::open_with(
            Role::Remote,
            options(),
            Box::new(tool),
            &mut FixedInstruction::use_cache(),
        )
        .unwrap();
        let dir = session.working_dir().unwrap().to_path_buf();

        let result: Result<()> = session.run(|mp| {
            mp.save(&1)?;
            Err(Error::Serialization("computation blew up".into()))
        });

        assert!(result.is_err());
        assert!(calls.borrow().is_empty());
        assert!(!dir.exists());
    }

    #[test]
    fn test_drop_without_close_does_not_push() {
        let tool = RecordingTool::default();
        let calls = tool.calls.clone();
        let session = TransferSession::open_with(
            Role::Remote,
            options(),
            Box::new(tool),
            &mut FixedInstruction::use_cache(),
        )
        .unwrap();
        let dir = session.working_dir().unwrap().to_path_buf();

        drop(session);
        assert!(calls.borrow().is_empty());
        assert!(!dir.exists());
    }

    #[test]
    fn test_invalid_instruction_does_not_invoke_tool() {
        for input in ["wormhole receive", "receive 12-foo-bar"] {
            let tool = RecordingTool::default();
            let calls = tool.calls.clone();
            let err = TransferSession::open_with(
                Role::Local,
                options(),
                Box::new(tool),
                &mut FixedInstruction(input.to_string()),
            )
            .unwrap_err();

            assert!(matches!(err, Error::InvalidInstruction { .. }), "{input}");
            assert!(calls.borrow().is_empty(), "{input}");
        }
    }

    #[test]
    fn test_missing_payload_after_receive_is_transfer_failed() {
        let tool = RecordingTool::default();
        let calls = tool.calls.clone();
        let err = TransferSession::open_with(
            Role::Local,
            options(),
            Box::new(tool),
            &mut FixedInstruction("wormhole receive 4-lost-file".to_string()),
        )
        .unwrap_err();

        assert!(matches!(err, Error::TransferFailed(_)));
        assert_eq!(*calls.borrow(), vec!["receive 4-lost-file"]);
    }

    #[test]
    fn test_cache_signal_without_cache_location() {
        let err = TransferSession::open_with(
            Role::Local,
            options(),
            Box::new(RecordingTool::default()),
            &mut FixedInstruction::use_cache(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::CacheUnavailable(_)));
    }

    #[test]
    fn test_role_violations() {
        let mut remote = TransferSession::open_with(
            Role::Remote,
            options(),
            Box::new(RecordingTool::default()),
            &mut FixedInstruction::use_cache(),
        )
        .unwrap();
        assert!(matches!(
            remote.load_value(),
            Err(Error::RoleViolation { .. })
        ));
        remote.abort();
    }

    #[test]
    fn test_options_builders() {
        let opts = SessionOptions::default()
            .with_verbose(true)
            .with_compress(6)
            .with_cache("/tmp/x")
            .with_tool("magic-wormhole");
        assert!(opts.verbose);
        assert_eq!(opts.compress, Compression::Level(6));
        assert_eq!(opts.cache.unwrap().path(), Path::new("/tmp/x"));
        assert_eq!(opts.tool, "magic-wormhole");
    }
}
