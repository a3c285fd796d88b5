//! External relay tool.
//!
//! The bytes never travel over a protocol of our own: the remote side hands
//! its payload file to `<tool> send <path>`, which prints a pairing code on
//! the terminal, and the local side runs `<tool> receive --accept-file <code>`
//! inside its working directory. Only the exit status matters to us.
//!
//! [`RelayTool`] is the seam tests use to substitute an in-process fake.

use std::io;
use std::path::Path;
use std::process::{Command, ExitStatus};

use tracing::debug;

use crate::code::{PairingCode, RECEIVE_SUBCOMMAND};
use crate::error::{Error, Result};

/// Default relay tool binary.
pub const DEFAULT_TOOL: &str = "wormhole";

/// Pushes and pulls payload files through a pairing-code exchange.
pub trait RelayTool {
    /// Program name, used when rendering receive instructions.
    fn name(&self) -> &str;

    /// Pull the payload for `code` into `dest_dir`.
    ///
    /// Blocks until the tool exits. Checking that the expected file arrived is
    /// up to the caller.
    fn receive(&self, code: &PairingCode, dest_dir: &Path) -> Result<()>;

    /// Push the file at `payload`. The tool prints the pairing code itself.
    fn send(&self, payload: &Path) -> Result<()>;
}

/// The magic-wormhole command line client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WormholeTool {
    program: String,
}

impl Default for WormholeTool {
    fn default() -> Self {
        Self::new(DEFAULT_TOOL)
    }
}

impl WormholeTool {
    /// Drive the binary called `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Check if the binary is available in PATH.
    #[must_use]
    pub fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .output()
            .is_ok()
    }

    /// Fail with [`Error::ToolNotFound`] unless the binary is available.
    pub fn ensure_available(&self) -> Result<()> {
        if self.is_available() {
            Ok(())
        } else {
            Err(Error::ToolNotFound(self.program.clone()))
        }
    }

    /// Build the pull command for `code`.
    #[must_use]
    pub fn receive_command(&self, code: &PairingCode) -> Vec<String> {
        vec![
            self.program.clone(),
            RECEIVE_SUBCOMMAND.to_string(),
            "--accept-file".to_string(),
            code.to_string(),
        ]
    }

    /// Build the push command for `payload`.
    #[must_use]
    pub fn send_command(&self, payload: &Path) -> Vec<String> {
        vec![
            self.program.clone(),
            "send".to_string(),
            payload.display().to_string(),
        ]
    }

    fn run(&self, args: &[String], cwd: Option<&Path>) -> Result<()> {
        let (program, rest) = args
            .split_first()
            .ok_or_else(|| Error::TransferFailed("empty command".to_string()))?;

        let mut command = Command::new(program);
        command.args(rest);
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }
        debug!("running {}", args.join(" "));

        // Inherit stdio: the pairing code must reach the terminal so a human or
        // the pane relay can pick it up.
        let status = command.status().map_err(|e| self.spawn_error(&e))?;
        check_status(status, args)
    }

    fn spawn_error(&self, e: &io::Error) -> Error {
        if e.kind() == io::ErrorKind::NotFound {
            Error::ToolNotFound(self.program.clone())
        } else {
            Error::TransferFailed(format!("failed to start '{}': {e}", self.program))
        }
    }
}

impl RelayTool for WormholeTool {
    fn name(&self) -> &str {
        &self.program
    }

    fn receive(&self, code: &PairingCode, dest_dir: &Path) -> Result<()> {
        self.run(&self.receive_command(code), Some(dest_dir))
    }

    fn send(&self, payload: &Path) -> Result<()> {
        self.run(&self.send_command(payload), None)
    }
}

fn check_status(status: ExitStatus, args: &[String]) -> Result<()> {
    if status.success() {
        return Ok(());
    }
    let reason = status.code().map_or_else(
        || "terminated by signal".to_string(),
        |c| format!("exit status {c}"),
    );
    Err(Error::TransferFailed(format!(
        "'{}' failed with {reason}",
        args.join(" ")
    )))
}
