//! Terminal pane addressing.
//!
//! The pane relay needs three primitives from the terminal multiplexer:
//! list pane identifiers, capture a pane's content and type a line into a
//! pane. [`TmuxHost`] implements them with the tmux command line; tests use a
//! scripted host.

use std::process::{Command, Output};

use tracing::debug;

use crate::error::{Error, Result};

/// Something that owns addressable terminal panes.
pub trait PaneHost {
    /// Identifiers of every open pane, in host order.
    fn list_panes(&self) -> Result<Vec<String>>;

    /// Full text content of a pane, scrollback included.
    fn capture_pane(&self, pane_id: &str) -> Result<String>;

    /// Type `text` into a pane and press Enter.
    fn send_line(&self, pane_id: &str, text: &str) -> Result<()>;
}

/// tmux, addressed across all sessions and windows of the default server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TmuxHost {
    program: String,
}

impl Default for TmuxHost {
    fn default() -> Self {
        Self {
            program: "tmux".to_string(),
        }
    }
}

impl TmuxHost {
    /// Use a non-default tmux binary.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn spawn(&self, args: &[&str]) -> Result<Output> {
        debug!("{} {}", self.program, args.join(" "));
        Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|e| Error::PaneHost(format!("failed to run {}: {e}", self.program)))
    }

    fn tmux(&self, args: &[&str]) -> Result<Output> {
        let output = self.spawn(args)?;
        if !output.status.success() {
            return Err(self.failure(args, &output));
        }
        Ok(output)
    }

    fn failure(&self, args: &[&str], output: &Output) -> Error {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Error::PaneHost(format!(
            "{} {} failed: {}",
            self.program,
            args.first().copied().unwrap_or_default(),
            stderr.trim()
        ))
    }
}

/// What tmux prints when no server is running.
const NO_SERVER_MESSAGES: [&str; 2] = ["no server running", "error connecting to"];

/// Whether tmux stderr says there is no server to talk to.
fn is_no_server(stderr: &str) -> bool {
    NO_SERVER_MESSAGES.iter().any(|m| stderr.contains(m))
}

impl PaneHost for TmuxHost {
    /// Without a running server there are no panes, which is not an error here.
    fn list_panes(&self) -> Result<Vec<String>> {
        let args = ["list-panes", "-a", "-F", "#{pane_id}"];
        let output = self.spawn(&args)?;
        if !output.status.success() {
            if is_no_server(&String::from_utf8_lossy(&output.stderr)) {
                debug!("no tmux server running");
                return Ok(Vec::new());
            }
            return Err(self.failure(&args, &output));
        }
        Ok(parse_pane_list(&String::from_utf8_lossy(&output.stdout)))
    }

    fn capture_pane(&self, pane_id: &str) -> Result<String> {
        let output = self.tmux(&["capture-pane", "-t", pane_id, "-p", "-J", "-S-"])?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn send_line(&self, pane_id: &str, text: &str) -> Result<()> {
        // `-l` keeps tmux from interpreting words of the text as key names.
        self.tmux(&["send-keys", "-t", pane_id, "-l", text])?;
        self.tmux(&["send-keys", "-t", pane_id, "Enter"])?;
        Ok(())
    }
}

/// One identifier per non-empty line.
fn parse_pane_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect()
}
