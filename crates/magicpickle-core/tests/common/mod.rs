//! Common test utilities for `MagicPickle` integration tests.
//!
//! This module provides an in-process stand-in for the relay tool and a
//! scripted terminal host, so sessions and the pane relay can be exercised
//! without magic-wormhole or tmux installed.

#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use magicpickle_core::code::PairingCode;
use magicpickle_core::pane::PaneHost;
use magicpickle_core::payload::PAYLOAD_FILE_NAME;
use magicpickle_core::tool::RelayTool;
use magicpickle_core::{Error, Result};

/// Create a temporary directory for test files.
///
/// The directory will be automatically cleaned up when the returned
/// `TempDir` is dropped.
pub fn create_temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

#[derive(Debug, Default)]
struct MailboxState {
    minted: Vec<String>,
    received: Vec<String>,
}

/// Relay tool that "transfers" files through a shared mailbox directory.
///
/// `send` moves nothing over the network: it copies the payload into the
/// mailbox under a freshly minted code. `receive` moves it out again, so each
/// code works exactly once.
#[derive(Clone)]
pub struct MailboxTool {
    mailbox: PathBuf,
    state: Rc<RefCell<MailboxState>>,
}

impl MailboxTool {
    /// A tool backed by `mailbox`, which must exist.
    pub fn new(mailbox: &Path) -> Self {
        Self {
            mailbox: mailbox.to_path_buf(),
            state: Rc::new(RefCell::new(MailboxState::default())),
        }
    }

    /// Codes minted by `send`, oldest first.
    pub fn minted(&self) -> Vec<String> {
        self.state.borrow().minted.clone()
    }

    /// Codes consumed by `receive`, oldest first.
    pub fn received(&self) -> Vec<String> {
        self.state.borrow().received.clone()
    }

    /// The last minted code as a typed instruction line.
    pub fn last_instruction(&self) -> String {
        let code = self.minted().pop().expect("nothing was sent");
        format!("wormhole receive {code}")
    }

    /// Boxed clone for handing to a session.
    pub fn boxed(&self) -> Box<dyn RelayTool> {
        Box::new(self.clone())
    }
}

impl RelayTool for MailboxTool {
    fn name(&self) -> &str {
        "wormhole"
    }

    fn receive(&self, code: &PairingCode, dest_dir: &Path) -> Result<()> {
        let slot = self.mailbox.join(code.as_str());
        if !slot.is_file() {
            return Err(Error::TransferFailed(format!("no sender for code {code}")));
        }
        fs::copy(&slot, dest_dir.join(PAYLOAD_FILE_NAME))?;
        fs::remove_file(&slot)?;
        self.state.borrow_mut().received.push(code.to_string());
        Ok(())
    }

    fn send(&self, payload: &Path) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let code = format!("{}-example-code", state.minted.len() + 7);
        fs::copy(payload, self.mailbox.join(&code))?;
        state.minted.push(code);
        Ok(())
    }
}

/// Relay tool whose receive "succeeds" without writing anything.
#[derive(Clone, Copy, Default)]
pub struct SilentTool;

impl RelayTool for SilentTool {
    fn name(&self) -> &str {
        "wormhole"
    }

    fn receive(&self, _code: &PairingCode, _dest_dir: &Path) -> Result<()> {
        Ok(())
    }

    fn send(&self, _payload: &Path) -> Result<()> {
        Ok(())
    }
}

/// Terminal host with fixed pane contents that records typed lines.
#[derive(Default)]
pub struct ScriptedPanes {
    panes: Vec<(String, String)>,
    typed: RefCell<Vec<(String, String)>>,
}

impl ScriptedPanes {
    /// Panes as `(id, content)` pairs, in listing order.
    pub fn new(panes: &[(&str, &str)]) -> Self {
        Self {
            panes: panes
                .iter()
                .map(|(id, content)| ((*id).to_string(), (*content).to_string()))
                .collect(),
            typed: RefCell::new(Vec::new()),
        }
    }

    /// Every `(pane, text)` typed so far.
    pub fn typed(&self) -> Vec<(String, String)> {
        self.typed.borrow().clone()
    }
}

impl PaneHost for ScriptedPanes {
    fn list_panes(&self) -> Result<Vec<String>> {
        Ok(self.panes.iter().map(|(id, _)| id.clone()).collect())
    }

    fn capture_pane(&self, pane_id: &str) -> Result<String> {
        self.panes
            .iter()
            .find(|(id, _)| id == pane_id)
            .map(|(_, content)| content.clone())
            .ok_or_else(|| Error::PaneHost(format!("can't find pane: {pane_id}")))
    }

    fn send_line(&self, pane_id: &str, text: &str) -> Result<()> {
        self.typed
            .borrow_mut()
            .push((pane_id.to_string(), text.to_string()));
        Ok(())
    }
}

/// What a remote pane shows after `wormhole send` printed its code.
pub fn remote_pane_output(code: &str) -> String {
    format!(
        "Sending 27 Bytes file named 'store'\n\
         Wormhole code is: {code}\n\
         On the other computer, please run:\n\
         \n\
         wormhole receive {code}\n"
    )
}

/// What a local pane shows while waiting for the instruction.
pub fn local_pane_output() -> String {
    "$ python analyze.py\n\
     MagicPickle role: local\n\
     Enter wormhole command: \n"
        .to_string()
}
