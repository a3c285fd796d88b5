//! Pairing-code relay.
//!
//! When both sides of a transfer run in panes of the same terminal
//! multiplexer, the human step of copying the pairing code from the remote
//! pane into the local prompt can be automated. [`PairingRelay`] performs one
//! sequential scan:
//!
//! 1. list every pane (none → [`Error::NoPanesFound`], a repeated identifier →
//!    [`Error::DuplicateAddressing`]);
//! 2. look only at the last few non-empty lines of each pane, so old
//!    scrollback cannot match;
//! 3. find the pane sitting at the instruction prompt and the pane showing a
//!    fresh `<tool> receive <code>` line; more than one of either is
//!    [`Error::AmbiguousPane`];
//! 4. type the receive instruction into the waiting pane.
//!
//! If either side is missing nothing is typed and the outcome says what was
//! missing. There is no retry loop; run it again when ready.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info};

use crate::code::{Instruction, RECEIVE_SUBCOMMAND};
use crate::error::{Error, PaneMatch, Result};
use crate::pane::PaneHost;
use crate::prompt::DEFAULT_PROMPT;
use crate::tool::DEFAULT_TOOL;

/// Default number of trailing non-empty lines inspected per pane.
pub const DEFAULT_TAIL_LINES: usize = 2;

/// Relay configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Relay tool binary name, as it appears in receive instructions
    pub tool: String,
    /// Prompt a waiting local session prints
    pub prompt: String,
    /// Trailing non-empty lines inspected per pane
    pub tail_lines: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            tool: DEFAULT_TOOL.to_string(),
            prompt: DEFAULT_PROMPT.to_string(),
            tail_lines: DEFAULT_TAIL_LINES,
        }
    }
}

/// What a pane's recent output looks like.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "code")]
pub enum PaneState {
    /// Sitting at the instruction prompt
    Waiting,
    /// Just printed a receive instruction carrying this code
    CodeEmitted(String),
    /// Anything else
    Unrelated,
}

/// Classification of one pane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaneScan {
    /// Pane identifier
    pub pane_id: String,
    /// The trailing lines that were inspected
    pub tail: Vec<String>,
    /// Waiting prompt seen on the last line
    pub waiting: bool,
    /// Code seen in the tail, if any
    pub code: Option<String>,
}

impl PaneScan {
    /// Primary state, for display.
    #[must_use]
    pub fn state(&self) -> PaneState {
        if self.waiting {
            PaneState::Waiting
        } else if let Some(code) = &self.code {
            PaneState::CodeEmitted(code.clone())
        } else {
            PaneState::Unrelated
        }
    }
}

/// Result of a relay pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum RelayOutcome {
    /// The instruction was typed into the local pane
    Injected {
        /// Pane that received the instruction
        local_pane: String,
        /// Pane the code was read from
        remote_pane: String,
        /// The instruction that was typed
        command: String,
    },
    /// Both sides were found; nothing typed because this was a dry run
    Ready {
        /// Pane that would receive the instruction
        local_pane: String,
        /// Pane the code was read from
        remote_pane: String,
        /// The instruction that would be typed
        command: String,
    },
    /// One or both sides were not found; nothing typed
    Incomplete {
        /// Waiting pane, if found
        local_pane: Option<String>,
        /// Code seen, if found
        remote_code: Option<String>,
    },
}

/// One-shot scanner/injector over a [`PaneHost`].
#[derive(Debug)]
pub struct PairingRelay<H> {
    host: H,
    config: RelayConfig,
}

impl<H: PaneHost> PairingRelay<H> {
    /// Relay over `host`.
    pub const fn new(host: H, config: RelayConfig) -> Self {
        Self { host, config }
    }

    /// The underlying host.
    pub const fn host(&self) -> &H {
        &self.host
    }

    /// Enumerate and classify every pane without acting.
    pub fn scan(&self) -> Result<Vec<PaneScan>> {
        let panes = self.host.list_panes()?;
        if panes.is_empty() {
            return Err(Error::NoPanesFound);
        }

        let mut seen = HashSet::new();
        for pane in &panes {
            if !seen.insert(pane.as_str()) {
                return Err(Error::DuplicateAddressing(pane.clone()));
            }
        }

        panes
            .into_iter()
            .map(|pane_id| {
                let content = self.host.capture_pane(&pane_id)?;
                let scan = self.classify(pane_id, &content);
                debug!("pane {}: {:?}", scan.pane_id, scan.state());
                Ok(scan)
            })
            .collect()
    }

    /// Scan and, if both sides are present, type the instruction.
    pub fn run(&self) -> Result<RelayOutcome> {
        self.relay(false)
    }

    /// Scan and report what [`PairingRelay::run`] would do.
    pub fn dry_run(&self) -> Result<RelayOutcome> {
        self.relay(true)
    }

    fn relay(&self, dry_run: bool) -> Result<RelayOutcome> {
        let scans = self.scan()?;

        let waiting: Vec<&PaneScan> = scans.iter().filter(|s| s.waiting).collect();
        let emitting: Vec<&PaneScan> = scans.iter().filter(|s| s.code.is_some()).collect();

        ensure_unique(&waiting, PaneMatch::WaitingForCode)?;
        ensure_unique(&emitting, PaneMatch::CodeEmitted)?;

        let (Some(local), Some(remote)) = (waiting.first(), emitting.first()) else {
            let outcome = RelayOutcome::Incomplete {
                local_pane: waiting.first().map(|s| s.pane_id.clone()),
                remote_code: emitting.first().and_then(|s| s.code.clone()),
            };
            info!("nothing to relay: {outcome:?}");
            return Ok(outcome);
        };

        let code = remote.code.as_deref().unwrap_or_default();
        let command = format!("{} {RECEIVE_SUBCOMMAND} {code}", self.config.tool);
        // Same check the local session applies; never type something it would reject.
        Instruction::parse(&command, &self.config.tool)?;

        if dry_run {
            return Ok(RelayOutcome::Ready {
                local_pane: local.pane_id.clone(),
                remote_pane: remote.pane_id.clone(),
                command,
            });
        }

        self.host.send_line(&local.pane_id, &command)?;
        info!(
            "sent '{command}' from pane {} to pane {}",
            remote.pane_id, local.pane_id
        );

        Ok(RelayOutcome::Injected {
            local_pane: local.pane_id.clone(),
            remote_pane: remote.pane_id.clone(),
            command,
        })
    }

    fn classify(&self, pane_id: String, content: &str) -> PaneScan {
        let tail = tail_lines(content, self.config.tail_lines);
        let prompt = self.config.prompt.trim();

        let waiting = !prompt.is_empty()
            && tail
                .last()
                .is_some_and(|line| line.trim_end().ends_with(prompt));

        let marker = format!("{} {RECEIVE_SUBCOMMAND} ", self.config.tool);
        let code = tail
            .iter()
            .filter(|line| prompt.is_empty() || !line.contains(prompt))
            .find_map(|line| extract_code(line, &marker));

        PaneScan {
            pane_id,
            tail,
            waiting,
            code,
        }
    }
}

fn ensure_unique(matches: &[&PaneScan], kind: PaneMatch) -> Result<()> {
    if matches.len() > 1 {
        return Err(Error::AmbiguousPane {
            kind,
            panes: matches.iter().map(|s| s.pane_id.clone()).collect(),
        });
    }
    Ok(())
}

/// The last `n` non-empty lines of `content`, trailing whitespace removed.
fn tail_lines(content: &str, n: usize) -> Vec<String> {
    let lines: Vec<&str> = content
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].iter().map(ToString::to_string).collect()
}

/// The token following `marker` on `line`.
fn extract_code(line: &str, marker: &str) -> Option<String> {
    let (_, rest) = line.split_once(marker)?;
    rest.split_whitespace().next().map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct ScriptedHost {
        panes: Vec<(String, String)>,
        sent: RefCell<Vec<(String, String)>>,
    }

    impl ScriptedHost {
        fn new(panes: &[(&str, &str)]) -> Self {
            Self {
                panes: panes
                    .iter()
                    .map(|(id, text)| ((*id).to_string(), (*text).to_string()))
                    .collect(),
                sent: RefCell::new(Vec::new()),
            }
        }
    }

    impl PaneHost for ScriptedHost {
        fn list_panes(&self) -> Result<Vec<String>> {
            Ok(self.panes.iter().map(|(id, _)| id.clone()).collect())
        }

        fn capture_pane(&self, pane_id: &str) -> Result<String> {
            Ok(self
                .panes
                .iter()
                .find(|(id, _)| id == pane_id)
                .map(|(_, text)| text.clone())
                .unwrap_or_default())
        }

        fn send_line(&self, pane_id: &str, text: &str) -> Result<()> {
            self.sent
                .borrow_mut()
                .push((pane_id.to_string(), text.to_string()));
            Ok(())
        }
    }

    fn relay(panes: &[(&str, &str)]) -> PairingRelay<ScriptedHost> {
        PairingRelay::new(ScriptedHost::new(panes), RelayConfig::default())
    }

    #[test]
    fn test_tail_lines_skips_blank_lines() {
        let content = "one\n\ntwo   \n\n  \nthree\n\n";
        assert_eq!(tail_lines(content, 2), vec!["two", "three"]);
        assert_eq!(tail_lines(content, 10), vec!["one", "two", "three"]);
        assert!(tail_lines("", 2).is_empty());
    }

    #[test]
    fn test_extract_code() {
        assert_eq!(
            extract_code("wormhole receive 7-example-code", "wormhole receive "),
            Some("7-example-code".to_string())
        );
        assert_eq!(
            extract_code("run: wormhole receive 3-a-b now", "wormhole receive "),
            Some("3-a-b".to_string())
        );
        assert_eq!(extract_code("wormhole send store", "wormhole receive "), None);
    }

    #[test]
    fn test_prompt_with_typed_text_is_not_waiting() {
        let r = relay(&[("%1", "Enter wormhole command: wormhole receive 7-a-b\n")]);
        let scans = r.scan().unwrap();
        assert!(!scans[0].waiting);
        assert_eq!(scans[0].code, None);
    }

    #[test]
    fn test_old_scrollback_is_ignored() {
        let r = relay(&[(
            "%1",
            "wormhole receive 1-stale-code\nls\nmain.rs\nCargo.toml\n",
        )]);
        let scans = r.scan().unwrap();
        assert_eq!(scans[0].state(), PaneState::Unrelated);
    }

    #[test]
    fn test_no_panes() {
        assert!(matches!(relay(&[]).run(), Err(Error::NoPanesFound)));
    }

    #[test]
    fn test_duplicate_pane_ids() {
        let r = relay(&[("%1", ""), ("%2", ""), ("%1", "")]);
        match r.run() {
            Err(Error::DuplicateAddressing(id)) => assert_eq!(id, "%1"),
            other => panic!("expected DuplicateAddressing, got {other:?}"),
        }
    }

    #[test]
    fn test_two_codes_is_ambiguous() {
        let r = relay(&[
            ("%1", "Enter wormhole command:"),
            ("%2", "wormhole receive 1-a-b"),
            ("%3", "wormhole receive 2-c-d"),
        ]);
        assert!(matches!(
            r.run(),
            Err(Error::AmbiguousPane {
                kind: PaneMatch::CodeEmitted,
                ..
            })
        ));
        assert!(r.host().sent.borrow().is_empty());
    }

    #[test]
    fn test_dry_run_does_not_type() {
        let r = relay(&[
            ("%1", "Enter wormhole command:"),
            ("%2", "wormhole receive 7-example-code"),
        ]);
        assert_eq!(
            r.dry_run().unwrap(),
            RelayOutcome::Ready {
                local_pane: "%1".into(),
                remote_pane: "%2".into(),
                command: "wormhole receive 7-example-code".into(),
            }
        );
        assert!(r.host().sent.borrow().is_empty());
    }

    #[test]
    fn test_malformed_code_is_not_injected() {
        let r = relay(&[
            ("%1", "Enter wormhole command:"),
            ("%2", "wormhole receive not-a-code"),
        ]);
        assert!(matches!(r.run(), Err(Error::InvalidInstruction { .. })));
        assert!(r.host().sent.borrow().is_empty());
    }

    #[test]
    fn test_custom_tail_window() {
        let host = ScriptedHost::new(&[
            ("%1", "Enter wormhole command:"),
            ("%2", "wormhole receive 5-deep-code\nline\nline\nline"),
        ]);
        let config = RelayConfig {
            tail_lines: 4,
            ..RelayConfig::default()
        };
        let outcome = PairingRelay::new(host, config).run().unwrap();
        assert!(matches!(outcome, RelayOutcome::Injected { .. }));
    }
}
