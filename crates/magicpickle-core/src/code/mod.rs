//! Pairing code and instruction parsing.
//!
//! The local side is handed one line of text, typed by a human or injected by
//! the pane relay. It takes one of two forms:
//!
//! - an empty line, meaning "replay the cache slot";
//! - `<tool> receive <code>`, exactly three whitespace-separated tokens.
//!
//! ## Code Format
//!
//! Wormhole codes are a numeric nameplate followed by one or more
//! hyphen-separated words, e.g. `7-guitarist-revenge`. Codes never contain
//! whitespace.
//!
//! ## Example
//!
//! ```rust,ignore
//! use magicpickle_core::code::Instruction;
//!
//! let instruction = Instruction::parse("wormhole receive 7-crossover-clockwork", "wormhole")?;
//! ```

use crate::error::{Error, Result};

/// Subcommand the relay tool uses for pulling a payload.
pub const RECEIVE_SUBCOMMAND: &str = "receive";

/// A validated pairing code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PairingCode {
    code: String,
}

impl PairingCode {
    /// Parse and validate a pairing code.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInstruction`] if the code is not a numeric
    /// nameplate followed by hyphenated words.
    pub fn parse(input: &str) -> Result<Self> {
        let code = input.trim();
        let invalid = |reason: &str| Error::InvalidInstruction {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        if code.is_empty() {
            return Err(invalid("code is empty"));
        }
        if code.chars().any(char::is_whitespace) {
            return Err(invalid("code must not contain whitespace"));
        }

        let mut parts = code.split('-');
        let nameplate = parts.next().unwrap_or_default();
        if nameplate.is_empty() || !nameplate.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("code must start with a numeric nameplate"));
        }

        let mut words = 0;
        for word in parts {
            if word.is_empty() {
                return Err(invalid("code contains an empty word"));
            }
            words += 1;
        }
        if words == 0 {
            return Err(invalid("code has no words after the nameplate"));
        }

        Ok(Self {
            code: code.to_string(),
        })
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.code
    }
}

impl std::fmt::Display for PairingCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code)
    }
}

/// What the local side was told to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// Pull a fresh payload with this code
    Receive(PairingCode),
    /// Replay the cache slot instead of pulling
    UseCache,
}

impl Instruction {
    /// Parse one line of human (or relay) input.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInstruction`] when the line is neither empty nor
    /// exactly `<tool> receive <code>`.
    pub fn parse(input: &str, tool: &str) -> Result<Self> {
        let line = input.trim();
        if line.is_empty() {
            return Ok(Self::UseCache);
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        let invalid = |reason: String| Error::InvalidInstruction {
            input: line.to_string(),
            reason,
        };

        match tokens.as_slice() {
            [program, sub, code] if *program == tool && *sub == RECEIVE_SUBCOMMAND => {
                Ok(Self::Receive(PairingCode::parse(code)?))
            }
            [program, sub] if *program == tool && *sub == RECEIVE_SUBCOMMAND => {
                Err(invalid("missing pairing code".to_string()))
            }
            [program, sub, ..] if *program == tool && *sub == RECEIVE_SUBCOMMAND => {
                Err(invalid(format!(
                    "expected exactly one code after '{tool} {RECEIVE_SUBCOMMAND}'"
                )))
            }
            _ => Err(invalid(format!(
                "expected '{tool} {RECEIVE_SUBCOMMAND} <code>' or an empty line"
            ))),
        }
    }

    /// Render the command line a human would type for this instruction.
    ///
    /// Returns `None` for [`Instruction::UseCache`], which is typed as an
    /// empty line.
    #[must_use]
    pub fn command_line(&self, tool: &str) -> Option<String> {
        match self {
            Self::Receive(code) => Some(receive_command_line(tool, code)),
            Self::UseCache => None,
        }
    }
}

/// `<tool> receive <code>`
#[must_use]
pub fn receive_command_line(tool: &str, code: &PairingCode) -> String {
    format!("{tool} {RECEIVE_SUBCOMMAND} {code}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_receive_instruction() {
        let inst = Instruction::parse("wormhole receive 89-ohio-buzzard", "wormhole")
            .unwrap();
        assert_eq!(
            inst,
            Instruction::Receive(PairingCode::parse("89-ohio-buzzard").unwrap())
        );
    }

    #[test]
    fn test_parse_tolerates_surrounding_whitespace() {
        let inst = Instruction::parse("  wormhole   receive  7-a-b \n", "wormhole")
            .unwrap();
        assert_eq!(
            inst.command_line("wormhole").unwrap(),
            "wormhole receive 7-a-b"
        );
    }

    #[test]
    fn test_empty_line_means_cache() {
        assert_eq!(
            Instruction::parse("", "wormhole").unwrap(),
            Instruction::UseCache
        );
        assert_eq!(
            Instruction::parse("  \n", "wormhole").unwrap(),
            Instruction::UseCache
        );
        assert_eq!(Instruction::UseCache.command_line("wormhole"), None);
    }

    #[test]
    fn test_missing_code_is_invalid() {
        let err = Instruction::parse("wormhole receive", "wormhole")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInstruction { .. }));
    }

    #[test]
    fn test_wrong_leading_token_is_invalid() {
        let err = Instruction::parse("receive 12-foo-bar", "wormhole")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInstruction { .. }));
    }

    #[test]
    fn test_extra_tokens_are_invalid() {
        for input in [
            "wormhole receive 1-a-b extra",
            "wormhole receive --accept-file 1-a-b",
            "wormhole send 1-a-b",
            "croc receive 1-a-b",
        ] {
            assert!(
                matches!(
                    Instruction::parse(input, "wormhole"),
                    Err(Error::InvalidInstruction { .. })
                ),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn test_custom_tool_name() {
        let inst = Instruction::parse("magic-wormhole receive 3-x", "magic-wormhole")
            .unwrap();
        assert!(matches!(inst, Instruction::Receive(_)));
    }

    #[test]
    fn test_code_validation() {
        assert!(PairingCode::parse("7-example-code").is_ok());
        assert!(PairingCode::parse("123-x").is_ok());
        assert!(PairingCode::parse("example-code").is_err());
        assert!(PairingCode::parse("7").is_err());
        assert!(PairingCode::parse("7-").is_err());
        assert!(PairingCode::parse("7--x").is_err());
        assert!(PairingCode::parse("").is_err());
    }
}
