//! Where the local side gets its pairing instruction from.
//!
//! Normally a human pastes the line printed by the remote side at an
//! interactive prompt (or the pane relay types it in for them). Tests and
//! scripts supply the line directly.

use std::io::{self, BufRead, Write};

use crate::error::Result;

/// Prompt printed while waiting for an instruction.
///
/// The pane relay recognizes a waiting local session by this text.
pub const DEFAULT_PROMPT: &str = "Enter wormhole command:";

/// Supplies one line of instruction text.
pub trait InstructionSource {
    /// Block until an instruction line is available and return it.
    fn read_instruction(&mut self, prompt: &str) -> Result<String>;
}

/// Reads from standard input after printing the prompt to standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinPrompt;

impl InstructionSource for StdinPrompt {
    fn read_instruction(&mut self, prompt: &str) -> Result<String> {
        prompt_line(&mut io::stdin().lock(), &mut io::stdout(), prompt)
    }
}

/// Print `prompt` to `output` and read one line from `input`.
///
/// An entered empty line comes back as `"\n"`; end of input is an error, so a
/// closed stdin never reads as the cache signal.
fn prompt_line(
    input: &mut impl BufRead,
    output: &mut impl Write,
    prompt: &str,
) -> Result<String> {
    write!(output, "{prompt} ")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "input closed before an instruction was entered",
        )
        .into());
    }
    Ok(line)
}

/// A fixed instruction, e.g. from a command-line flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedInstruction(pub String);

impl FixedInstruction {
    /// The empty instruction: replay the cache.
    #[must_use]
    pub const fn use_cache() -> Self {
        Self(String::new())
    }
}

impl InstructionSource for FixedInstruction {
    fn read_instruction(&mut self, _prompt: &str) -> Result<String> {
        Ok(self.0.clone())
    }
}
