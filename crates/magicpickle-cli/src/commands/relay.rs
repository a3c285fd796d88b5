//! Relay command implementation.

use anyhow::{Context, Result};

use magicpickle_core::pane::TmuxHost;
use magicpickle_core::relay::{PairingRelay, RelayOutcome};

use super::RelayArgs;
use crate::ui::CommandBox;

/// Run the relay command.
pub fn run(args: &RelayArgs) -> Result<()> {
    let global_config = super::load_config();

    let mut config = global_config.relay_config();
    if let Some(tail_lines) = args.tail_lines {
        config.tail_lines = tail_lines;
    }

    let relay = PairingRelay::new(TmuxHost::default(), config);
    let outcome = if args.dry_run {
        relay.dry_run()
    } else {
        relay.run()
    }
    .context("Pane relay failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        display_outcome(&outcome);
    }

    Ok(())
}

fn display_outcome(outcome: &RelayOutcome) {
    match outcome {
        RelayOutcome::Injected {
            local_pane,
            remote_pane,
            command,
        } => {
            println!();
            println!("Relayed pairing code:");
            CommandBox::new(command)
                .with_route(remote_pane, local_pane)
                .display();
            println!();
        }
        RelayOutcome::Ready {
            local_pane,
            remote_pane,
            command,
        } => {
            println!();
            println!("Would relay (dry run):");
            CommandBox::new(command)
                .with_route(remote_pane, local_pane)
                .display();
            println!();
        }
        RelayOutcome::Incomplete {
            local_pane,
            remote_code,
        } => {
            println!("Nothing relayed.");
            match local_pane {
                Some(pane) => println!("  Waiting session: pane {pane}"),
                None => println!("  Waiting session: not found"),
            }
            match remote_code {
                Some(code) => println!("  Pairing code:    {code}"),
                None => println!("  Pairing code:    not found"),
            }
        }
    }
}
