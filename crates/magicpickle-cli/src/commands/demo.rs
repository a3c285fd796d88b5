//! Demo command implementation.
//!
//! The same code path runs on both machines; only the resolved role differs.

use anyhow::{Context, Result};

use magicpickle_core::{Role, TransferSession};

use super::DemoArgs;

const DEFAULT_MESSAGE: &str = "hello";

/// Run the demo command.
pub fn run(args: DemoArgs) -> Result<()> {
    let global_config = super::load_config();

    let role = if args.local {
        Role::Local
    } else if args.remote {
        Role::Remote
    } else {
        global_config.role_resolver().resolve()
    };

    let mut options = global_config.session_options();
    if args.compress {
        options = options.with_compress(true);
    }
    if args.no_cache {
        options = options.without_cache();
    }

    println!("MagicPickle role: {role}");

    let messages = if args.messages.is_empty() {
        vec![DEFAULT_MESSAGE.to_string()]
    } else {
        args.messages
    };

    TransferSession::open(role, options)
        .context("Failed to open transfer session")?
        .run(|mp| -> Result<()> {
            if mp.is_remote() {
                mp.save(&messages.len())?;
                for message in &messages {
                    mp.save(message)?;
                }
                println!("Queued {} message(s); sending...", messages.len());
            } else {
                println!("Payload from {:?}", mp.origin());
                let count: usize = mp.load()?;
                for _ in 0..count {
                    let message: String = mp.load()?;
                    println!("  {message}");
                }
            }
            Ok(())
        })
}
