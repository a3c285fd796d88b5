//! MagicPickle CLI - ship in-memory objects between machines
//!
//! The library does the real work inside your own programs; this binary
//! carries the pane relay, a reference demo and a few inspection helpers.
//!
//! ## Quick Start
//!
//! ```bash
//! # On the remote machine
//! magicpickle demo --message "hello from the cluster"
//!
//! # On the local machine, with both terminals side by side in tmux
//! magicpickle demo --local
//! magicpickle relay
//! ```

#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use clap::Parser;

mod commands;
pub mod ui;

use commands::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Relay(args) => commands::relay::run(&args),
        Command::Demo(args) => commands::demo::run(args),
        Command::Cache(args) => commands::cache::run(&args),
        Command::Config(args) => commands::config::run(&args),
        Command::Completions(args) => {
            commands::completions::run(args.shell);
            Ok(())
        }
    };

    if let Err(e) = &result {
        print_hint(e);
    }
    result
}

/// Print the library's suggestion for the underlying error, if it has one.
fn print_hint(error: &anyhow::Error) {
    let core = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<magicpickle_core::Error>());
    if let Some(core) = core {
        if let Some(code) = core.code() {
            eprintln!("error code: {code}");
        }
        if let Some(hint) = core.suggestion() {
            eprintln!();
            eprintln!("{hint}");
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default = if verbose {
        "warn,magicpickle=debug,magicpickle_core=debug"
    } else {
        "warn,magicpickle=info,magicpickle_core=info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}
