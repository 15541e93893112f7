//! stackcpu CLI: load and run binary programs.
//!
//! Exit codes:
//! - 0: Halted, or the step budget ran out
//! - 1: Input/load error
//! - 2: Usage error
//! - 3: Runtime fault
//!
//! Log verbosity is taken from `RUST_LOG` (default `warn`).

mod cli;
mod commands;

use std::io;
use std::process;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};

use cli::{Cli, CliCommand};

fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let fmt_layer = fmt::layer().with_target(false).with_writer(io::stderr);
    let subscriber = Registry::default().with(filter).with(fmt_layer);
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("warning: tracing subscriber already installed");
    }
}

fn main() {
    setup_tracing();

    let result = match Cli::parse().command {
        CliCommand::Run(args) => commands::run(&args),
    };

    if let Err(code) = result {
        process::exit(code);
    }
}
