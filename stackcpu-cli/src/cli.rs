//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use stackcpu_common::{Extension, Extensions};
use stackcpu_vm::{Config, DEFAULT_STACK_CAPACITY};

#[derive(Parser)]
#[command(name = "stackcpu", version, about = "Run stackcpu binary programs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand)]
pub enum CliCommand {
    /// Load a binary program and execute it on stdin/stdout.
    Run(RunArgs),
}

#[derive(Args)]
pub struct RunArgs {
    /// Program file: big-endian 32-bit words, no header.
    pub program: PathBuf,

    /// Stack capacity in words.
    #[arg(long, default_value_t = DEFAULT_STACK_CAPACITY)]
    pub stack: usize,

    /// Stop after this many steps even if the program has not halted.
    #[arg(long)]
    pub steps: Option<usize>,

    /// Enable only the listed extensions (repeatable). All are enabled by default.
    #[arg(long = "extension", value_enum)]
    pub extensions: Vec<ExtensionName>,

    /// Run with the base instruction set only.
    #[arg(long, conflicts_with = "extensions")]
    pub no_extensions: bool,

    /// Print registers and status to stderr when execution stops.
    #[arg(long)]
    pub dump: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ExtensionName {
    Jumps,
    Calls,
}

impl From<ExtensionName> for Extension {
    fn from(name: ExtensionName) -> Self {
        match name {
            ExtensionName::Jumps => Extension::Jumps,
            ExtensionName::Calls => Extension::Calls,
        }
    }
}

impl RunArgs {
    /// Engine configuration selected by the flags.
    pub fn config(&self) -> Config {
        let extensions = if self.no_extensions {
            Extensions::NONE
        } else if self.extensions.is_empty() {
            Extensions::ALL
        } else {
            self.extensions.iter().copied().map(Extension::from).collect()
        };

        Config::default()
            .with_stack_capacity(self.stack)
            .with_extensions(extensions)
    }
}
