//! ferry — mirror directory trees across storage backends.
//!
//! # Usage
//!
//! ```text
//! ferry sync [-v] <src>... <dst>
//! ferry keygen --name <label> --passphrase <pw> --out <prefix>
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{keygen::KeygenArgs, sync::SyncArgs};

#[derive(Parser, Debug)]
#[command(
    name = "ferry",
    version,
    about = "Mirror directory trees across storage backends",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Mirror each source directory into the destination.
    Sync(SyncArgs),

    /// Generate a key pair and write the passphrase-protected public-key
    /// envelope.
    Keygen(KeygenArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Sync(args) => args.run(),
        Commands::Keygen(args) => args.run(),
    }
}
