use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "ghostkey",
    about = "Generate SSH key pairs that delete themselves after a time-to-live"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a key pair and keep it alive until its TTL expires or Ctrl-C
    Create {
        /// Base path for the pair (private key; the public key gets `.pub`)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Time-to-live in milliseconds (defaults to the configured value)
        #[arg(long)]
        ttl_ms: Option<u64>,
    },

    /// Report which algorithm a key file uses, as seen by ssh-keygen
    Inspect {
        path: PathBuf,
    },

    /// Show configuration
    Config {
        /// Show the current configuration
        #[arg(long)]
        show: bool,
    },
}
