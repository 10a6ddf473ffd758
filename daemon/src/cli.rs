use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "vector-daemon")]
#[command(about = "Voice command daemon for the V.E.C.T.O.R. portfolio assistant", long_about = None)]
pub struct Cli {
    /// Assistant config file (JSON); overrides VECTOR_CONFIG
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Serve page shims over the IPC socket (default)
    Serve {
        /// Override the socket path
        #[arg(long)]
        socket: Option<PathBuf>,
    },

    /// Read transcripts from stdin and print page actions as JSON lines
    Repl,
}

impl Cli {
    pub fn subcommand(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or(Commands::Serve { socket: None })
    }
}
