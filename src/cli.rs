//! Command-line interface for hand_cricket.

use clap::{Parser, Subcommand};

/// Hand Cricket - odd-or-even cricket against the computer
#[derive(Parser, Debug)]
#[command(name = "hand_cricket")]
#[command(about = "Odd-or-even hand cricket game server", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML configuration file (defaults apply if missing)
    #[arg(short, long, global = true, default_value = "hand_cricket.toml")]
    pub config: std::path::PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP game server
    Serve {
        /// Port to bind to (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides the config file)
        #[arg(long)]
        host: Option<String>,
    },

    /// Play in the terminal against the computer
    Play,
}
