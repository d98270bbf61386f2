//! Command line interface

use clap::{Parser, Subcommand};

/// User portal server
#[derive(Debug, Parser)]
#[command(name = "portal", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,

    /// Apply pending database migrations
    Migrate,

    /// Create an active superuser account
    CreateSuperuser {
        #[arg(long)]
        username: String,

        #[arg(long)]
        email: String,

        /// Read from the environment when not given on the command line
        #[arg(long, env = "PORTAL_SUPERUSER_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

impl Cli {
    /// Subcommand to run, `serve` when none was given
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Serve)
    }
}
