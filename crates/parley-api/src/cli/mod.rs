//! Command-line interface definitions for the `parley` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

pub mod chat;
pub mod input;

/// Persona chat relay backend.
#[derive(Debug, Parser)]
#[command(name = "parley", version, about)]
pub struct Cli {
    /// Path of the configuration file.
    #[arg(long, global = true, default_value = "config.toml")]
    pub config: PathBuf,

    /// Increase log verbosity (-v: info, -vv: trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP server.
    Serve {
        /// Bind address; overrides the config file.
        #[arg(long)]
        host: Option<String>,
        /// Bind port; overrides the config file.
        #[arg(long)]
        port: Option<u16>,
        /// Export spans via OpenTelemetry (stdout exporter).
        #[arg(long)]
        otel: bool,
    },

    /// Chat interactively from the terminal.
    Chat {
        /// Bot name for the persona.
        #[arg(long, default_value = "Minji")]
        name: String,
        /// Bot gender for the persona.
        #[arg(long, default_value = "female")]
        gender: String,
        /// Your age; the bot matches it.
        #[arg(long, default_value_t = 24)]
        age: u32,
    },

    /// Generate shell completions.
    Completions { shell: Shell },
}
