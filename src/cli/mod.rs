//! Command-line interface for the lineage server.
//!
//! Running with no subcommand starts the HTTP server.

mod commands;

use clap::{Parser, Subcommand};

/// Lineage - genealogy research site backend
#[derive(Parser)]
#[command(name = "lineage")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the web server (default)
    #[command(alias = "daemon")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Create an admin account, or re-activate an existing one
    CreateAdmin {
        /// Login name
        username: String,
    },

    /// Replace the password of an admin account
    SetPassword {
        /// Login name
        username: String,
    },

    /// Disable an admin account without deleting it
    DeactivateAdmin {
        /// Login name
        username: String,
    },
}

pub use commands::*;
