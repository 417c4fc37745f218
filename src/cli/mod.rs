//! Command Line Interface
//!
//! ## Commands
//! - `quote get` - Retrieve the quotes of the isins from the sources
//! - `quote sources` - List the available sources
//! - `quote tor` - Check whether requests go through the Tor network
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `warn`);
//! stdout only carries command output.

pub mod get;
pub mod sources;
pub mod tor;

use clap::{Parser, Subcommand};

/// Retrieves fund and crypto quotes from several sources concurrently.
#[derive(Debug, Parser)]
#[command(name = "quote")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Get the quotes of the specified isins.
    #[command(visible_alias = "g")]
    Get(get::GetCommand),
    /// Show the available sources.
    #[command(visible_alias = "list")]
    Sources,
    /// Check whether the Tor network will be used.
    #[command(visible_alias = "t")]
    Tor(tor::TorCommand),
}
