//! Config Commands

use clap::Subcommand;

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Load and validate the catalog and eligibility policy
    Check,
}
