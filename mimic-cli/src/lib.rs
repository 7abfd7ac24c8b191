//! Mimic CLI - Command Line Interface
//!
//! Runs the self-service portal and inspects its policy offline.
//!
//! # Usage
//!
//! ```text
//! mimic [OPTIONS] <COMMAND>
//!
//! Commands:
//!   start        Start the portal API server
//!   catalog      Show the application catalog
//!   eligibility  Query the eligibility matrix
//!   config       Configuration management
//!
//! Options:
//!   -f, --format <FORMAT>       Output format (json, table, plain) [default: table]
//!       --data-dir <DIR>        Directory for JSON file stores [env: MIMIC_DATA_DIR]
//!       --policy-file <FILE>    Catalog and eligibility JSON [env: MIMIC_POLICY_FILE]
//!   -v, --verbose               Enable debug logging
//! ```
//!
//! # Examples
//!
//! ```text
//! mimic start --port 9000 --data-dir ./data
//! mimic eligibility --role user --app Zoom
//! mimic eligibility --role manager --app "MS Word" --version 2021
//! ```

pub mod commands;
pub mod error;
pub mod handler;
pub mod output;

pub use commands::{Cli, Commands, OutputFormat};
pub use error::{CliError, CliResult};

/// Mimic CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
