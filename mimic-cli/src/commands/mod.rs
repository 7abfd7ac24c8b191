//! CLI Commands Module
//!
//! Command definitions for the Mimic CLI.

pub mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mimic_core::config::PortalConfig;
use mimic_core::logging::{LogFormat, LogLevel};

/// Mimic IT self-service portal
#[derive(Parser, Debug)]
#[command(name = "mimic")]
#[command(version)]
#[command(about = "Mimic IT self-service portal")]
#[command(long_about = "Run the Mimic self-service portal and inspect its catalog \
    and eligibility policy.\n\nSettings default to MIMIC_* environment variables; \
    flags take precedence.")]
pub struct Cli {
    /// Directory for JSON file stores (env: MIMIC_DATA_DIR)
    #[arg(long, env = "MIMIC_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Catalog and eligibility matrix JSON (env: MIMIC_POLICY_FILE)
    #[arg(long, env = "MIMIC_POLICY_FILE")]
    pub policy_file: Option<PathBuf>,

    /// Log level (env: MIMIC_LOG_LEVEL)
    #[arg(long, env = "MIMIC_LOG_LEVEL", value_parser = parse_log_level)]
    pub log_level: Option<LogLevel>,

    /// Log format: pretty, json or compact (env: MIMIC_LOG_FORMAT)
    #[arg(long, env = "MIMIC_LOG_FORMAT", value_parser = parse_log_format)]
    pub log_format: Option<LogFormat>,

    /// Output format (json, table, plain)
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Environment configuration with flag overrides applied
    pub fn portal_config(&self) -> PortalConfig {
        self.apply(PortalConfig::from_env())
    }

    /// Apply flag overrides on top of `base`
    pub fn apply(&self, mut base: PortalConfig) -> PortalConfig {
        if let Some(ref dir) = self.data_dir {
            base.data_dir = Some(dir.clone());
        }
        if let Some(ref path) = self.policy_file {
            base.policy_path = Some(path.clone());
        }
        if let Some(level) = self.log_level {
            base.log_level = level;
        }
        if let Some(format) = self.log_format {
            base.log_format = format;
        }
        if let Commands::Start {
            ref host,
            port,
            deploy_delay_ms,
        } = self.command
        {
            if let Some(host) = host {
                base.host = host.clone();
            }
            if let Some(port) = port {
                base.port = port;
            }
            if let Some(delay) = deploy_delay_ms {
                base.deploy_delay_ms = delay;
            }
        }
        base
    }
}

fn parse_log_level(s: &str) -> Result<LogLevel, String> {
    LogLevel::from_str(s).ok_or_else(|| format!("unknown log level: {}", s))
}

fn parse_log_format(s: &str) -> Result<LogFormat, String> {
    LogFormat::from_str(s).ok_or_else(|| format!("unknown log format: {}", s))
}

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Table format (human-readable)
    #[default]
    Table,
    /// Plain text
    Plain,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the portal API server
    Start {
        /// Host to bind to (env: MIMIC_HOST)
        #[arg(short = 'H', long, env = "MIMIC_HOST")]
        host: Option<String>,
        /// Port to listen on (env: MIMIC_PORT)
        #[arg(short, long, env = "MIMIC_PORT")]
        port: Option<u16>,
        /// Pause between deployment ticket transitions (env: MIMIC_DEPLOY_DELAY_MS)
        #[arg(long, env = "MIMIC_DEPLOY_DELAY_MS")]
        deploy_delay_ms: Option<u64>,
    },

    /// Show the application catalog, or one application
    Catalog {
        /// Application name
        app: Option<String>,
    },

    /// Query the eligibility matrix
    Eligibility {
        /// Role: user, manager or admin
        #[arg(short, long)]
        role: String,
        /// Restrict to one application
        #[arg(short, long)]
        app: Option<String>,
        /// Check a single version (requires --app)
        #[arg(long, requires = "app")]
        version: Option<String>,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(config::ConfigCommands),
}
