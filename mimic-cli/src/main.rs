//! Mimic CLI Entry Point
//!
//! Configuration is loaded from `MIMIC_*` environment variables (via .env
//! file). Command-line arguments override environment variables.
//!
//! Usage:
//!   mimic start         - Start the portal API server
//!   mimic catalog       - Show the application catalog
//!   mimic eligibility   - Query the eligibility matrix
//!   mimic config show   - Show the effective configuration

use clap::Parser;
use mimic_cli::{handler, Cli};
use mimic_core::config::PortalConfig;
use mimic_core::logging::{LogFormat, LogLevel};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    // Load .env file (ignore if not found)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = cli.portal_config();

    init_logging(&config, cli.verbose);

    if let Err(e) = handler::run(cli, config).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

/// Initialize logging with tracing. `RUST_LOG` wins over the configured level.
fn init_logging(config: &PortalConfig, verbose: bool) {
    let level = if verbose {
        LogLevel::Debug
    } else {
        config.log_level
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "mimic_cli={0},mimic_api={0},mimic_db={0},mimic_core={0},tower_http={0}",
            level
        )
        .into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Compact => registry
            .with(tracing_subscriber::fmt::layer().compact())
            .init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}
