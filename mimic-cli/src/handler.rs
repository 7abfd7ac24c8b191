//! Command Handlers

use mimic_api::{run_server, ApiConfig, AppState};
use mimic_core::config::PortalConfig;
use mimic_core::error::PortalError;
use mimic_core::types::Role;

use crate::commands::{config::ConfigCommands, Cli, Commands, OutputFormat};
use crate::error::{CliError, CliResult};
use crate::output::{self, EligibilityRow, EligibilityVerdict};

/// Run the CLI with parsed arguments and the resolved configuration
pub async fn run(cli: Cli, config: PortalConfig) -> CliResult<()> {
    match cli.command {
        Commands::Start { .. } => handle_start(config).await,
        Commands::Catalog { app } => handle_catalog(&config, app.as_deref(), cli.format),
        Commands::Eligibility { role, app, version } => handle_eligibility(
            &config,
            &role,
            app.as_deref(),
            version.as_deref(),
            cli.format,
        ),
        Commands::Config(cmd) => handle_config(&config, cmd, cli.format),
    }
}

/// Handle starting the API server
async fn handle_start(config: PortalConfig) -> CliResult<()> {
    println!("Starting Mimic portal...");
    println!("  Address: {}", config.bind_addr());
    match config.data_dir {
        Some(ref dir) => println!("  Data dir: {}", dir.display()),
        None => println!("  Data dir: (in memory)"),
    }

    tracing::debug!(?config, "Resolved configuration");

    let api_config = ApiConfig::from(&config);
    let state = AppState::from_config(config).await?;

    run_server(api_config, state)
        .await
        .map_err(|e| CliError::server(e.to_string()))
}

/// Handle catalog listing
fn handle_catalog(config: &PortalConfig, app: Option<&str>, format: OutputFormat) -> CliResult<()> {
    let (catalog, _) = load_policy(config)?;

    match app {
        Some(name) => {
            let app = catalog
                .resolve_name(name)
                .ok_or_else(|| PortalError::not_found("Application", name))?;
            output::print_catalog(std::slice::from_ref(app), format);
        }
        None => output::print_catalog(catalog.list_applications(), format),
    }
    Ok(())
}

/// Handle eligibility queries
fn handle_eligibility(
    config: &PortalConfig,
    role: &str,
    app: Option<&str>,
    version: Option<&str>,
    format: OutputFormat,
) -> CliResult<()> {
    let role = Role::from_str(role).ok_or_else(|| {
        CliError::invalid_arg(format!(
            "unknown role: {}. Must be user, manager or admin",
            role
        ))
    })?;
    let (catalog, matrix) = load_policy(config)?;

    if let (Some(app), Some(version)) = (app, version) {
        let app = catalog.validate_selection(app, version)?;
        let verdict = EligibilityVerdict {
            role: role.to_string(),
            app: app.name.clone(),
            version: version.to_string(),
            eligible: matrix.is_eligible(role, &app.name, version),
        };
        output::print_verdict(&verdict, format);
        return Ok(());
    }

    let apps = match app {
        Some(name) => vec![catalog
            .get(name)
            .ok_or_else(|| PortalError::not_found("Application", name))?],
        None => catalog.list_applications().iter().collect(),
    };

    let rows: Vec<EligibilityRow> = apps
        .into_iter()
        .map(|a| EligibilityRow {
            role: role.to_string(),
            app: a.name.clone(),
            versions: matrix
                .allowed_versions(role, &a.name)
                .into_iter()
                .map(str::to_string)
                .collect(),
        })
        .collect();

    output::print_eligibility(&rows, format);
    Ok(())
}

/// Handle config commands
fn handle_config(config: &PortalConfig, cmd: ConfigCommands, format: OutputFormat) -> CliResult<()> {
    match cmd {
        ConfigCommands::Show => {
            output::print_config(config, format);
            Ok(())
        }
        ConfigCommands::Check => {
            let (catalog, matrix) = load_policy(config)?;
            for gap in matrix.hierarchy_gaps() {
                output::print_warning(&gap);
            }
            output::print_success(&format!(
                "Policy OK: {} applications",
                catalog.list_applications().len()
            ));
            Ok(())
        }
    }
}

fn load_policy(
    config: &PortalConfig,
) -> CliResult<(mimic_core::Catalog, mimic_core::EligibilityMatrix)> {
    config.load_policy().map_err(|e| match e {
        PortalError::Storage(msg) => CliError::config(msg),
        other => CliError::Portal(other),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_eligibility_unknown_role() {
        let err = handle_eligibility(
            &PortalConfig::default(),
            "guest",
            None,
            None,
            OutputFormat::Plain,
        )
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_eligibility_unknown_version() {
        let err = handle_eligibility(
            &PortalConfig::default(),
            "user",
            Some("Zoom"),
            Some("9.9"),
            OutputFormat::Plain,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CliError::Portal(PortalError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_eligibility_listing() {
        assert!(handle_eligibility(
            &PortalConfig::default(),
            "manager",
            Some("Zoom"),
            None,
            OutputFormat::Json,
        )
        .is_ok());
    }

    #[test]
    fn test_catalog_unknown_app() {
        let err = handle_catalog(&PortalConfig::default(), Some("Photoshop"), OutputFormat::Table)
            .unwrap_err();
        assert_eq!(err.exit_code(), 21);
    }

    #[test]
    fn test_missing_policy_file_is_config_error() {
        let config = PortalConfig {
            policy_path: Some(PathBuf::from("/nonexistent/policy.json")),
            ..PortalConfig::default()
        };
        let err = handle_config(&config, ConfigCommands::Check, OutputFormat::Plain).unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }
}
