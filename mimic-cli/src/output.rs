//! Output Formatting
//!
//! Utilities for formatting CLI output in various formats.

use mimic_core::config::PortalConfig;
use mimic_core::types::Application;
use serde::Serialize;

use crate::commands::OutputFormat;

/// One row of an eligibility query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EligibilityRow {
    pub role: String,
    pub app: String,
    pub versions: Vec<String>,
}

/// Single-version eligibility verdict
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EligibilityVerdict {
    pub role: String,
    pub app: String,
    pub version: String,
    pub eligible: bool,
}

/// Print as JSON
pub fn print_json<T: Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error formatting JSON: {}", e),
    }
}

/// Print the catalog
pub fn print_catalog(apps: &[Application], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&apps),
        OutputFormat::Table => {
            println!("{:<20} {}", "APPLICATION", "VERSIONS");
            print_separator();
            for app in apps {
                print_row(&app.name, &app.versions.join(", "));
            }
        }
        OutputFormat::Plain => {
            for app in apps {
                println!("{} {}", app.name, app.versions.join(" "));
            }
        }
    }
}

/// Print allowed versions per application for one role
pub fn print_eligibility(rows: &[EligibilityRow], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&rows),
        OutputFormat::Table => {
            println!("{:<20} {}", "APPLICATION", "ALLOWED VERSIONS");
            print_separator();
            for row in rows {
                let versions = if row.versions.is_empty() {
                    "-".to_string()
                } else {
                    row.versions.join(", ")
                };
                print_row(&row.app, &versions);
            }
        }
        OutputFormat::Plain => {
            for row in rows {
                println!("{} {}", row.app, row.versions.join(" "));
            }
        }
    }
}

/// Print a single eligibility verdict
pub fn print_verdict(verdict: &EligibilityVerdict, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(verdict),
        OutputFormat::Table => {
            print_row("Role", &verdict.role);
            print_row("Application", &verdict.app);
            print_row("Version", &verdict.version);
            print_row("Eligible", if verdict.eligible { "yes" } else { "no" });
        }
        OutputFormat::Plain => println!("{}", verdict.eligible),
    }
}

/// Print the effective configuration
pub fn print_config(config: &PortalConfig, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(config),
        OutputFormat::Table | OutputFormat::Plain => {
            println!("Mimic Configuration");
            println!("===================");
            print_row("Bind address", &config.bind_addr());
            print_row("CORS", &config.enable_cors.to_string());
            print_row("Data dir", &display_path(config.data_dir.as_deref(), "(in memory)"));
            print_row("Policy file", &display_path(config.policy_path.as_deref(), "(built-in)"));
            print_row("Deploy delay", &format!("{}ms", config.deploy_delay_ms));
            print_row("Log limit", &config.default_log_limit.to_string());
            print_row("Log level", config.log_level.as_str());
            print_row("Log format", &format!("{:?}", config.log_format).to_lowercase());
        }
    }
}

/// Print success message
pub fn print_success(message: &str) {
    println!("{}", message);
}

/// Print warning message
pub fn print_warning(message: &str) {
    eprintln!("Warning: {}", message);
}

fn display_path(path: Option<&std::path::Path>, fallback: &str) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| fallback.to_string())
}

/// Print a table row
pub fn print_row(key: &str, value: &str) {
    println!("{:<20} {}", key, value);
}

/// Print a separator line
pub fn print_separator() {
    println!("{}", "-".repeat(40));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_path() {
        assert_eq!(display_path(None, "(in memory)"), "(in memory)");
        assert_eq!(
            display_path(Some(std::path::Path::new("/srv/mimic")), "-"),
            "/srv/mimic"
        );
    }

    #[test]
    fn test_verdict_serializes() {
        let verdict = EligibilityVerdict {
            role: "user".into(),
            app: "Zoom".into(),
            version: "5.1".into(),
            eligible: false,
        };
        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["eligible"], false);
    }
}
