//! Portal configuration
//!
//! Settings come from `MIMIC_`-prefixed environment variables. The CLI loads
//! a `.env` file first and lets flags override individual values.

use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::error::{PortalError, PortalResult};
use crate::logging::{LogFormat, LogLevel};
use crate::policy::EligibilityMatrix;
use crate::types::{Application, DEFAULT_LOG_LIMIT};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "MIMIC_";

/// Portal configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortalConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Enable permissive CORS
    pub enable_cors: bool,
    /// Directory for JSON file stores; in-memory stores when unset
    pub data_dir: Option<PathBuf>,
    /// Pause between deployment ticket transitions
    pub deploy_delay_ms: u64,
    /// Log query limit when the caller gives none
    pub default_log_limit: usize,
    pub log_level: LogLevel,
    pub log_format: LogFormat,
    /// Catalog and eligibility matrix JSON; built-in defaults when unset
    pub policy_path: Option<PathBuf>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            enable_cors: true,
            data_dir: None,
            deploy_delay_ms: 0,
            default_log_limit: DEFAULT_LOG_LIMIT,
            log_level: LogLevel::Info,
            log_format: LogFormat::Pretty,
            policy_path: None,
        }
    }
}

impl PortalConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup. Keys passed to
    /// `lookup` carry the prefix (`MIMIC_PORT`).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));
        let defaults = Self::default();

        Self {
            host: var("HOST").unwrap_or(defaults.host),
            port: var("PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            enable_cors: var("ENABLE_CORS")
                .map(|s| s.to_lowercase() == "true" || s == "1")
                .unwrap_or(defaults.enable_cors),
            data_dir: var("DATA_DIR")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            deploy_delay_ms: var("DEPLOY_DELAY_MS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.deploy_delay_ms),
            default_log_limit: var("LOG_LIMIT")
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.default_log_limit),
            log_level: var("LOG_LEVEL")
                .and_then(|s| LogLevel::from_str(&s))
                .unwrap_or(defaults.log_level),
            log_format: var("LOG_FORMAT")
                .and_then(|s| LogFormat::from_str(&s))
                .unwrap_or(defaults.log_format),
            policy_path: var("POLICY_FILE")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
        }
    }

    /// Socket address string
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Catalog and matrix from `policy_path`, or the built-in defaults
    pub fn load_policy(&self) -> PortalResult<(Catalog, EligibilityMatrix)> {
        match self.policy_path {
            Some(ref path) => PolicyDocument::load(path)?.into_parts(),
            None => {
                let catalog = Catalog::standard();
                let matrix = EligibilityMatrix::standard(&catalog);
                Ok((catalog, matrix))
            }
        }
    }
}

/// On-disk catalog plus eligibility matrix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDocument {
    pub applications: Vec<Application>,
    pub eligibility: EligibilityMatrix,
}

impl PolicyDocument {
    pub fn load(path: &Path) -> PortalResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            PortalError::storage(format!("cannot read {}: {}", path.display(), e))
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Validate the catalog and check every granted version exists in it
    pub fn into_parts(self) -> PortalResult<(Catalog, EligibilityMatrix)> {
        let catalog = Catalog::new(self.applications)?;
        self.eligibility.validate(&catalog)?;
        Ok((catalog, self.eligibility))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = PortalConfig::from_lookup(|_| None);
        assert_eq!(config, PortalConfig::default());
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_env_overrides() {
        let config = PortalConfig::from_lookup(lookup(&[
            ("MIMIC_PORT", "9000"),
            ("MIMIC_ENABLE_CORS", "false"),
            ("MIMIC_DATA_DIR", "/var/lib/mimic"),
            ("MIMIC_DEPLOY_DELAY_MS", "250"),
            ("MIMIC_LOG_FORMAT", "json"),
            ("MIMIC_LOG_LIMIT", "0"),
        ]));
        assert_eq!(config.port, 9000);
        assert!(!config.enable_cors);
        assert_eq!(config.data_dir, Some(PathBuf::from("/var/lib/mimic")));
        assert_eq!(config.deploy_delay_ms, 250);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.default_log_limit, DEFAULT_LOG_LIMIT);
    }

    #[test]
    fn test_unparsable_values_fall_back() {
        let config = PortalConfig::from_lookup(lookup(&[
            ("MIMIC_PORT", "eighty"),
            ("MIMIC_LOG_LEVEL", "loud"),
        ]));
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn test_default_policy() {
        let (catalog, matrix) = PortalConfig::default().load_policy().unwrap();
        assert_eq!(catalog.list_applications().len(), 4);
        assert!(matrix.is_eligible(crate::types::Role::User, "Zoom", "5.0"));
    }

    #[test]
    fn test_policy_document_validation() {
        let json = r#"{
            "applications": [{"name": "Zoom", "versions": ["5.0", "5.1"]}],
            "eligibility": {"user": {"Zoom": ["6.0"]}}
        }"#;
        let doc: PolicyDocument = serde_json::from_str(json).unwrap();
        assert!(matches!(doc.into_parts(), Err(PortalError::InvalidInput(_))));

        let json = r#"{
            "applications": [{"name": "Zoom", "versions": ["5.0", "5.1"]}],
            "eligibility": {"user": {"Zoom": ["5.0"]}}
        }"#;
        let doc: PolicyDocument = serde_json::from_str(json).unwrap();
        let (catalog, matrix) = doc.into_parts().unwrap();
        assert_eq!(catalog.latest_version("Zoom").unwrap(), "5.1");
        assert!(matrix.is_eligible(crate::types::Role::User, "Zoom", "5.0"));
    }

    #[test]
    fn test_missing_policy_file() {
        let err = PolicyDocument::load(Path::new("/nonexistent/mimic-policy.json")).unwrap_err();
        assert!(matches!(err, PortalError::Storage(_)));
    }
}
