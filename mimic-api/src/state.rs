//! Application state for the API server

use std::sync::Arc;

use mimic_core::config::PortalConfig;
use mimic_core::error::PortalResult;
use mimic_db::Portal;

/// API server state
#[derive(Clone)]
pub struct AppState {
    /// Assembled portal services
    pub portal: Arc<Portal>,
    /// API version
    pub version: String,
}

impl AppState {
    /// Wrap an assembled portal
    pub fn new(portal: Portal) -> Self {
        Self {
            portal: Arc::new(portal),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Build the portal from configuration
    pub async fn from_config(config: PortalConfig) -> PortalResult<Self> {
        Ok(Self::new(Portal::open(config).await?))
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::from(&PortalConfig::default())
    }
}

impl From<&PortalConfig> for ApiConfig {
    fn from(config: &PortalConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            enable_cors: config.enable_cors,
        }
    }
}
