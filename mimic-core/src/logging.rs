//! Logging Standards and Conventions
//!
//! Operational logging goes through `tracing`. It is separate from the
//! business audit log (see [`crate::ledger::AuditLog`]), which records what
//! users did; tracing records what the service did.
//!
//! # Log Levels
//!
//! | Level | Usage | Examples |
//! |-------|-------|----------|
//! | ERROR | Store corruption, startup failure | Unreadable data file |
//! | WARN  | Recoverable issues, degraded operation | Audit append failed, classifier down |
//! | INFO  | State changes | Request decided, ticket closed |
//! | DEBUG | Detailed operation flow | Filters applied, hint resolved |
//! | TRACE | Fine-grained debugging | Full records |
//!
//! # Structured Logging Fields
//!
//! ```ignore
//! use tracing::info;
//!
//! info!(
//!     request_id = %request.request_id,
//!     actor_id = %decider,
//!     operation = operations::REQUEST_DECIDE,
//!     status = request.status.as_str(),
//!     "Request decided"
//! );
//! ```

use serde::{Deserialize, Serialize};

/// Log level enumeration matching tracing levels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "error" => Some(Self::Error),
            "warn" | "warning" => Some(Self::Warn),
            "info" => Some(Self::Info),
            "debug" => Some(Self::Debug),
            "trace" => Some(Self::Trace),
            _ => None,
        }
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Pretty-printed for development
    #[default]
    Pretty,
    /// JSON for production
    Json,
    /// Compact single-line
    Compact,
}

impl LogFormat {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pretty" => Some(Self::Pretty),
            "json" => Some(Self::Json),
            "compact" => Some(Self::Compact),
            _ => None,
        }
    }
}

/// Log operation names
pub mod operations {
    // Requests
    pub const REQUEST_SUBMIT: &str = "request_submit";
    pub const REQUEST_DECIDE: &str = "request_decide";
    pub const REQUEST_DEPLOY: &str = "request_deploy";
    pub const DIRECT_INSTALL: &str = "direct_install";

    // Tickets
    pub const TICKET_CREATE: &str = "ticket_create";
    pub const TICKET_ADVANCE: &str = "ticket_advance";

    // Audit
    pub const AUDIT_APPEND: &str = "audit_append";
    pub const AUDIT_QUERY: &str = "audit_query";

    // Access
    pub const LOGIN: &str = "login";
    pub const ACCESS_DENY: &str = "access_deny";
    pub const FILE_DOWNLOAD: &str = "file_download";
    pub const EXPORT: &str = "export";

    // Agent
    pub const AGENT_CLASSIFY: &str = "agent_classify";
    pub const AGENT_FALLBACK: &str = "agent_fallback";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str("error"), Some(LogLevel::Error));
        assert_eq!(LogLevel::from_str("INFO"), Some(LogLevel::Info));
        assert_eq!(LogLevel::from_str("warning"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::from_str("invalid"), None);
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!(LogFormat::from_str("JSON"), Some(LogFormat::Json));
        assert_eq!(LogFormat::from_str("compact"), Some(LogFormat::Compact));
        assert_eq!(LogFormat::from_str("xml"), None);
        assert_eq!(LogFormat::default(), LogFormat::Pretty);
    }

    #[test]
    fn test_level_conversion() {
        assert_eq!(tracing::Level::from(LogLevel::Warn), tracing::Level::WARN);
    }
}
