//! Audit log entries and queries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default number of entries returned by a log query
pub const DEFAULT_LOG_LIMIT: usize = 200;

/// Audit entry category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogType {
    Install,
    Chat,
    File,
    System,
}

impl LogType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogType::Install => "install",
            LogType::Chat => "chat",
            LogType::File => "file",
            LogType::System => "system",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "install" => Some(LogType::Install),
            "chat" => Some(LogType::Chat),
            "file" => Some(LogType::File),
            "system" => Some(LogType::System),
            _ => None,
        }
    }
}

impl std::fmt::Display for LogType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Stored audit record. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub entry_id: u64,
    pub timestamp: DateTime<Utc>,
    pub user: String,
    pub log_type: LogType,
    pub action: String,
    #[serde(default)]
    pub app: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// An entry to be appended; the log assigns id and timestamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    pub user: String,
    pub log_type: LogType,
    pub action: String,
    #[serde(default)]
    pub app: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl LogEvent {
    pub fn new(user: impl Into<String>, log_type: LogType, action: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            log_type,
            action: action.into(),
            app: None,
            version: None,
            status: None,
        }
    }

    /// Shorthand for a `system` entry
    pub fn system(user: impl Into<String>, action: impl Into<String>) -> Self {
        Self::new(user, LogType::System, action)
    }

    pub fn with_app(mut self, app: impl Into<String>, version: impl Into<String>) -> Self {
        self.app = Some(app.into());
        self.version = Some(version.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Materialize into a stored entry
    pub fn into_entry(self, entry_id: u64, timestamp: DateTime<Utc>) -> LogEntry {
        LogEntry {
            entry_id,
            timestamp,
            user: self.user,
            log_type: self.log_type,
            action: self.action,
            app: self.app,
            version: self.version,
            status: self.status,
        }
    }
}

/// Log query filter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogQuery {
    pub user: Option<String>,
    pub log_type: Option<LogType>,
    pub app: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

impl LogQuery {
    pub fn for_user(user: impl Into<String>) -> Self {
        Self {
            user: Some(user.into()),
            ..Default::default()
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Limit applied when the caller gave none
    pub fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LOG_LIMIT)
    }

    /// Check an entry against every set criterion
    pub fn matches(&self, entry: &LogEntry) -> bool {
        if let Some(ref user) = self.user {
            if &entry.user != user {
                return false;
            }
        }
        if let Some(log_type) = self.log_type {
            if entry.log_type != log_type {
                return false;
            }
        }
        if let Some(ref app) = self.app {
            match entry.app {
                Some(ref entry_app) if entry_app.eq_ignore_ascii_case(app) => {}
                _ => return false,
            }
        }
        if let Some(since) = self.since {
            if entry.timestamp < since {
                return false;
            }
        }
        true
    }
}
