//! Tabular export
//!
//! Records are flattened into a [`Table`] and rendered to bytes by a
//! [`TabularExport`] backend. CSV is the built-in backend.

use crate::error::PortalResult;
use crate::types::{AppRequest, FileEntry, LogEntry, Ticket};

/// A record that can be flattened into one table row
pub trait Tabular {
    fn headers() -> Vec<&'static str>;
    fn row(&self) -> Vec<String>;
}

/// Headers plus string cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table from records. An empty input yields a single `info` row
    /// so the exported file is never blank.
    pub fn from_records<T: Tabular>(records: &[T]) -> Self {
        if records.is_empty() {
            return Self {
                headers: vec!["info".to_string()],
                rows: vec![vec!["no records".to_string()]],
            };
        }
        Self {
            headers: T::headers().into_iter().map(String::from).collect(),
            rows: records.iter().map(Tabular::row).collect(),
        }
    }
}

/// Rows -> bytes
pub trait TabularExport: Send + Sync {
    /// MIME type of the rendered output
    fn content_type(&self) -> &'static str;

    /// File extension without the dot
    fn extension(&self) -> &'static str;

    fn render(&self, table: &Table) -> PortalResult<Vec<u8>>;
}

/// RFC 4180 style CSV
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvExport;

impl CsvExport {
    fn escape(cell: &str) -> String {
        if cell.contains([',', '"', '\n', '\r']) {
            format!("\"{}\"", cell.replace('"', "\"\""))
        } else {
            cell.to_string()
        }
    }

    fn line<S: AsRef<str>>(cells: &[S]) -> String {
        let mut line = cells
            .iter()
            .map(|c| Self::escape(c.as_ref()))
            .collect::<Vec<_>>()
            .join(",");
        line.push_str("\r\n");
        line
    }
}

impl TabularExport for CsvExport {
    fn content_type(&self) -> &'static str {
        "text/csv; charset=utf-8"
    }

    fn extension(&self) -> &'static str {
        "csv"
    }

    fn render(&self, table: &Table) -> PortalResult<Vec<u8>> {
        let mut out = Self::line(&table.headers);
        for row in &table.rows {
            out.push_str(&Self::line(row));
        }
        Ok(out.into_bytes())
    }
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

impl Tabular for LogEntry {
    fn headers() -> Vec<&'static str> {
        vec!["id", "timestamp", "user", "log_type", "action", "app", "version", "status"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.entry_id.to_string(),
            self.timestamp.to_rfc3339(),
            self.user.clone(),
            self.log_type.as_str().to_string(),
            self.action.clone(),
            opt(&self.app),
            opt(&self.version),
            opt(&self.status),
        ]
    }
}

impl Tabular for Ticket {
    fn headers() -> Vec<&'static str> {
        vec!["id", "user", "role", "action", "status", "request_id", "created_at", "updated_at"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.ticket_id.clone(),
            self.user.clone(),
            self.role.as_str().to_string(),
            self.action.clone(),
            self.status.label().to_string(),
            opt(&self.request_id),
            self.created_at.to_rfc3339(),
            self.updated_at.to_rfc3339(),
        ]
    }
}

impl Tabular for AppRequest {
    fn headers() -> Vec<&'static str> {
        vec!["id", "user", "app", "version", "status", "created_at", "decided_by", "decided_at"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.request_id.clone(),
            self.user.clone(),
            self.app.clone(),
            self.version.clone(),
            self.status.label().to_string(),
            self.created_at.to_rfc3339(),
            opt(&self.decided_by),
            self.decided_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
        ]
    }
}

impl Tabular for FileEntry {
    fn headers() -> Vec<&'static str> {
        vec!["id", "filename", "category", "is_public"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.file_id.to_string(),
            self.filename.clone(),
            self.category.clone(),
            self.is_public.to_string(),
        ]
    }
}
