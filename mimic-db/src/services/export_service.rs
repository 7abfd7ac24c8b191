//! Export Service
//!
//! Renders the records a viewer may see into a downloadable table.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use mimic_core::error::PortalResult;
use mimic_core::export::{Table, TabularExport};
use mimic_core::logging::operations;
use mimic_core::types::{LogQuery, Viewer};

use super::{AuditService, FileService, RequestService, TicketService};

/// Exportable record sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
    Logs,
    Tickets,
    Requests,
    Files,
}

impl ExportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportKind::Logs => "logs",
            ExportKind::Tickets => "tickets",
            ExportKind::Requests => "requests",
            ExportKind::Files => "files",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "logs" => Some(ExportKind::Logs),
            "tickets" => Some(ExportKind::Tickets),
            "requests" => Some(ExportKind::Requests),
            "files" => Some(ExportKind::Files),
            _ => None,
        }
    }
}

/// A rendered export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub filename: String,
    pub content_type: &'static str,
    pub content: Vec<u8>,
}

#[derive(Clone)]
pub struct ExportService {
    requests: RequestService,
    tickets: TicketService,
    audit: AuditService,
    files: FileService,
    exporter: Arc<dyn TabularExport>,
}

impl ExportService {
    pub fn new(
        requests: RequestService,
        tickets: TicketService,
        audit: AuditService,
        files: FileService,
        exporter: Arc<dyn TabularExport>,
    ) -> Self {
        Self {
            requests,
            tickets,
            audit,
            files,
            exporter,
        }
    }

    /// Export one record set with the viewer's visibility applied
    pub async fn export(&self, viewer: &Viewer, kind: ExportKind) -> PortalResult<ExportedFile> {
        let table = match kind {
            ExportKind::Logs => {
                let entries = self
                    .audit
                    .query(viewer, LogQuery::default().with_limit(usize::MAX))
                    .await?;
                Table::from_records(&entries)
            }
            ExportKind::Tickets => Table::from_records(&self.tickets.list_tickets(viewer, None).await?),
            ExportKind::Requests => {
                Table::from_records(&self.requests.list_requests(viewer, None).await?)
            }
            ExportKind::Files => Table::from_records(&self.files.list_files(viewer, None)),
        };

        let content = self.exporter.render(&table)?;

        tracing::info!(
            actor_id = %viewer.username,
            count = table.rows.len(),
            operation = operations::EXPORT,
            "Exported {}",
            kind.as_str()
        );

        Ok(ExportedFile {
            filename: format!("{}.{}", kind.as_str(), self.exporter.extension()),
            content_type: self.exporter.content_type(),
            content,
        })
    }
}
