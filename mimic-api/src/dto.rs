//! Data Transfer Objects for API requests and responses

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mimic_core::intent::IntentKind;
use mimic_core::types::{AppRequest, Application, FileEntry, LogEntry, Ticket};
use mimic_db::{AgentReply, Deployment};

// ============ Health DTOs ============

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub applications: usize,
    pub log_entries: u64,
}

// ============ Auth DTOs ============

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub username: String,
    pub role: String,
}

/// Caller identity, as a query string or a JSON body
#[derive(Debug, Deserialize)]
pub struct ViewerParams {
    pub username: String,
}

// ============ Catalog DTOs ============

#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    /// When set, include the versions this user's role may be approved for
    pub username: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApplicationResponse {
    pub name: String,
    pub versions: Vec<String>,
    pub latest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eligible_versions: Option<Vec<String>>,
}

impl From<&Application> for ApplicationResponse {
    fn from(app: &Application) -> Self {
        Self {
            name: app.name.clone(),
            versions: app.versions.clone(),
            latest: app.latest_version().map(String::from),
            description: app.description.clone(),
            eligible_versions: None,
        }
    }
}

// ============ Request DTOs ============

#[derive(Debug, Deserialize)]
pub struct ListRequestsQuery {
    pub username: String,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub username: String,
    pub app: String,
    pub version: String,
}

#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub username: String,
    /// "approve" or "reject"
    pub decision: String,
}

#[derive(Debug, Serialize)]
pub struct RequestResponse {
    pub request_id: String,
    pub user: String,
    pub app: String,
    pub version: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub decided_by: Option<String>,
    pub decided_at: Option<DateTime<Utc>>,
}

impl From<AppRequest> for RequestResponse {
    fn from(r: AppRequest) -> Self {
        Self {
            request_id: r.request_id,
            user: r.user,
            app: r.app,
            version: r.version,
            status: r.status.as_str().to_string(),
            created_at: r.created_at,
            decided_by: r.decided_by,
            decided_at: r.decided_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct InstallRequest {
    pub username: String,
    pub app: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct DeploymentResponse {
    pub request: RequestResponse,
    pub ticket: TicketResponse,
}

impl From<Deployment> for DeploymentResponse {
    fn from(d: Deployment) -> Self {
        Self {
            request: d.request.into(),
            ticket: d.ticket.into(),
        }
    }
}

// ============ Ticket DTOs ============

#[derive(Debug, Deserialize)]
pub struct ListTicketsQuery {
    pub username: String,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTicketRequest {
    pub username: String,
    pub action: String,
}

#[derive(Debug, Deserialize)]
pub struct AdvanceTicketRequest {
    pub username: String,
    /// open, in_progress or closed
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct TicketResponse {
    pub ticket_id: String,
    pub user: String,
    pub role: String,
    pub action: String,
    pub status: String,
    pub request_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Ticket> for TicketResponse {
    fn from(t: Ticket) -> Self {
        Self {
            ticket_id: t.ticket_id,
            user: t.user,
            role: t.role.as_str().to_string(),
            action: t.action,
            status: t.status.as_str().to_string(),
            request_id: t.request_id,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

// ============ Log DTOs ============

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub username: String,
    pub user: Option<String>,
    pub log_type: Option<String>,
    pub app: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct AppendLogRequest {
    pub username: String,
    /// Defaults to the caller
    pub user: Option<String>,
    pub log_type: String,
    pub action: String,
    pub app: Option<String>,
    pub version: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LogEntryResponse {
    pub entry_id: u64,
    pub timestamp: DateTime<Utc>,
    pub user: String,
    pub log_type: String,
    pub action: String,
    pub app: Option<String>,
    pub version: Option<String>,
    pub status: Option<String>,
}

impl From<LogEntry> for LogEntryResponse {
    fn from(e: LogEntry) -> Self {
        Self {
            entry_id: e.entry_id,
            timestamp: e.timestamp,
            user: e.user,
            log_type: e.log_type.as_str().to_string(),
            action: e.action,
            app: e.app,
            version: e.version,
            status: e.status,
        }
    }
}

// ============ File DTOs ============

#[derive(Debug, Deserialize)]
pub struct ListFilesQuery {
    pub username: String,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FileResponse {
    pub file_id: u64,
    pub filename: String,
    pub category: String,
    pub is_public: bool,
}

impl From<FileEntry> for FileResponse {
    fn from(f: FileEntry) -> Self {
        Self {
            file_id: f.file_id,
            filename: f.filename,
            category: f.category,
            is_public: f.is_public,
        }
    }
}

// ============ Agent DTOs ============

#[derive(Debug, Deserialize)]
pub struct AgentRequest {
    pub username: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct AgentResponse {
    pub kind: IntentKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<RequestResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<FileResponse>,
}

impl From<AgentReply> for AgentResponse {
    fn from(r: AgentReply) -> Self {
        Self {
            kind: r.kind,
            message: r.message,
            request: r.request.map(Into::into),
            file: r.file.map(Into::into),
        }
    }
}
